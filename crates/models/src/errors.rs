use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

/// Classify a raw database error, surfacing unique-index violations as
/// conflicts so callers can map a racing duplicate insert to the same error
/// the pre-check would have produced.
pub fn map_db_err(e: sea_orm::DbErr) -> ModelError {
    let msg = e.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("unique") || lower.contains("duplicate key") {
        ModelError::Conflict(msg)
    } else {
        ModelError::Db(msg)
    }
}
