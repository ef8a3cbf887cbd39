use thiserror::Error;

/// Business errors for submission workflows
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Validation(String),
    #[error("Submission not found")]
    NotFound,
    /// The row exists but belongs to another student. Mapped to 403; the
    /// record itself is never returned.
    #[error("You are not allowed to access this submission")]
    Forbidden,
    #[error("repository error: {0}")]
    Repository(String),
}

impl SubmissionError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            SubmissionError::Validation(_) => 2001,
            SubmissionError::NotFound => 2003,
            SubmissionError::Forbidden => 2004,
            SubmissionError::Repository(_) => 2200,
        }
    }
}
