use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Uniform response envelope: every endpoint answers with a status code, a
/// human-readable message, and an optional data payload.
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(status: u16, message: impl Into<String>, data: T) -> Self {
        Self { status, message: message.into(), data: Some(data) }
    }

    /// Envelope with no payload (errors, bare acknowledgements).
    pub fn message(status: u16, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), data: None }
    }
}
