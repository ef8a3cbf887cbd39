use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use common::types::ApiResponse;
use service::auth::errors::AuthError;
use service::submission::errors::SubmissionError;

/// Domain errors a handler can surface. Anything not covered here is an
/// internal failure and reaches the caller as a generic 500.
#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    Submission(SubmissionError),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl From<SubmissionError> for ApiError {
    fn from(e: SubmissionError) -> Self {
        ApiError::Submission(e)
    }
}

/// Pure mapping from error kind to HTTP status and caller-facing message,
/// kept out of handler control flow so it can be tested on its own.
/// Internal detail never leaks: hashing, token and repository failures all
/// collapse to a generic message.
pub fn status_and_message(err: &ApiError) -> (StatusCode, String) {
    match err {
        ApiError::Auth(e) => match e {
            AuthError::Validation(_) | AuthError::Conflict(_) => (StatusCode::BAD_REQUEST, e.to_string()),
            AuthError::Unauthorized | AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, e.to_string()),
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        },
        ApiError::Submission(e) => match e {
            SubmissionError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
            SubmissionError::NotFound => (StatusCode::NOT_FOUND, e.to_string()),
            SubmissionError::Forbidden => (StatusCode::FORBIDDEN, e.to_string()),
            SubmissionError::Repository(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = status_and_message(&self);
        if status.is_server_error() {
            match &self {
                ApiError::Auth(e) => error!(code = e.code(), error = %e, "internal error"),
                ApiError::Submission(e) => error!(code = e.code(), error = %e, "internal error"),
            }
        }
        let body = ApiResponse::<()>::message(status.as_u16(), message);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400_with_message() {
        let err = ApiError::Auth(AuthError::Validation(
            "Password must be at least 6 characters long".into(),
        ));
        let (status, msg) = status_and_message(&err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "Password must be at least 6 characters long");
    }

    #[test]
    fn credential_and_token_failures_are_both_401_but_distinct() {
        let bad_creds = ApiError::Auth(AuthError::Unauthorized);
        let bad_token = ApiError::Auth(AuthError::InvalidToken);
        let (s1, m1) = status_and_message(&bad_creds);
        let (s2, m2) = status_and_message(&bad_token);
        assert_eq!(s1, StatusCode::UNAUTHORIZED);
        assert_eq!(s2, StatusCode::UNAUTHORIZED);
        assert_eq!(m1, "Invalid email or password");
        assert_eq!(m2, "Not authorized");
    }

    #[test]
    fn internal_failures_never_leak_detail() {
        let err = ApiError::Auth(AuthError::Repository("connection reset by peer".into()));
        let (status, msg) = status_and_message(&err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(msg, "Internal server error");
    }

    #[test]
    fn ownership_violations_map_to_403() {
        let err = ApiError::Submission(SubmissionError::Forbidden);
        let (status, _) = status_and_message(&err);
        assert_eq!(status, StatusCode::FORBIDDEN);

        let err = ApiError::Submission(SubmissionError::NotFound);
        let (status, _) = status_and_message(&err);
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
