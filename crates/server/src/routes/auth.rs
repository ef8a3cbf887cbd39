use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use common::types::ApiResponse;
use service::auth::domain::{AuthUser, LoginInput, RegisterInput, Role};
use service::auth::errors::AuthError;
use service::auth::AuthService;
use service::submission::SubmissionService;

use crate::errors::ApiError;

/// Shared handler state: the business services, nothing framework-bound.
#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService>,
    pub submissions: Arc<SubmissionService>,
}

/// The acting user, resolved from the bearer token by [`require_bearer`]
/// and injected into request extensions before protected handlers run.
#[derive(Clone)]
pub struct CurrentUser(pub AuthUser);

#[derive(Serialize)]
pub struct RegisterData {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub token: String,
}

#[derive(Serialize)]
pub struct LoginData {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub image_url: Option<String>,
    pub token: String,
}

pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterData>>), ApiError> {
    let session = state.auth.register(input).await?;
    let user = session.user;
    let data = RegisterData {
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
        token: session.token,
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(201, "User registered successfully", data)),
    ))
}

pub async fn login(
    State(state): State<ServerState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<ApiResponse<LoginData>>, ApiError> {
    let session = state.auth.login(input).await?;
    let user = session.user;
    let data = LoginData {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        image_url: user.image_url,
        token: session.token,
    };
    Ok(Json(ApiResponse::new(200, "User logged in successfully", data)))
}

/// Route-layer middleware for the protected submission routes: verify
/// `Authorization: Bearer <token>`, resolve the acting user, and hand it to
/// the handler via extensions. Any failure answers 401 before the handler
/// runs.
pub async fn require_bearer(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();

    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = match header {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(AuthError::InvalidToken.into());
            }
        },
        None => {
            warn!(path = %path, "missing Authorization header");
            return Err(AuthError::InvalidToken.into());
        }
    };

    let user_id = state.auth.verify_token(&token).map_err(|e| {
        warn!(path = %path, error = %e, "token validation failed");
        e
    })?;
    let user = state.auth.resolve_user(user_id).await?;

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}
