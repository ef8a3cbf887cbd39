use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

pub mod auth;
pub mod submissions;

use self::auth::ServerState;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public auth/practice routes plus the
/// token-protected submission routes.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    // Public routes: health, register/login, and the anonymous practice
    // endpoint (here :id is a student id).
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/submissions/:id/singlequestion", post(submissions::submit_single_question));

    // Protected submission routes; the bearer middleware resolves the acting
    // student before any handler runs.
    let protected = Router::new()
        .route("/submissions/student", get(submissions::list_mine))
        .route("/submissions/:id", get(submissions::get_by_id))
        .route("/submissions/:id/submit", post(submissions::submit_module))
        .route("/submissions/course/:course_id", get(submissions::list_by_course))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    public
        .merge(protected)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
