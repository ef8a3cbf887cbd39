use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::repository::AuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::submission::repo::seaorm::SeaOrmSubmissionRepository;
use service::submission::repository::SubmissionRepository;
use service::submission::SubmissionService;

use crate::routes::{self, auth};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load the full config, falling back to defaults + env vars when no
/// config.toml is present.
fn load_config() -> anyhow::Result<configs::AppConfig> {
    match configs::AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(_) => {
            let mut cfg = configs::AppConfig::default();
            if let Ok(host) = env::var("SERVER_HOST") {
                cfg.server.host = host;
            }
            if let Ok(port) = env::var("SERVER_PORT") {
                if let Ok(port) = port.parse::<u16>() {
                    cfg.server.port = port;
                }
            }
            cfg.auth.normalize_from_env();
            cfg.auth.validate()?;
            Ok(cfg)
        }
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = load_config()?;

    // DB connection
    let db = models::db::connect().await?;

    // Business services over SeaORM-backed repositories
    let auth_repo: Arc<dyn AuthRepository> = Arc::new(SeaOrmAuthRepository { db: db.clone() });
    let submission_repo: Arc<dyn SubmissionRepository> =
        Arc::new(SeaOrmSubmissionRepository { db });

    let state = auth::ServerState {
        auth: Arc::new(AuthService::new(
            auth_repo,
            AuthConfig {
                jwt_secret: cfg.auth.jwt_secret.clone(),
                token_ttl_days: cfg.auth.token_ttl_days,
            },
        )),
        submissions: Arc::new(SubmissionService::new(submission_repo)),
    };

    // Build router
    let app: Router = routes::build_router(state, build_cors());

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting lms server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
