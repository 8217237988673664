use crate::config::Config;
use crate::streaming::{
    DbSceneRepository, PolicyStore, SceneRepository, StreamContext, UnavailableHandoff,
};
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use scenestream_db::pool::init_pool;
use scenestream_engine::{StreamOptions, TranscodeHandoff};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

mod error;
pub mod routes_config;
pub mod routes_streams;

pub use error::AppError;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Path to config file (for persistence)
    pub config_path: Option<PathBuf>,
    pub repo: Arc<dyn SceneRepository>,
    /// Live transcode policy (can be edited via API)
    pub policy: Arc<PolicyStore>,
    pub options: Arc<StreamOptions>,
    pub handoff: Arc<dyn TranscodeHandoff>,
}

impl AppContext {
    /// Context with the policy and stream options taken from `config`.
    ///
    /// Transcode requests fail as unavailable until a handoff is attached
    /// with [`AppContext::with_handoff`].
    pub fn new(config: Config, repo: Arc<dyn SceneRepository>) -> Result<Self> {
        let policy = config
            .transcode
            .to_policy()
            .context("Invalid [transcode] section")?;
        let options = config
            .streaming
            .to_options()
            .context("Invalid [streaming] section")?;

        Ok(Self {
            config: Arc::new(config),
            config_path: None,
            repo,
            policy: Arc::new(PolicyStore::new(policy)),
            options: Arc::new(options),
            handoff: Arc::new(UnavailableHandoff),
        })
    }

    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn with_handoff(mut self, handoff: Arc<dyn TranscodeHandoff>) -> Self {
        self.handoff = handoff;
        self
    }

    pub fn stream_context<'a>(&'a self, base_url: &'a str) -> StreamContext<'a> {
        StreamContext {
            repo: self.repo.as_ref(),
            policy: self.policy.as_ref(),
            options: self.options.as_ref(),
            base_url,
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::PUT])
        .allow_headers([header::CONTENT_TYPE, header::RANGE])
        .expose_headers([header::CONTENT_RANGE, header::ACCEPT_RANGES]);

    Router::new()
        .route("/health", get(health_check))
        .nest(
            "/api",
            routes_streams::api_routes().merge(routes_config::config_routes()),
        )
        .merge(routes_streams::stream_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Open the database and serve until a shutdown signal arrives.
pub async fn start_server(config: Config, config_path: Option<PathBuf>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let db_path = config.server.db_path.to_string_lossy().into_owned();
    let pool = init_pool(&db_path).with_context(|| format!("Failed to open database {db_path}"))?;
    tracing::info!("Database ready at {}", db_path);

    let repo = Arc::new(DbSceneRepository::new(pool));
    let ctx = AppContext::new(config, repo)?.with_config_path(config_path);
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
