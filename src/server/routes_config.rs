//! Live transcode policy API routes.

use crate::config::{persist, TranscodeConfig};
use crate::server::{AppContext, AppError};
use crate::streaming::PolicySource;
use axum::{extract::State, routing::get, Json, Router};
use scenestream_common::Error;

pub fn config_routes() -> Router<AppContext> {
    Router::new().route(
        "/config/transcode",
        get(get_transcode).put(update_transcode),
    )
}

async fn get_transcode(State(ctx): State<AppContext>) -> Json<TranscodeConfig> {
    Json(TranscodeConfig::from_policy(&ctx.policy.current()))
}

/// Replace the policy. Takes effect for the next resolution; resolutions in
/// flight keep the snapshot they started with.
async fn update_transcode(
    State(ctx): State<AppContext>,
    Json(req): Json<TranscodeConfig>,
) -> Result<Json<TranscodeConfig>, AppError> {
    // A bad request body is the client's fault, not a server misconfiguration.
    let policy = req.to_policy().map_err(|e| match e {
        Error::Configuration(msg) => Error::InvalidInput(msg),
        other => other,
    })?;

    ctx.policy.replace(policy)?;
    let current = TranscodeConfig::from_policy(&ctx.policy.current());

    if let Some(ref path) = ctx.config_path {
        if let Err(e) = persist::update_transcode(path, &current) {
            tracing::error!("Failed to persist transcode config: {:#}", e);
        }
    }

    Ok(Json(current))
}
