//! Stream endpoint API and stream URLs.

use crate::config::ServerConfig;
use crate::server::{AppContext, AppError};
use crate::streaming::{parse_stream_target, stream_scene};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use scenestream_common::SceneId;
use scenestream_engine::{EndpointSet, HandoffTicket};
use serde::Deserialize;

/// Routes nested under `/api`.
pub fn api_routes() -> Router<AppContext> {
    Router::new().route("/scenes/:id/streams", get(list_streams))
}

/// The URLs handed out in endpoint sets.
pub fn stream_routes() -> Router<AppContext> {
    Router::new()
        .route("/scene/:id/stream", get(stream_scene))
        .route("/scene/:id/stream/:target", get(request_stream))
}

async fn list_streams(
    State(ctx): State<AppContext>,
    Path(scene_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<EndpointSet>, AppError> {
    let scene_id: SceneId = scene_id.parse()?;
    let base_url = public_base_url(&ctx.config.server, &headers);

    let endpoints = ctx.stream_context(&base_url).resolve(scene_id)?;
    Ok(Json(endpoints))
}

#[derive(Debug, Deserialize)]
struct TargetQuery {
    resolution: Option<String>,
}

async fn request_stream(
    State(ctx): State<AppContext>,
    Path((scene_id, target)): Path<(String, String)>,
    Query(query): Query<TargetQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let scene_id: SceneId = scene_id.parse()?;
    let target = parse_stream_target(&target, query.resolution.as_deref())?;
    let base_url = public_base_url(&ctx.config.server, &headers);

    let ticket: HandoffTicket = ctx
        .stream_context(&base_url)
        .request(ctx.handoff.as_ref(), scene_id, target)?;
    Ok((StatusCode::ACCEPTED, Json(ticket)))
}

/// Base URL for generated stream links.
///
/// The configured `base_url` wins; otherwise it is derived from the request's
/// `Host` and `X-Forwarded-Proto` headers, falling back to the bind address.
pub fn public_base_url(server: &ServerConfig, headers: &HeaderMap) -> String {
    if let Some(base) = &server.base_url {
        return base.trim_end_matches('/').to_string();
    }

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .filter(|v| *v == "https" || *v == "http")
        .unwrap_or("http");

    match headers.get(header::HOST).and_then(|v| v.to_str().ok()) {
        Some(host) => format!("{scheme}://{host}"),
        None => format!("{scheme}://{}:{}", server.host, server.port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn configured_base_url_wins() {
        let server = ServerConfig {
            base_url: Some("https://media.example.com/".into()),
            ..Default::default()
        };
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("10.0.0.2:8080"));

        assert_eq!(public_base_url(&server, &headers), "https://media.example.com");
    }

    #[test]
    fn derived_from_request_headers() {
        let server = ServerConfig::default();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("media.lan"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));

        assert_eq!(public_base_url(&server, &headers), "https://media.lan");
    }

    #[test]
    fn falls_back_to_bind_address() {
        let server = ServerConfig::default();
        assert_eq!(
            public_base_url(&server, &HeaderMap::new()),
            format!("http://{}:{}", server.host, server.port)
        );
    }
}
