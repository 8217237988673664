//! API integration tests
//!
//! Tests for HTTP API endpoints using axum's test utilities.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{probed, TestHarness};
use http_body_util::BodyExt;
use scenestream::config::{load_config, Config};
use scenestream::server::create_router;
use serde_json::Value;
use tempfile::tempdir;
use tower::ServiceExt;

/// Helper to get response body as JSON
async fn body_to_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let harness = TestHarness::new();
    let app = create_router(harness.ctx.clone());

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_streams_use_forwarded_proto() {
    let harness = TestHarness::new();
    let scene = harness.add_scene("Proxy", probed("webm", "vp9", Some("opus"), 2560, 1440));
    let app = create_router(harness.ctx.clone());

    let response = app
        .oneshot(
            Request::get(format!("/api/scenes/{scene}/streams"))
                .header(header::HOST, "media.example.org")
                .header("x-forwarded-proto", "https")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body[0]["mode"], "direct");
    assert_eq!(body[0]["mime_type"], "video/webm");
    assert_eq!(
        body[0]["url"],
        format!("https://media.example.org/scene/{scene}/stream")
    );
    // 1440p source: nearest tier at or below native is 1080p
    assert_eq!(body[1]["label"], "HLS 1080p");
}

#[tokio::test]
async fn test_configured_formats_are_offered() {
    let mut config = Config::default();
    config.streaming.adaptive_formats = vec![
        scenestream_engine::StreamFormat::Hls,
        scenestream_engine::StreamFormat::Dash,
    ];
    config.streaming.fixed_formats = vec![scenestream_engine::StreamFormat::Mp4];
    config.transcode.max_size = Some("480p".into());

    let harness = TestHarness::with_config(config);
    let scene = harness.add_scene("Formats", probed("avi", "mpeg4", Some("mp3"), 1280, 720));
    let app = create_router(harness.ctx.clone());

    let response = app
        .oneshot(
            Request::get(format!("/api/scenes/{scene}/streams"))
                .header(header::HOST, "localhost")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_to_json(response.into_body()).await;

    let labels: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["label"].as_str().unwrap())
        .collect();
    assert_eq!(
        labels,
        ["HLS 480p", "DASH 480p", "HLS 240p", "DASH 240p", "MP4 480p", "MP4 240p"]
    );
}

#[tokio::test]
async fn test_policy_update_is_persisted() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "[server]\nport = 9200\n").unwrap();

    let harness = TestHarness::with_config(load_config(&config_path).unwrap());
    let ctx = harness.ctx.clone().with_config_path(Some(config_path.clone()));
    let app = create_router(ctx);

    let response = app
        .oneshot(
            Request::put("/api/config/transcode")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"max_size":"FULL_HD","max_bitrate":6000000}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let saved = load_config(&config_path).unwrap();
    assert_eq!(saved.server.port, 9200);
    assert_eq!(saved.transcode.max_size.as_deref(), Some("1080p"));
    assert_eq!(saved.transcode.max_bitrate, Some(6_000_000));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let harness = TestHarness::new();
    let app = create_router(harness.ctx.clone());

    let response = app
        .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
