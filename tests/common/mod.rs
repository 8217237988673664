//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, default config
//! and full [`AppContext`]. The [`TestHarness::with_server`] constructor
//! starts Axum on a random port for HTTP-level testing.
//!
//! The in-memory pool holds a single connection: drop any connection taken
//! with [`TestHarness::conn`] before issuing HTTP requests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use scenestream::config::Config;
use scenestream::server::{create_router, AppContext};
use scenestream::streaming::DbSceneRepository;
use scenestream_common::SceneId;
use scenestream_db::models::NewMediaFile;
use scenestream_db::pool::{init_memory_pool, DbPool};
use scenestream_db::queries::{media_files, scenes};
use scenestream_engine::TranscodeHandoff;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
}

impl TestHarness {
    /// Create a new harness with default configuration and in-memory DB.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration and in-memory DB.
    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let repo = Arc::new(DbSceneRepository::new(db.clone()));
        let ctx = AppContext::new(config, repo).expect("invalid test config");

        Self { ctx, db }
    }

    pub fn with_handoff(mut self, handoff: Arc<dyn TranscodeHandoff>) -> Self {
        self.ctx = self.ctx.with_handoff(handoff);
        self
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::new().serve().await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        Self::with_config(config).serve().await
    }

    pub async fn serve(self) -> (Self, SocketAddr) {
        let app = create_router(self.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (self, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> scenestream_db::pool::PooledConnection {
        scenestream_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    /// Insert a scene with one (primary) file.
    pub fn add_scene(&self, title: &str, file: NewMediaFile) -> SceneId {
        let conn = self.conn();
        let scene = scenes::create_scene(&conn, title).expect("failed to create scene");
        media_files::create_media_file(&conn, scene.id, &file).expect("failed to create file");
        scene.id
    }

    /// Insert a scene without any media file.
    pub fn add_empty_scene(&self, title: &str) -> SceneId {
        let conn = self.conn();
        scenes::create_scene(&conn, title)
            .expect("failed to create scene")
            .id
    }
}

/// Probe data for a file with the given stream layout.
pub fn probed(
    container: &str,
    video: &str,
    audio: Option<&str>,
    width: u32,
    height: u32,
) -> NewMediaFile {
    NewMediaFile {
        file_path: format!("/media/test.{container}"),
        container: container.into(),
        video_codec: video.into(),
        audio_codec: audio.map(Into::into),
        width,
        height,
        duration_secs: 1800.0,
        bit_rate: 6_000_000,
        file_size: 1_350_000_000,
    }
}
