//! scenestream-db: SQLite schema, migrations and queries.
//!
//! # Example
//!
//! ```
//! use scenestream_db::models::NewMediaFile;
//! use scenestream_db::pool::{get_conn, init_memory_pool};
//! use scenestream_db::queries::{media_files, scenes};
//!
//! let pool = init_memory_pool().unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let scene = scenes::create_scene(&conn, "Opening").unwrap();
//! let probe = NewMediaFile {
//!     file_path: "/media/opening.mp4".into(),
//!     container: "mp4".into(),
//!     video_codec: "h264".into(),
//!     ..Default::default()
//! };
//! media_files::create_media_file(&conn, scene.id, &probe).unwrap();
//! assert!(media_files::get_primary_file(&conn, scene.id).unwrap().is_some());
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
