//! Database query modules.
//!
//! - scenes: scene records
//! - media_files: files backing a scene and its primary file

pub mod media_files;
pub mod scenes;
