//! Scenestream - stream endpoint resolution for a media library server
//!
//! This library crate exposes the server and its configuration for
//! integration testing. The resolution logic itself lives in
//! `scenestream-engine`.

pub mod config;
pub mod server;
pub mod streaming;
