use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scenestream")]
#[command(author, version, about = "Media library streaming server")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Resolve stream endpoints for probe metadata and print them as JSON
    Resolve {
        #[command(flatten)]
        probe: ProbeArgs,

        /// Override the configured transcode max_size (e.g. 720p, unlimited)
        #[arg(long)]
        max_size: Option<String>,

        /// Base URL used in the generated links
        #[arg(long, default_value = "http://localhost:8080")]
        base_url: String,

        /// Scene id used in the generated links
        #[arg(long, default_value_t = 1)]
        scene: i64,
    },

    /// Register a scene and its primary file in the database
    AddScene {
        /// Scene title
        #[arg(required = true)]
        title: String,

        /// Path of the media file on disk
        #[arg(long)]
        file: PathBuf,

        #[command(flatten)]
        probe: ProbeArgs,
    },

    /// Display version information
    Version,
}

/// Probe metadata of a media file.
#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Container format (mp4, mkv, webm, ...)
    #[arg(long)]
    pub container: String,

    /// Video codec (h264, hevc, vp9, ...)
    #[arg(long)]
    pub video_codec: String,

    /// Audio codec; omit for files without audio
    #[arg(long)]
    pub audio_codec: Option<String>,

    #[arg(long)]
    pub width: u32,

    #[arg(long)]
    pub height: u32,

    /// Average bitrate in bits per second (0 = unknown)
    #[arg(long, default_value_t = 0)]
    pub bitrate: u64,

    /// Duration in seconds
    #[arg(long, default_value_t = 0.0)]
    pub duration: f64,

    /// File size in bytes
    #[arg(long, default_value_t = 0)]
    pub size: u64,
}
