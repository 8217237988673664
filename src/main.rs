mod cli;

use scenestream::{config, server, streaming::SceneUrlBuilder};
use scenestream_common::{MediaFileId, SceneId};
use scenestream_db::models::NewMediaFile;
use scenestream_db::pool::init_pool;
use scenestream_db::queries::{media_files, scenes};
use scenestream_engine::{
    AudioCodec, Container, EndpointGenerator, MediaFile, Resolution, VideoCodec,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ProbeArgs};
use std::path::Path;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting Scenestream server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config, config_path.map(Path::to_path_buf)).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "scenestream=trace,scenestream_engine=trace,scenestream_db=debug,scenestream_common=debug,tower_http=debug".to_string()
        } else {
            "scenestream=debug,scenestream_engine=debug,scenestream_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Resolve {
            probe,
            max_size,
            base_url,
            scene,
        } => resolve(&probe, max_size, &base_url, scene, cli.config.as_deref()),
        Commands::AddScene { title, file, probe } => {
            add_scene(&title, &file, &probe, cli.config.as_deref())
        }
        Commands::Version => {
            println!("scenestream {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            let policy = config.transcode.to_policy()?;
            let options = config.streaming.to_options()?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            if let Some(ref base) = config.server.base_url {
                println!("  Base URL: {}", base);
            }
            println!("  Database: {}", config.server.db_path.display());
            println!(
                "  Max size: {}",
                policy.max_tier.map_or("unlimited", |t| t.name())
            );
            if let Some(bitrate) = policy.max_bitrate {
                println!("  Max bitrate: {} bps", bitrate);
            }
            println!(
                "  Adaptive formats: {}",
                join_formats(&options.adaptive_formats)
            );
            println!("  Fixed formats: {}", join_formats(&options.fixed_formats));
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}

fn join_formats(formats: &[scenestream_engine::StreamFormat]) -> String {
    if formats.is_empty() {
        return "none".to_string();
    }
    formats
        .iter()
        .map(|f| f.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn resolve(
    probe: &ProbeArgs,
    max_size: Option<String>,
    base_url: &str,
    scene: i64,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let mut transcode = config.transcode.clone();
    if max_size.is_some() {
        transcode.max_size = max_size;
    }
    let policy = transcode.to_policy().context("Invalid transcode limits")?;
    let options = config.streaming.to_options()?;

    let file = MediaFile {
        id: MediaFileId::new(1)?,
        container: Container::from(probe.container.as_str()),
        video_codec: VideoCodec::from(probe.video_codec.as_str()),
        audio_codec: probe
            .audio_codec
            .as_deref()
            .filter(|codec| !codec.trim().is_empty())
            .map(AudioCodec::from),
        resolution: Resolution::new(probe.width, probe.height),
        duration_secs: probe.duration,
        bit_rate: probe.bitrate,
        file_size: probe.size,
    };

    let urls = SceneUrlBuilder::new(base_url, SceneId::new(scene)?);
    let endpoints = EndpointGenerator::new(&policy, &options).generate(&file, &urls)?;

    println!("{}", serde_json::to_string_pretty(&endpoints)?);
    Ok(())
}

fn add_scene(title: &str, file: &Path, probe: &ProbeArgs, config_path: Option<&Path>) -> Result<()> {
    if title.trim().is_empty() {
        anyhow::bail!("Scene title cannot be empty");
    }

    let config = config::load_config_or_default(config_path)?;
    let db_path = config.server.db_path.to_string_lossy().into_owned();
    let pool = init_pool(&db_path).with_context(|| format!("Failed to open database {db_path}"))?;
    let conn = pool.get().context("Failed to get database connection")?;

    let scene = scenes::create_scene(&conn, title.trim())?;
    let record = media_files::create_media_file(
        &conn,
        scene.id,
        &NewMediaFile {
            file_path: file.to_string_lossy().into_owned(),
            container: Container::from_format_name(
                &probe.container,
                file.extension().and_then(|ext| ext.to_str()),
            )
            .as_str()
            .to_string(),
            video_codec: probe.video_codec.clone(),
            audio_codec: probe.audio_codec.clone(),
            width: probe.width,
            height: probe.height,
            duration_secs: probe.duration,
            bit_rate: probe.bitrate,
            file_size: probe.size,
        },
    )?;

    tracing::info!(scene = %scene.id, file = %record.id, "scene registered");
    println!("scene {} (file {})", scene.id, record.id);
    Ok(())
}
