//! Writing API-edited settings back to the config file.
//!
//! Uses toml_edit so operator comments and formatting survive.

use super::TranscodeConfig;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use toml_edit::DocumentMut;

#[derive(Serialize)]
struct TranscodeWrapper<'a> {
    transcode: &'a TranscodeConfig,
}

/// Replace the `[transcode]` table, keeping every other section as written.
pub fn update_transcode(path: &Path, transcode: &TranscodeConfig) -> Result<()> {
    let mut doc: DocumentMut = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        content
            .parse()
            .with_context(|| format!("Failed to parse config file: {:?}", path))?
    } else {
        DocumentMut::new()
    };

    let transcode_toml = toml::to_string(&TranscodeWrapper { transcode })
        .with_context(|| "Failed to serialize transcode config")?;
    let transcode_doc: DocumentMut = transcode_toml
        .parse()
        .with_context(|| "Failed to parse serialized transcode config")?;

    match transcode_doc.get("transcode") {
        Some(item) => doc["transcode"] = item.clone(),
        None => {
            doc.remove("transcode");
        }
    }

    std::fs::write(path, doc.to_string())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;

    #[test]
    fn test_update_transcode_preserves_other_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9100\n\n[transcode]\nmax_size = \"1080p\"\n").unwrap();

        let transcode = TranscodeConfig {
            max_size: Some("480p".into()),
            max_bitrate: Some(1_500_000),
            ..Default::default()
        };
        update_transcode(&path, &transcode).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.transcode, transcode);
    }

    #[test]
    fn test_update_transcode_keeps_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "# operator note: do not expose\n[server]\nport = 9100 # public\n",
        )
        .unwrap();

        let transcode = TranscodeConfig {
            max_size: Some("720p".into()),
            ..Default::default()
        };
        update_transcode(&path, &transcode).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# operator note: do not expose"));
        assert!(content.contains("port = 9100 # public"));

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.transcode.max_size.as_deref(), Some("720p"));
    }

    #[test]
    fn test_update_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.toml");

        update_transcode(&path, &TranscodeConfig::default()).unwrap();
        assert!(path.exists());
        assert!(load_config(&path).is_ok());
    }
}
