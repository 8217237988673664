use scenestream_common::{Error, Result};
use scenestream_engine::{QualityTier, StreamFormat, StreamOptions, TranscodePolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub transcode: TranscodeConfig,

    #[serde(default)]
    pub streaming: StreamingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Public URL clients reach the server at. Derived from the request
    /// `Host` header when unset.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> PathBuf {
    PathBuf::from("scenestream.db")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            db_path: default_db_path(),
        }
    }
}

/// Transcode limits as written in the config file.
///
/// Values are signed so a negative entry is reported instead of failing to
/// deserialize.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TranscodeConfig {
    /// `"unlimited"` or a tier name such as `"1080p"` / `"FULL_HD"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<i64>,

    /// Bits per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bitrate: Option<i64>,
}

impl TranscodeConfig {
    /// Convert into a validated policy.
    pub fn to_policy(&self) -> Result<TranscodePolicy> {
        let max_tier = match self.max_size.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("unlimited") => None,
            Some(s) => {
                let tier: QualityTier = s
                    .parse()
                    .map_err(|_| Error::configuration(format!("unknown transcode max_size: {s:?}")))?;
                (tier != QualityTier::Original).then_some(tier)
            }
        };

        let policy = TranscodePolicy {
            max_width: limit("max_width", self.max_width)?,
            max_height: limit("max_height", self.max_height)?,
            max_bitrate: limit("max_bitrate", self.max_bitrate)?,
            max_tier,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn from_policy(policy: &TranscodePolicy) -> Self {
        Self {
            max_size: Some(
                policy
                    .max_tier
                    .map_or_else(|| "unlimited".to_string(), |t| t.name().to_string()),
            ),
            max_width: policy.max_width.map(i64::from),
            max_height: policy.max_height.map(i64::from),
            max_bitrate: policy.max_bitrate.and_then(|b| i64::try_from(b).ok()),
        }
    }
}

fn limit<T: TryFrom<i64>>(name: &str, value: Option<i64>) -> Result<Option<T>> {
    match value {
        None => Ok(None),
        Some(v) if v <= 0 => Err(Error::configuration(format!(
            "transcode {name} must be positive, got {v}"
        ))),
        Some(v) => T::try_from(v)
            .map(Some)
            .map_err(|_| Error::configuration(format!("transcode {name} is too large: {v}"))),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StreamingConfig {
    #[serde(default = "default_adaptive_formats")]
    pub adaptive_formats: Vec<StreamFormat>,

    #[serde(default)]
    pub fixed_formats: Vec<StreamFormat>,
}

fn default_adaptive_formats() -> Vec<StreamFormat> {
    vec![StreamFormat::Hls]
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            adaptive_formats: default_adaptive_formats(),
            fixed_formats: Vec::new(),
        }
    }
}

impl StreamingConfig {
    pub fn to_options(&self) -> Result<StreamOptions> {
        let options = StreamOptions {
            adaptive_formats: self.adaptive_formats.clone(),
            fixed_formats: self.fixed_formats.clone(),
        };
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert!(config.server.base_url.is_none());
        assert!(config.transcode.to_policy().unwrap().is_unlimited());
        assert_eq!(config.streaming.adaptive_formats, vec![StreamFormat::Hls]);
    }

    #[test]
    fn test_parse_transcode_section() {
        let config: Config = toml::from_str(
            r#"
            [transcode]
            max_size = "720p"
            max_bitrate = 4000000

            [streaming]
            adaptive_formats = ["hls", "dash"]
            fixed_formats = ["mp4"]
            "#,
        )
        .unwrap();

        let policy = config.transcode.to_policy().unwrap();
        assert_eq!(policy.max_tier, Some(QualityTier::StandardHd));
        assert_eq!(policy.max_bitrate, Some(4_000_000));

        let options = config.streaming.to_options().unwrap();
        assert_eq!(options.adaptive_formats, vec![StreamFormat::Hls, StreamFormat::Dash]);
        assert_eq!(options.fixed_formats, vec![StreamFormat::Mp4]);
    }

    #[test]
    fn test_graphql_style_size_names() {
        let config = TranscodeConfig {
            max_size: Some("FULL_HD".into()),
            ..Default::default()
        };
        assert_eq!(config.to_policy().unwrap().max_tier, Some(QualityTier::FullHd));
    }

    #[test]
    fn test_unlimited_is_valid() {
        for size in ["unlimited", "UNLIMITED", "original", ""] {
            let config = TranscodeConfig {
                max_size: Some(size.into()),
                ..Default::default()
            };
            assert!(config.to_policy().unwrap().is_unlimited(), "{size}");
        }
    }

    #[test]
    fn test_negative_and_zero_limits_rejected() {
        for config in [
            TranscodeConfig {
                max_width: Some(-1),
                ..Default::default()
            },
            TranscodeConfig {
                max_height: Some(0),
                ..Default::default()
            },
            TranscodeConfig {
                max_bitrate: Some(-500),
                ..Default::default()
            },
            TranscodeConfig {
                max_width: Some(i64::MAX),
                ..Default::default()
            },
        ] {
            let err = config.to_policy().unwrap_err();
            assert!(matches!(err, Error::Configuration(_)), "{config:?}");
        }
    }

    #[test]
    fn test_unknown_size_rejected() {
        let config = TranscodeConfig {
            max_size: Some("8k".into()),
            ..Default::default()
        };
        assert!(matches!(config.to_policy(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_policy_round_trip() {
        let policy = TranscodePolicy {
            max_width: Some(1280),
            max_height: None,
            max_bitrate: Some(3_000_000),
            max_tier: Some(QualityTier::StandardHd),
        };
        let config = TranscodeConfig::from_policy(&policy);
        assert_eq!(config.max_size.as_deref(), Some("720p"));
        assert_eq!(config.to_policy().unwrap(), policy);
    }

    #[test]
    fn test_fixed_formats_must_be_progressive() {
        let streaming = StreamingConfig {
            adaptive_formats: vec![StreamFormat::Hls],
            fixed_formats: vec![StreamFormat::Dash],
        };
        assert!(streaming.to_options().is_err());
    }
}
