//! Stream URL layout.
//!
//! ```text
//! {base}/scene/{id}/stream                               direct
//! {base}/scene/{id}/stream/remux.{mp4|webm}              remux
//! {base}/scene/{id}/stream/stream.{m3u8|mpd}?resolution= adaptive
//! {base}/scene/{id}/stream/transcode.{mp4|webm}?resolution= fixed quality
//! ```
//!
//! [`parse_stream_target`] is the inverse of [`SceneUrlBuilder`] for the
//! part after `/stream/`.

use scenestream_common::{Error, Result, SceneId};
use scenestream_engine::{DeliveryMode, QualityTier, StreamFormat, StreamTarget, StreamUrlBuilder};

const REMUX_STEM: &str = "remux";
const ADAPTIVE_STEM: &str = "stream";
const FIXED_STEM: &str = "transcode";

/// Builds absolute stream URLs for one scene.
#[derive(Debug, Clone)]
pub struct SceneUrlBuilder {
    base: String,
    scene: SceneId,
}

impl SceneUrlBuilder {
    pub fn new(base_url: &str, scene: SceneId) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
            scene,
        }
    }

    fn stream_root(&self) -> String {
        format!("{}/scene/{}/stream", self.base, self.scene)
    }
}

impl StreamUrlBuilder for SceneUrlBuilder {
    fn url_for(&self, target: &StreamTarget) -> String {
        let root = self.stream_root();
        let ext = target.format.extension().unwrap_or_default();
        let tier = target.tier.map_or("", |t| t.name());

        match target.mode {
            DeliveryMode::Direct => root,
            DeliveryMode::Remux => format!("{root}/{REMUX_STEM}.{ext}"),
            DeliveryMode::TranscodeAdaptive => {
                format!("{root}/{ADAPTIVE_STEM}.{ext}?resolution={tier}")
            }
            DeliveryMode::TranscodeFixedQuality => {
                format!("{root}/{FIXED_STEM}.{ext}?resolution={tier}")
            }
        }
    }
}

/// Rebuild the target from the last path segment and `resolution` query.
pub fn parse_stream_target(file_name: &str, resolution: Option<&str>) -> Result<StreamTarget> {
    let (stem, ext) = file_name
        .rsplit_once('.')
        .ok_or_else(|| Error::invalid_input(format!("unknown stream target: {file_name:?}")))?;
    let format = StreamFormat::from_extension(ext)
        .ok_or_else(|| Error::invalid_input(format!("unknown stream format: {ext:?}")))?;

    let tier = || -> Result<QualityTier> {
        resolution
            .ok_or_else(|| Error::invalid_input("missing resolution parameter"))?
            .parse()
    };

    let target = match stem {
        REMUX_STEM => StreamTarget::remux(format),
        ADAPTIVE_STEM => StreamTarget::adaptive(format, tier()?),
        FIXED_STEM => StreamTarget::fixed(format, tier()?),
        other => {
            return Err(Error::invalid_input(format!("unknown stream target: {other:?}")));
        }
    };

    target.validate()?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> SceneUrlBuilder {
        SceneUrlBuilder::new("http://media.local:8080/", SceneId::new(42).unwrap())
    }

    fn split(url: &str) -> (&str, Option<&str>) {
        let tail = url.rsplit('/').next().unwrap();
        match tail.split_once("?resolution=") {
            Some((name, res)) => (name, Some(res)),
            None => (tail, None),
        }
    }

    #[test]
    fn url_shapes() {
        let urls = builder();
        assert_eq!(
            urls.url_for(&StreamTarget::direct()),
            "http://media.local:8080/scene/42/stream"
        );
        assert_eq!(
            urls.url_for(&StreamTarget::remux(StreamFormat::Mp4)),
            "http://media.local:8080/scene/42/stream/remux.mp4"
        );
        assert_eq!(
            urls.url_for(&StreamTarget::adaptive(StreamFormat::Hls, QualityTier::FullHd)),
            "http://media.local:8080/scene/42/stream/stream.m3u8?resolution=1080p"
        );
        assert_eq!(
            urls.url_for(&StreamTarget::fixed(StreamFormat::WebM, QualityTier::Standard)),
            "http://media.local:8080/scene/42/stream/transcode.webm?resolution=480p"
        );
    }

    #[test]
    fn parse_inverts_builder() {
        let urls = builder();
        let targets = [
            StreamTarget::remux(StreamFormat::WebM),
            StreamTarget::adaptive(StreamFormat::Hls, QualityTier::StandardHd),
            StreamTarget::adaptive(StreamFormat::Dash, QualityTier::Original),
            StreamTarget::fixed(StreamFormat::Mp4, QualityTier::Low),
        ];
        for target in targets {
            let url = urls.url_for(&target);
            let (name, resolution) = split(&url);
            assert_eq!(parse_stream_target(name, resolution).unwrap(), target, "{url}");
        }
    }

    #[test]
    fn parse_rejects_malformed_targets() {
        for (name, res) in [
            ("stream", None),
            ("stream.avi", Some("720p")),
            ("stream.m3u8", None),
            ("stream.m3u8", Some("1440p")),
            ("remux.m3u8", None),
            ("stream.mp4", Some("720p")),
            ("video.mp4", None),
        ] {
            let err = parse_stream_target(name, res).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{name} {res:?}");
        }
    }
}
