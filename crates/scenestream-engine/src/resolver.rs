//! Endpoint generation.
//!
//! [`resolve_streams`] turns one media file and one policy snapshot into the
//! ordered [`EndpointSet`] offered to clients:
//!
//! 1. a direct endpoint if the file plays as-is, or a remux endpoint if only
//!    its container is wrong (never both);
//! 2. adaptive transcodes at every rung of the quality ladder, highest first,
//!    one per configured adaptive format;
//! 3. fixed-quality transcodes per configured progressive format, if any.
//!
//! URLs come from a [`StreamUrlBuilder`], so the generator never builds
//! paths itself and the same inputs always yield the same URLs.

use scenestream_common::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::capability::{classify, remux_container, Playability};
use crate::endpoint::{DeliveryMode, EndpointSet, StreamEndpoint, StreamFormat};
use crate::handoff::StreamTarget;
use crate::media::{Container, MediaFile};
use crate::policy::{compute_ceiling, quality_ladder, Rung, TranscodePolicy};

/// Turns a stream target into an absolute URL for one scene.
pub trait StreamUrlBuilder {
    fn url_for(&self, target: &StreamTarget) -> String;
}

impl<F> StreamUrlBuilder for F
where
    F: Fn(&StreamTarget) -> String,
{
    fn url_for(&self, target: &StreamTarget) -> String {
        self(target)
    }
}

/// Which transcode formats are offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamOptions {
    /// Segmented formats, in tie-break order.
    pub adaptive_formats: Vec<StreamFormat>,
    /// Progressive fixed-quality formats; empty disables them.
    pub fixed_formats: Vec<StreamFormat>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            adaptive_formats: vec![StreamFormat::Hls],
            fixed_formats: Vec::new(),
        }
    }
}

impl StreamOptions {
    pub fn validate(&self) -> Result<()> {
        if self.adaptive_formats.is_empty() {
            return Err(Error::configuration(
                "at least one adaptive stream format is required",
            ));
        }
        if let Some(bad) = self.adaptive_formats.iter().find(|f| !f.is_adaptive()) {
            return Err(Error::configuration(format!("{bad} is not an adaptive format")));
        }
        if let Some(bad) = self.fixed_formats.iter().find(|f| !f.is_progressive()) {
            return Err(Error::configuration(format!(
                "{bad} is not a fixed-quality format"
            )));
        }
        Ok(())
    }
}

/// Resolve endpoints with the default stream options.
pub fn resolve_streams<U>(file: &MediaFile, policy: &TranscodePolicy, urls: &U) -> Result<EndpointSet>
where
    U: StreamUrlBuilder + ?Sized,
{
    EndpointGenerator::new(policy, &StreamOptions::default()).generate(file, urls)
}

/// Endpoint generator for one policy snapshot.
#[derive(Debug, Clone, Copy)]
pub struct EndpointGenerator<'a> {
    policy: &'a TranscodePolicy,
    options: &'a StreamOptions,
}

impl<'a> EndpointGenerator<'a> {
    pub fn new(policy: &'a TranscodePolicy, options: &'a StreamOptions) -> Self {
        Self { policy, options }
    }

    /// Build the complete endpoint set for `file`, or fail without a partial result.
    pub fn generate<U>(&self, file: &MediaFile, urls: &U) -> Result<EndpointSet>
    where
        U: StreamUrlBuilder + ?Sized,
    {
        if !file.id.is_valid() {
            return Err(Error::invalid_input(format!(
                "media file has invalid id {}",
                file.id
            )));
        }
        self.options.validate()?;

        let playability = classify(&file.container, &file.video_codec, file.audio_codec.as_ref());
        let ceiling = compute_ceiling(self.policy, file)?;
        let ladder = quality_ladder(&ceiling);

        if !(file.duration_secs > 0.0) || file.file_size == 0 {
            tracing::debug!(
                file_id = %file.id,
                duration = file.duration_secs,
                size = file.file_size,
                "file looks like a placeholder, resolving best-effort endpoints"
            );
        }

        let formats = self.options.adaptive_formats.len() + self.options.fixed_formats.len();
        let mut endpoints = Vec::with_capacity(1 + ladder.len() * formats);

        match playability {
            Playability::DirectPlayable => endpoints.push(direct_endpoint(file, urls)),
            Playability::RemuxOnly => {
                if let Some(container) = remux_container(&file.video_codec, file.audio_codec.as_ref()) {
                    endpoints.push(remux_endpoint(file, container, urls));
                }
            }
            Playability::TranscodeRequired => {}
        }

        for rung in &ladder {
            for &format in &self.options.adaptive_formats {
                let target = StreamTarget::adaptive(format, rung.tier);
                endpoints.push(transcode_endpoint(file, target, rung, urls));
            }
        }

        for &format in &self.options.fixed_formats {
            for rung in &ladder {
                let target = StreamTarget::fixed(format, rung.tier);
                endpoints.push(transcode_endpoint(file, target, rung, urls));
            }
        }

        tracing::debug!(
            file_id = %file.id,
            %playability,
            ceiling = %ceiling.resolution,
            rungs = ladder.len(),
            endpoints = endpoints.len(),
            "resolved stream endpoints"
        );

        Ok(EndpointSet::new(endpoints))
    }
}

fn direct_endpoint<U: StreamUrlBuilder + ?Sized>(file: &MediaFile, urls: &U) -> StreamEndpoint {
    let target = StreamTarget::direct();
    let (width, height) = native_dimensions(file);
    StreamEndpoint {
        mode: DeliveryMode::Direct,
        format: StreamFormat::Direct,
        label: "Direct stream".to_string(),
        container: file.container.clone(),
        video_codec: file.video_codec.clone(),
        audio_codec: file.audio_codec.clone(),
        mime_type: file.container.mime_type().to_string(),
        width,
        height,
        bitrate: (file.bit_rate > 0).then_some(file.bit_rate),
        tier: None,
        url: urls.url_for(&target),
    }
}

fn remux_endpoint<U: StreamUrlBuilder + ?Sized>(
    file: &MediaFile,
    container: Container,
    urls: &U,
) -> StreamEndpoint {
    let format = StreamFormat::for_container(&container).unwrap_or(StreamFormat::Mp4);
    let target = StreamTarget::remux(format);
    let (width, height) = native_dimensions(file);
    StreamEndpoint {
        mode: DeliveryMode::Remux,
        format,
        label: format!("Remux ({})", format.display_name()),
        mime_type: container.mime_type().to_string(),
        container,
        video_codec: file.video_codec.clone(),
        audio_codec: file.audio_codec.clone(),
        width,
        height,
        bitrate: (file.bit_rate > 0).then_some(file.bit_rate),
        tier: None,
        url: urls.url_for(&target),
    }
}

fn transcode_endpoint<U: StreamUrlBuilder + ?Sized>(
    file: &MediaFile,
    target: StreamTarget,
    rung: &Rung,
    urls: &U,
) -> StreamEndpoint {
    // Silent sources stay silent.
    let (container, video_codec, audio_codec) = match target.format.transcode_output() {
        Some((container, video, audio)) => (container, video, file.audio_codec.as_ref().map(|_| audio)),
        None => (
            file.container.clone(),
            file.video_codec.clone(),
            file.audio_codec.clone(),
        ),
    };
    StreamEndpoint {
        mode: target.mode,
        format: target.format,
        label: format!("{} {}", target.format.display_name(), rung.tier),
        container,
        video_codec,
        audio_codec,
        mime_type: target.format.mime_type().to_string(),
        width: Some(rung.resolution.width),
        height: Some(rung.resolution.height),
        bitrate: Some(rung.bitrate),
        tier: Some(rung.tier),
        url: urls.url_for(&target),
    }
}

fn native_dimensions(file: &MediaFile) -> (Option<u32>, Option<u32>) {
    if file.resolution.is_known() {
        (Some(file.resolution.width), Some(file.resolution.height))
    } else {
        (None, None)
    }
}
