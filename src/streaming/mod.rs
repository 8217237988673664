//! Stream endpoint resolution for scenes.
//!
//! Ties the engine to storage and HTTP: looks up a scene's primary file,
//! snapshots the live transcode policy and builds the endpoint set with
//! URLs rooted at the server's public base URL.
//!
//! # Routes
//!
//! - `GET /api/scenes/{id}/streams` - Endpoint set as JSON
//! - `GET /scene/{id}/stream` - Direct file streaming with range support
//! - `GET /scene/{id}/stream/{target}` - Remux/transcode handoff

mod direct;
mod handoff;
mod policy_store;
mod repository;
mod urls;

pub use direct::stream_scene;
pub use handoff::UnavailableHandoff;
pub use policy_store::{PolicySource, PolicyStore};
pub use repository::{DbSceneRepository, SceneRepository};
pub use urls::{parse_stream_target, SceneUrlBuilder};

use scenestream_common::{Error, Result, SceneId};
use scenestream_db::models::MediaFileRecord;
use scenestream_engine::{
    EndpointGenerator, EndpointSet, HandoffTicket, StreamOptions, StreamRequest, StreamTarget,
    TranscodeHandoff,
};

/// Primary file of an existing scene.
///
/// A missing scene is `NotFound`; a scene without a primary file is
/// `InvalidInput` since it cannot be streamed at all.
pub fn load_primary(repo: &dyn SceneRepository, scene_id: SceneId) -> Result<MediaFileRecord> {
    let (_, primary) = repo
        .scene_with_primary(scene_id)?
        .ok_or_else(|| Error::not_found(format!("scene {scene_id}")))?;
    primary
        .ok_or_else(|| Error::invalid_input(format!("scene {scene_id} has no primary media file")))
}

/// Everything a stream resolution reads.
#[derive(Clone, Copy)]
pub struct StreamContext<'a> {
    pub repo: &'a dyn SceneRepository,
    pub policy: &'a dyn PolicySource,
    pub options: &'a StreamOptions,
    pub base_url: &'a str,
}

impl StreamContext<'_> {
    /// Resolve the ordered endpoint set for a scene.
    pub fn resolve(&self, scene_id: SceneId) -> Result<EndpointSet> {
        let record = load_primary(self.repo, scene_id)?;
        self.resolve_record(scene_id, &record)
    }

    fn resolve_record(&self, scene_id: SceneId, record: &MediaFileRecord) -> Result<EndpointSet> {
        let policy = self.policy.current();
        let urls = SceneUrlBuilder::new(self.base_url, scene_id);

        let endpoints = EndpointGenerator::new(&policy, self.options)
            .generate(&record.to_media_file(), &urls)?;

        tracing::debug!(
            scene = %scene_id,
            file = %record.id,
            endpoints = endpoints.len(),
            "resolved stream endpoints"
        );
        Ok(endpoints)
    }

    /// Hand a remux or transcode request to the executor.
    ///
    /// The target must be one the scene currently offers; anything else is
    /// `NotFound` so clients cannot ask for tiers above the policy ceiling.
    pub fn request(
        &self,
        handoff: &dyn TranscodeHandoff,
        scene_id: SceneId,
        target: StreamTarget,
    ) -> Result<HandoffTicket> {
        if !target.mode.needs_executor() {
            return Err(Error::invalid_input("direct streams are served without a handoff"));
        }

        let record = load_primary(self.repo, scene_id)?;
        let endpoints = self.resolve_record(scene_id, &record)?;
        if endpoints.find(&target).is_none() {
            return Err(Error::not_found(format!(
                "scene {scene_id} does not offer {} {}",
                target.mode, target.format
            )));
        }

        let request = StreamRequest::new(scene_id, target);
        let ticket = handoff.submit(&request, &record.to_media_file())?;
        tracing::info!(job = %ticket.job_key, reused = ticket.reused, "stream handed off");
        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use parking_lot::Mutex;
    use scenestream_common::MediaFileId;
    use scenestream_db::models::Scene;
    use scenestream_engine::{DeliveryMode, MediaFile, QualityTier, StreamFormat, TranscodePolicy};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryRepository {
        scenes: HashMap<SceneId, Option<MediaFileRecord>>,
    }

    impl MemoryRepository {
        fn with_scene(mut self, id: i64, file: Option<MediaFileRecord>) -> Self {
            self.scenes.insert(SceneId::new(id).unwrap(), file);
            self
        }
    }

    impl SceneRepository for MemoryRepository {
        fn scene_with_primary(
            &self,
            id: SceneId,
        ) -> Result<Option<(Scene, Option<MediaFileRecord>)>> {
            Ok(self.scenes.get(&id).map(|file| {
                let scene = Scene {
                    id,
                    title: format!("Scene {id}"),
                    created_at: Utc::now(),
                };
                (scene, file.clone())
            }))
        }
    }

    #[derive(Default)]
    struct RecordingHandoff {
        submitted: Mutex<Vec<String>>,
    }

    impl TranscodeHandoff for RecordingHandoff {
        fn submit(&self, request: &StreamRequest, _file: &MediaFile) -> Result<HandoffTicket> {
            let key = request.job_key();
            let mut submitted = self.submitted.lock();
            let reused = submitted.contains(&key);
            submitted.push(key.clone());
            Ok(HandoffTicket { job_key: key, reused })
        }
    }

    fn record(scene: i64, container: &str, video: &str, audio: Option<&str>, w: u32, h: u32) -> MediaFileRecord {
        MediaFileRecord {
            id: MediaFileId::new(scene * 10).unwrap(),
            scene_id: SceneId::new(scene).unwrap(),
            file_path: format!("/media/{scene}.{container}"),
            container: container.into(),
            video_codec: video.into(),
            audio_codec: audio.map(Into::into),
            width: w,
            height: h,
            duration_secs: 120.0,
            bit_rate: 6_000_000,
            file_size: 90_000_000,
            is_primary: true,
            created_at: Utc::now(),
        }
    }

    fn repo() -> MemoryRepository {
        MemoryRepository::default()
            .with_scene(1, Some(record(1, "mp4", "h264", Some("aac"), 1920, 1080)))
            .with_scene(2, Some(record(2, "mkv", "hevc", Some("dts"), 3840, 2160)))
            .with_scene(3, None)
    }

    fn scene(id: i64) -> SceneId {
        SceneId::new(id).unwrap()
    }

    #[test]
    fn resolves_with_base_url() {
        let repo = repo();
        let policy = PolicyStore::default();
        let options = StreamOptions::default();
        let ctx = StreamContext {
            repo: &repo,
            policy: &policy,
            options: &options,
            base_url: "https://media.example.com/",
        };

        let endpoints = ctx.resolve(scene(1)).unwrap();
        assert_eq!(endpoints[0].mode, DeliveryMode::Direct);
        assert_eq!(endpoints[0].url, "https://media.example.com/scene/1/stream");
        assert!(endpoints
            .iter()
            .skip(1)
            .all(|e| e.url.starts_with("https://media.example.com/scene/1/stream/stream.m3u8")));
    }

    #[test]
    fn missing_scene_and_missing_file() {
        let repo = repo();
        let policy = PolicyStore::default();
        let options = StreamOptions::default();
        let ctx = StreamContext {
            repo: &repo,
            policy: &policy,
            options: &options,
            base_url: "http://localhost",
        };

        assert!(matches!(ctx.resolve(scene(99)), Err(Error::NotFound(_))));
        assert!(matches!(ctx.resolve(scene(3)), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn policy_change_applies_to_next_resolution() {
        let repo = repo();
        let policy = PolicyStore::default();
        let options = StreamOptions::default();
        let ctx = StreamContext {
            repo: &repo,
            policy: &policy,
            options: &options,
            base_url: "http://localhost",
        };

        let top = |set: &EndpointSet| set.iter().filter_map(|e| e.tier).max();
        assert_eq!(top(&ctx.resolve(scene(2)).unwrap()), Some(QualityTier::FourK));

        policy
            .replace(TranscodePolicy::capped_at(QualityTier::StandardHd))
            .unwrap();
        assert_eq!(top(&ctx.resolve(scene(2)).unwrap()), Some(QualityTier::StandardHd));
    }

    #[test]
    fn request_only_accepts_offered_targets() {
        let repo = repo();
        let policy = PolicyStore::new(TranscodePolicy::capped_at(QualityTier::StandardHd));
        let options = StreamOptions::default();
        let handoff = RecordingHandoff::default();
        let ctx = StreamContext {
            repo: &repo,
            policy: &policy,
            options: &options,
            base_url: "http://localhost",
        };

        let offered = StreamTarget::adaptive(StreamFormat::Hls, QualityTier::StandardHd);
        let ticket = ctx.request(&handoff, scene(2), offered).unwrap();
        assert_eq!(ticket.job_key, "scene-2/transcode_adaptive/hls/720p");
        assert!(!ticket.reused);
        assert!(ctx.request(&handoff, scene(2), offered).unwrap().reused);

        let above_ceiling = StreamTarget::adaptive(StreamFormat::Hls, QualityTier::FullHd);
        assert!(matches!(
            ctx.request(&handoff, scene(2), above_ceiling),
            Err(Error::NotFound(_))
        ));

        let not_remuxable = StreamTarget::remux(StreamFormat::Mp4);
        assert!(matches!(
            ctx.request(&handoff, scene(2), not_remuxable),
            Err(Error::NotFound(_))
        ));

        assert!(matches!(
            ctx.request(&handoff, scene(1), StreamTarget::direct()),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(handoff.submitted.lock().len(), 2);
    }
}
