//! scenestream-engine: decides how a scene can be streamed.
//!
//! Given a media file's container, codecs, resolution and bitrate plus the
//! server's transcode policy, the engine produces the ordered list of stream
//! endpoints a client can choose from. It is pure and synchronous: no I/O,
//! no shared state, safe to call from any number of request handlers.

pub mod capability;
pub mod endpoint;
pub mod handoff;
pub mod media;
pub mod policy;
pub mod resolver;

pub use capability::{classify, Playability};
pub use endpoint::{DeliveryMode, EndpointSet, StreamEndpoint, StreamFormat};
pub use handoff::{HandoffTicket, StreamRequest, StreamTarget, TranscodeHandoff};
pub use media::*;
pub use policy::{compute_ceiling, quality_ladder, Ceiling, QualityTier, Rung, TranscodePolicy};
pub use resolver::{resolve_streams, EndpointGenerator, StreamOptions, StreamUrlBuilder};
