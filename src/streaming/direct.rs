//! Direct streaming with HTTP range requests.
//!
//! Serves a scene's primary file untouched. Only files the capability model
//! marks as direct playable are served here; everything else goes through
//! the remux/transcode handoff.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use scenestream_common::{Error, SceneId};
use scenestream_engine::{classify, Playability};
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::load_primary;
use crate::server::{AppContext, AppError};

const CACHE_CONTROL: &str = "max-age=31536000";

/// `GET /scene/:id/stream`
pub async fn stream_scene(
    State(ctx): State<AppContext>,
    Path(scene_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let scene_id: SceneId = scene_id.parse()?;
    let record = load_primary(ctx.repo.as_ref(), scene_id)?;
    let file = record.to_media_file();

    if classify(&file.container, &file.video_codec, file.audio_codec.as_ref())
        != Playability::DirectPlayable
    {
        return Err(Error::not_found(format!("scene {scene_id} has no direct stream")).into());
    }

    serve_file(
        std::path::Path::new(&record.file_path),
        file.container.mime_type(),
        &headers,
    )
    .await
}

async fn serve_file(
    file_path: &std::path::Path,
    content_type: &str,
    headers: &HeaderMap,
) -> Result<Response, AppError> {
    let metadata = tokio::fs::metadata(file_path).await.map_err(|e| {
        tracing::warn!(path = ?file_path, error = %e, "primary file missing on disk");
        Error::not_found(format!("media file not on disk: {}", file_path.display()))
    })?;
    let file_size = metadata.len();

    let range = headers
        .get(header::RANGE)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| parse_range_header(s, file_size));

    let mut file = File::open(file_path).await?;

    let builder = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, CACHE_CONTROL);

    let response = match range {
        Some((start, end)) => {
            let length = end - start + 1;
            file.seek(SeekFrom::Start(start)).await?;

            builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_LENGTH, length.to_string())
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", start, end, file_size),
                )
                .body(Body::from_stream(ReaderStream::new(file.take(length))))
        }
        None => builder
            .status(StatusCode::OK)
            .header(header::CONTENT_LENGTH, file_size.to_string())
            .body(Body::from_stream(ReaderStream::new(file))),
    };

    response.map_err(|e| AppError(Error::internal(format!("failed to build response: {e}"))))
}

/// Parse an HTTP `Range` header into an inclusive byte range.
///
/// Supports formats:
/// - bytes=0-499
/// - bytes=500-
/// - bytes=-500 (last 500 bytes)
///
/// Unsatisfiable or multi-range headers yield `None` and the whole file is sent.
fn parse_range_header(header: &str, file_size: u64) -> Option<(u64, u64)> {
    if file_size == 0 {
        return None;
    }
    let (start, end) = header.strip_prefix("bytes=")?.split_once('-')?;
    let (start, end) = (start.trim(), end.trim());
    let last = file_size - 1;

    match (start.is_empty(), end.is_empty()) {
        (true, false) => {
            let suffix_len: u64 = end.parse().ok()?;
            if suffix_len == 0 {
                return None;
            }
            Some((file_size.saturating_sub(suffix_len), last))
        }
        (false, true) => {
            let start: u64 = start.parse().ok()?;
            (start <= last).then_some((start, last))
        }
        (false, false) => {
            let start: u64 = start.parse().ok()?;
            let end: u64 = end.parse::<u64>().ok()?.min(last);
            (start <= end).then_some((start, end))
        }
        (true, true) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_header_full_range() {
        assert_eq!(parse_range_header("bytes=0-499", 1000), Some((0, 499)));
    }

    #[test]
    fn test_parse_range_header_open_end() {
        assert_eq!(parse_range_header("bytes=500-", 1000), Some((500, 999)));
    }

    #[test]
    fn test_parse_range_header_suffix() {
        assert_eq!(parse_range_header("bytes=-200", 1000), Some((800, 999)));
        assert_eq!(parse_range_header("bytes=-5000", 1000), Some((0, 999)));
    }

    #[test]
    fn test_parse_range_header_clamped() {
        assert_eq!(parse_range_header("bytes=0-2000", 1000), Some((0, 999)));
    }

    #[test]
    fn test_parse_range_header_unsatisfiable() {
        assert_eq!(parse_range_header("bytes=1500-", 1000), None);
        assert_eq!(parse_range_header("bytes=600-500", 1000), None);
        assert_eq!(parse_range_header("bytes=0-10", 0), None);
    }

    #[test]
    fn test_parse_range_header_invalid_format() {
        assert_eq!(parse_range_header("bytes=-", 1000), None);
        assert_eq!(parse_range_header("bytes=abc-def", 1000), None);
        assert_eq!(parse_range_header("bytes=0-1-2", 1000), None);
        assert_eq!(parse_range_header("items=0-10", 1000), None);
    }
}
