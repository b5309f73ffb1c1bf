//! YouTube transcript fetching.
//!
//! A [`TranscriptFetcher`] turns a video link into one block of caption text,
//! using a [`TranscriptSource`] to look the captions up.

mod youtube;

pub use youtube::YoutubeTranscripts;

use crate::error::{HubError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// One timed caption line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl CaptionSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Looks up the caption segments of a video.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Segments in playback order. Fails with `TranscriptUnavailable`.
    async fn segments(&self, video_id: &str) -> Result<Vec<CaptionSegment>>;
}

/// Extract the video id from a watch link.
///
/// The id is the text after the first `=`, up to the next `=` if any, so
/// `https://www.youtube.com/watch?v=ABC123` yields `ABC123`. Links that keep the
/// id elsewhere (`youtu.be/...`) or carry extra parameters are not understood.
pub fn extract_video_id(url: &str) -> Result<&str> {
    let id = url
        .split('=')
        .nth(1)
        .ok_or_else(|| HubError::TranscriptUnavailable(format!("No video id in link: {}", url)))?;

    if id.is_empty() {
        return Err(HubError::TranscriptUnavailable(format!(
            "Empty video id in link: {}",
            url
        )));
    }
    Ok(id)
}

/// Preview image shown next to a video.
pub fn thumbnail_url(video_id: &str) -> String {
    format!("http://img.youtube.com/vi/{}/0.jpg", video_id)
}

/// Fetches a whole transcript as a single string.
#[derive(Clone)]
pub struct TranscriptFetcher {
    source: Arc<dyn TranscriptSource>,
}

impl TranscriptFetcher {
    pub fn new(source: Arc<dyn TranscriptSource>) -> Self {
        Self { source }
    }

    /// Fetch the captions of `video_url`, joined by single spaces in playback order.
    #[instrument(skip(self))]
    pub async fn fetch(&self, video_url: &str) -> Result<String> {
        let video_id = extract_video_id(video_url)?;
        let segments = self.source.segments(video_id).await?;

        if segments.is_empty() {
            return Err(HubError::TranscriptUnavailable(format!(
                "Video {} has no captions",
                video_id
            )));
        }

        info!("Fetched {} caption segments for {}", segments.len(), video_id);
        Ok(segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }
}
