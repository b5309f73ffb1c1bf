//! Caption lookup straight from YouTube.
//!
//! The watch page embeds the player response, whose `captionTracks` list points
//! at timedtext XML documents with one `<text>` element per caption line.

use super::{CaptionSegment, TranscriptSource};
use crate::config::YoutubeSettings;
use crate::error::{HubError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    language_code: String,
}

/// Transcript source backed by YouTube's public watch pages.
pub struct YoutubeTranscripts {
    http: reqwest::Client,
    watch_base: String,
    language: String,
    text_regex: Regex,
    tag_regex: Regex,
}

impl YoutubeTranscripts {
    pub fn new(http: reqwest::Client, settings: &YoutubeSettings) -> Result<Self> {
        let text_regex = Regex::new(
            r#"(?s)<text start="([^"]*)"(?: dur="([^"]*)")?[^>]*>(.*?)</text>"#,
        )
        .map_err(|e| HubError::Config(format!("Invalid caption pattern: {}", e)))?;
        let tag_regex = Regex::new(r"<[^>]*>")
            .map_err(|e| HubError::Config(format!("Invalid caption pattern: {}", e)))?;

        Ok(Self {
            http,
            watch_base: settings.watch_base.trim_end_matches('/').to_string(),
            language: settings.language.clone(),
            text_regex,
            tag_regex,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US")
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(HubError::TranscriptUnavailable(format!(
                "YouTube returned {} for {}",
                status.as_u16(),
                url
            )));
        }

        response.text().await.map_err(unavailable)
    }

    /// Pick the caption track in the preferred language, else the first one.
    fn select_track<'a>(&self, tracks: &'a [CaptionTrack]) -> Option<&'a CaptionTrack> {
        tracks
            .iter()
            .find(|t| t.language_code == self.language)
            .or_else(|| tracks.first())
    }

    fn parse_timedtext(&self, xml: &str) -> Vec<CaptionSegment> {
        self.text_regex
            .captures_iter(xml)
            .filter_map(|caps| {
                let start = caps.get(1)?.as_str().parse::<f64>().ok()?;
                let duration = caps
                    .get(2)
                    .and_then(|d| d.as_str().parse::<f64>().ok())
                    .unwrap_or(0.0);
                let text = decode_caption(caps.get(3)?.as_str(), &self.tag_regex);
                Some(CaptionSegment::new(text, start, duration))
            })
            .collect()
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscripts {
    #[instrument(skip(self))]
    async fn segments(&self, video_id: &str) -> Result<Vec<CaptionSegment>> {
        let watch_url = format!("{}/watch?v={}", self.watch_base, video_id);
        let page = self.get_text(&watch_url).await?;

        let tracks = caption_tracks(&page).ok_or_else(|| {
            HubError::TranscriptUnavailable(format!("Subtitles are disabled for {}", video_id))
        })?;
        let track = self.select_track(&tracks).ok_or_else(|| {
            HubError::TranscriptUnavailable(format!("No transcript found for {}", video_id))
        })?;

        if track.language_code != self.language {
            warn!(
                "No {} captions for {}, using {}",
                self.language, video_id, track.language_code
            );
        }

        let track_url = Url::parse(&self.watch_base)
            .and_then(|base| base.join(&track.base_url))
            .map_err(|e| {
                HubError::TranscriptUnavailable(format!("Bad caption track URL: {}", e))
            })?;

        debug!("Fetching caption track {}", track_url);
        let xml = self.get_text(track_url.as_str()).await?;
        Ok(self.parse_timedtext(&xml))
    }
}

/// Pull the caption track list out of a watch page.
fn caption_tracks(page: &str) -> Option<Vec<CaptionTrack>> {
    let start = page.find("\"captions\":")? + "\"captions\":".len();
    let rest = &page[start..];
    let end = rest.find(",\"videoDetails")?;

    let captions: Captions = serde_json::from_str(&rest[..end]).ok()?;
    let tracks = captions.player_captions_tracklist_renderer?.caption_tracks;
    (!tracks.is_empty()).then_some(tracks)
}

/// Decode entities (captions are often escaped twice) and drop inline markup.
fn decode_caption(raw: &str, tags: &Regex) -> String {
    let once = html_escape::decode_html_entities(raw);
    let twice = html_escape::decode_html_entities(&once);
    tags.replace_all(&twice, "").trim().to_string()
}

fn unavailable(err: reqwest::Error) -> HubError {
    HubError::TranscriptUnavailable(format!("Transcript lookup failed: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn source(server: &mockito::Server) -> YoutubeTranscripts {
        let settings = YoutubeSettings {
            watch_base: server.url(),
            language: "en".to_string(),
        };
        let http = crate::gateway::http_client(Duration::from_secs(5)).unwrap();
        YoutubeTranscripts::new(http, &settings).unwrap()
    }

    fn watch_page(tracks: &str) -> String {
        format!(
            r#"<html><script>var ytInitialPlayerResponse = {{"playabilityStatus":{{"status":"OK"}},"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":{}}}}},"videoDetails":{{"videoId":"ABC123"}}}};</script></html>"#,
            tracks
        )
    }

    #[tokio::test]
    async fn test_segments_from_preferred_track() {
        let mut server = mockito::Server::new_async().await;
        let tracks = r#"[{"baseUrl":"/api/timedtext?v=ABC123&lang=de","name":{"runs":[{"text":"German"}]},"languageCode":"de"},{"baseUrl":"/api/timedtext?v=ABC123&lang=en","name":{"runs":[{"text":"English"}]},"languageCode":"en"}]"#;
        server
            .mock("GET", "/watch?v=ABC123")
            .with_body(watch_page(tracks))
            .create_async()
            .await;
        let timedtext = server
            .mock("GET", "/api/timedtext?v=ABC123&lang=en")
            .with_body(
                r##"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.5" dur="1.2">Hello</text><text start="1.7" dur="2">it&amp;#39;s <font color="#CCCCCC">me</font></text><text start="3.7">bye &amp;amp; thanks</text></transcript>"##,
            )
            .create_async()
            .await;

        let segments = source(&server).segments("ABC123").await.unwrap();

        assert_eq!(
            segments,
            vec![
                CaptionSegment::new("Hello", 0.5, 1.2),
                CaptionSegment::new("it's me", 1.7, 2.0),
                CaptionSegment::new("bye & thanks", 3.7, 0.0),
            ]
        );
        timedtext.assert_async().await;
    }

    #[tokio::test]
    async fn test_falls_back_to_first_track() {
        let mut server = mockito::Server::new_async().await;
        let tracks = r#"[{"baseUrl":"/api/timedtext?v=ABC123&lang=es","languageCode":"es"}]"#;
        server
            .mock("GET", "/watch?v=ABC123")
            .with_body(watch_page(tracks))
            .create_async()
            .await;
        server
            .mock("GET", "/api/timedtext?v=ABC123&lang=es")
            .with_body(r#"<transcript><text start="0" dur="1">Hola</text></transcript>"#)
            .create_async()
            .await;

        let segments = source(&server).segments("ABC123").await.unwrap();
        assert_eq!(segments, vec![CaptionSegment::new("Hola", 0.0, 1.0)]);
    }

    #[tokio::test]
    async fn test_video_without_captions_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/watch?v=NOCAPS")
            .with_body(r#"<html>{"playabilityStatus":{"status":"OK"},"videoDetails":{"videoId":"NOCAPS"}}</html>"#)
            .create_async()
            .await;

        let err = source(&server).segments("NOCAPS").await.unwrap_err();
        assert!(matches!(err, HubError::TranscriptUnavailable(msg) if msg.contains("disabled")));
    }

    #[tokio::test]
    async fn test_http_failure_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/watch?v=GONE")
            .with_status(404)
            .create_async()
            .await;

        let err = source(&server).segments("GONE").await.unwrap_err();
        assert!(matches!(err, HubError::TranscriptUnavailable(_)));
    }

    #[test]
    fn test_caption_tracks_requires_tracks() {
        assert!(caption_tracks(&watch_page("[]")).is_none());
        assert!(caption_tracks("<html></html>").is_none());
    }
}
