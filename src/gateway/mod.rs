//! Model gateway.
//!
//! Thin one-shot clients for the hosted models behind each page. Nothing here
//! retries, batches or caches, and nothing here touches session state: callers
//! decide what to record once a call has succeeded.

mod gemini;
mod groq;

pub use gemini::GeminiClient;
pub use groq::GroqClient;

use crate::error::{HubError, Result};
use crate::session::ChatMessage;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// A model that continues a conversation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Send `history` followed by `new_prompt` and return the generated reply.
    async fn completion(&self, history: &[ChatMessage], new_prompt: &str) -> Result<String>;
}

/// Single-shot multimodal requests.
#[async_trait]
pub trait MediaModel: Send + Sync {
    /// Describe an image according to `prompt`.
    async fn caption(&self, prompt: &str, image: &[u8]) -> Result<String>;

    /// Upload an audio file and ask for a summary of it.
    async fn summarize_audio(&self, file_path: &Path) -> Result<String>;

    /// Complete the single prompt `prompt_prefix + text`.
    async fn summarize_text(&self, prompt_prefix: &str, text: &str) -> Result<String>;
}

/// Build the shared HTTP client used by every gateway.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| HubError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Guess an image MIME type from its leading bytes.
///
/// Falls back to JPEG, the most common upload.
pub fn image_mime_type(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime_type() {
        assert_eq!(image_mime_type(b"\x89PNG\r\n\x1a\n...."), "image/png");
        assert_eq!(image_mime_type(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]), "image/jpeg");
        assert_eq!(image_mime_type(b"GIF89a"), "image/gif");
        assert_eq!(image_mime_type(b"RIFF\x10\x00\x00\x00WEBPVP8 "), "image/webp");
        assert_eq!(image_mime_type(b""), "image/jpeg");
    }
}
