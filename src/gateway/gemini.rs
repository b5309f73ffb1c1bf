//! Google Gemini client (Generative Language REST API, `v1beta`).

use super::{image_mime_type, ChatModel, MediaModel};
use crate::config::{GeminiSettings, AUDIO_SUMMARY_INSTRUCTION};
use crate::error::{HubError, Result};
use crate::session::{ChatMessage, Role};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

const API_KEY_HEADER: &str = "x-goog-api-key";

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    Text(String),
    InlineData(Blob),
    FileData(FileRef),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileRef {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: UploadedFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedFile {
    uri: String,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

/// Gemini client covering chat, vision, audio and plain text requests.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    settings: GeminiSettings,
    audio_instruction: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: &str, settings: GeminiSettings) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            settings,
            audio_instruction: AUDIO_SUMMARY_INSTRUCTION.to_string(),
        }
    }

    /// Replace the instruction sent alongside uploaded audio.
    pub fn with_audio_instruction(mut self, instruction: &str) -> Self {
        self.audio_instruction = instruction.to_string();
        self
    }

    /// Run `generateContent` on `model` and return the text of the first candidate.
    async fn generate(&self, model: &str, request: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.api_base, model
        );

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;

        let response = check_status(response, "generateContent").await?;
        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| HubError::Upstream(format!("Malformed Gemini response: {}", e)))?;

        extract_text(body)
    }

    /// Upload a file through the Files API and return its reference.
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn upload_file(&self, path: &Path, mime_type: &str) -> Result<FileRef> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        debug!("Uploading {} bytes as {}", bytes.len(), mime_type);

        let metadata = serde_json::json!({ "file": { "display_name": file_name } });
        let form = reqwest::multipart::Form::new()
            .part(
                "metadata",
                reqwest::multipart::Part::text(metadata.to_string())
                    .mime_str("application/json")?,
            )
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(mime_type)?,
            );

        let response = self
            .http
            .post(format!("{}/v1beta/files", self.settings.upload_base))
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "multipart")
            .multipart(form)
            .send()
            .await?;

        let response = check_status(response, "file upload").await?;
        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| HubError::Upstream(format!("Malformed upload response: {}", e)))?;

        info!("Uploaded audio as {}", uploaded.file.uri);
        Ok(FileRef {
            mime_type: uploaded.file.mime_type.unwrap_or_else(|| mime_type.to_string()),
            file_uri: uploaded.file.uri,
        })
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    #[instrument(skip_all, fields(model = %self.settings.chat_model, history = history.len()))]
    async fn completion(&self, history: &[ChatMessage], new_prompt: &str) -> Result<String> {
        let request = chat_request(history, new_prompt);
        debug!("Sending {} contents", request.contents.len());
        self.generate(&self.settings.chat_model, &request).await
    }
}

#[async_trait]
impl MediaModel for GeminiClient {
    #[instrument(skip_all, fields(model = %self.settings.vision_model, bytes = image.len()))]
    async fn caption(&self, prompt: &str, image: &[u8]) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text(prompt.to_string()),
                    Part::InlineData(Blob {
                        mime_type: image_mime_type(image).to_string(),
                        data: BASE64.encode(image),
                    }),
                ],
            }],
            system_instruction: None,
        };
        self.generate(&self.settings.vision_model, &request).await
    }

    #[instrument(skip(self), fields(model = %self.settings.audio_model))]
    async fn summarize_audio(&self, file_path: &Path) -> Result<String> {
        let mime_type = mime_guess::from_path(file_path)
            .first()
            .filter(|m| m.type_() == mime_guess::mime::AUDIO)
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "audio/wav".to_string());

        let file = self.upload_file(file_path, &mime_type).await?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text(self.audio_instruction.clone()),
                    Part::FileData(file),
                ],
            }],
            system_instruction: None,
        };
        self.generate(&self.settings.audio_model, &request).await
    }

    #[instrument(skip_all, fields(model = %self.settings.text_model, chars = text.len()))]
    async fn summarize_text(&self, prompt_prefix: &str, text: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part::Text(format!("{}{}", prompt_prefix, text))],
            }],
            system_instruction: None,
        };
        self.generate(&self.settings.text_model, &request).await
    }
}

/// Build a chat request: system messages become the system instruction,
/// assistant turns are sent with Gemini's `model` role.
fn chat_request(history: &[ChatMessage], new_prompt: &str) -> GenerateContentRequest {
    let mut contents = Vec::with_capacity(history.len() + 1);
    let mut system_parts = Vec::new();

    for message in history {
        let role = match message.role() {
            Role::System => {
                system_parts.push(Part::Text(message.text().to_string()));
                continue;
            }
            Role::User => "user",
            Role::Assistant => "model",
        };
        contents.push(Content {
            role,
            parts: vec![Part::Text(message.text().to_string())],
        });
    }

    contents.push(Content {
        role: "user",
        parts: vec![Part::Text(new_prompt.to_string())],
    });

    GenerateContentRequest {
        contents,
        system_instruction: (!system_parts.is_empty())
            .then_some(SystemInstruction { parts: system_parts }),
    }
}

/// Turn non-2xx responses into upstream errors carrying Gemini's message.
async fn check_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    tracing::error!(status = status.as_u16(), "Gemini {} failed", what);
    Err(HubError::Upstream(format!(
        "Gemini {} failed ({}): {}",
        what,
        status.as_u16(),
        message
    )))
}

fn extract_text(body: GenerateContentResponse) -> Result<String> {
    let text: String = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if !text.is_empty() {
        return Ok(text);
    }

    match body.prompt_feedback.and_then(|f| f.block_reason) {
        Some(reason) => Err(HubError::Upstream(format!(
            "Gemini blocked the prompt: {}",
            reason
        ))),
        None => Err(HubError::Upstream("Empty response from Gemini".to_string())),
    }
}
