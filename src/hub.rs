//! Request dispatch for the five pages.
//!
//! The [`Hub`] owns the upstream clients and routes each user action to them.
//! Session state is not held here: handlers pass the [`SessionStore`] in, so its
//! lifetime is tied to whichever front end created it.

use crate::config::{ApiKeys, Prompts, Settings, GOOGLE_API_KEY_VAR, GROQ_API_KEY_VAR};
use crate::error::{HubError, Result};
use crate::gateway::{http_client, ChatModel, GeminiClient, GroqClient, MediaModel};
use crate::session::{ChatMessage, SessionStore, Surface};
use crate::staging::{extension_of, Stager};
use crate::transcript::{extract_video_id, thumbnail_url, TranscriptFetcher, YoutubeTranscripts};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Image extensions accepted by the captioning page.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Audio extensions accepted by the summarization page.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3"];

/// The selectable pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Gemini,
    Llama,
    ImageCaptioning,
    AudioSummarization,
    VideoSummarization,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Gemini,
        Page::Llama,
        Page::ImageCaptioning,
        Page::AudioSummarization,
        Page::VideoSummarization,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Gemini => Surface::Gemini.title(),
            Page::Llama => Surface::Llama.title(),
            Page::ImageCaptioning => "Snap Narrate",
            Page::AudioSummarization => "Summarize the Audio",
            Page::VideoSummarization => "YouTube Video Summarization",
        }
    }
}

/// Result of summarizing a YouTube video.
#[derive(Debug, Clone, Serialize)]
pub struct VideoSummary {
    pub video_id: String,
    pub thumbnail_url: String,
    pub notes: String,
}

/// Routes page actions to the upstream clients.
pub struct Hub {
    prompts: Prompts,
    chat_models: HashMap<Surface, Arc<dyn ChatModel>>,
    media: Arc<dyn MediaModel>,
    transcripts: TranscriptFetcher,
    stager: Stager,
}

impl Hub {
    /// Build a hub with the real Gemini, Groq and YouTube clients.
    ///
    /// A provider whose key is missing is replaced by a stand-in that fails
    /// with a configuration error when used, so the other pages keep working.
    pub fn new(settings: &Settings, keys: &ApiKeys) -> Result<Self> {
        let http = http_client(settings.request_timeout())?;

        let (gemini_chat, media): (Arc<dyn ChatModel>, Arc<dyn MediaModel>) =
            match keys.require_google() {
                Ok(key) => {
                    let client = Arc::new(
                        GeminiClient::new(http.clone(), key, settings.gemini.clone())
                            .with_audio_instruction(&settings.prompts.audio),
                    );
                    let chat: Arc<dyn ChatModel> = client.clone();
                    let media: Arc<dyn MediaModel> = client;
                    (chat, media)
                }
                Err(e) => {
                    warn!("{}", e);
                    let missing = Arc::new(MissingKey(GOOGLE_API_KEY_VAR));
                    let chat: Arc<dyn ChatModel> = missing.clone();
                    let media: Arc<dyn MediaModel> = missing;
                    (chat, media)
                }
            };

        let llama: Arc<dyn ChatModel> = match keys.require_groq() {
            Ok(key) => Arc::new(
                GroqClient::new(http.clone(), key, &settings.groq)
                    .with_system_prompt(&settings.prompts.system),
            ),
            Err(e) => {
                warn!("{}", e);
                Arc::new(MissingKey(GROQ_API_KEY_VAR))
            }
        };

        let youtube = Arc::new(YoutubeTranscripts::new(http, &settings.youtube)?);

        let mut chat_models: HashMap<Surface, Arc<dyn ChatModel>> = HashMap::new();
        chat_models.insert(Surface::Gemini, gemini_chat);
        chat_models.insert(Surface::Llama, llama);

        info!("Hub ready (temp dir {})", settings.temp_dir().display());

        Ok(Self::with_components(
            settings.prompts.clone(),
            chat_models,
            media,
            TranscriptFetcher::new(youtube),
            Stager::new(settings.temp_dir()),
        ))
    }

    /// Build a hub from explicit components.
    pub fn with_components(
        prompts: Prompts,
        chat_models: HashMap<Surface, Arc<dyn ChatModel>>,
        media: Arc<dyn MediaModel>,
        transcripts: TranscriptFetcher,
        stager: Stager,
    ) -> Self {
        Self {
            prompts,
            chat_models,
            media,
            transcripts,
            stager,
        }
    }

    /// Send `prompt` on `surface` and record the exchange.
    ///
    /// The user message and the reply are appended together after the model
    /// answers; on failure the session is left untouched.
    #[instrument(skip_all, fields(surface = %surface))]
    pub async fn chat(
        &self,
        sessions: &mut SessionStore,
        surface: Surface,
        prompt: &str,
    ) -> Result<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(HubError::InvalidInput("Prompt is empty".to_string()));
        }

        let model = self
            .chat_models
            .get(&surface)
            .ok_or_else(|| HubError::UnknownSurface(surface.id().to_string()))?;

        let history = sessions.get_or_create(surface.id()).history().to_vec();
        let reply = model.completion(&history, prompt).await.map_err(|e| {
            warn!("{} completion failed: {}", model.name(), e);
            e
        })?;

        sessions.append(surface.id(), ChatMessage::user(prompt))?;
        sessions.append(surface.id(), ChatMessage::assistant(reply.clone()))?;
        Ok(reply)
    }

    /// Caption an uploaded image, using the configured prompt when none is given.
    #[instrument(skip(self, image, prompt), fields(bytes = image.len()))]
    pub async fn caption(
        &self,
        file_name: &str,
        image: &[u8],
        prompt: Option<&str>,
    ) -> Result<String> {
        check_extension(file_name, IMAGE_EXTENSIONS)?;
        if image.is_empty() {
            return Err(HubError::InvalidInput("Image is empty".to_string()));
        }
        let prompt = prompt.unwrap_or(self.prompts.caption.as_str());
        self.media.caption(prompt, image).await
    }

    /// Summarize an uploaded audio file.
    ///
    /// The upload is staged to disk for the duration of the call only.
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn summarize_audio(&self, file_name: &str, data: &[u8]) -> Result<String> {
        let extension = check_extension(file_name, AUDIO_EXTENSIONS)?;
        let staged = self.stager.stage(data, &extension)?;
        self.media.summarize_audio(staged.path()).await
    }

    /// Fetch a video's transcript and summarize it into notes.
    #[instrument(skip(self))]
    pub async fn summarize_video(&self, video_url: &str) -> Result<VideoSummary> {
        let video_id = extract_video_id(video_url)?.to_string();
        let transcript = self.transcripts.fetch(video_url).await?;
        let notes = self
            .media
            .summarize_text(&self.prompts.video, &transcript)
            .await?;

        Ok(VideoSummary {
            thumbnail_url: thumbnail_url(&video_id),
            video_id,
            notes,
        })
    }
}

/// Stands in for a provider whose API key is not set.
struct MissingKey(&'static str);

impl MissingKey {
    fn error(&self) -> HubError {
        HubError::Config(format!(
            "{} not set. Add it to your environment or a .env file.",
            self.0
        ))
    }
}

#[async_trait]
impl ChatModel for MissingKey {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn completion(&self, _history: &[ChatMessage], _new_prompt: &str) -> Result<String> {
        Err(self.error())
    }
}

#[async_trait]
impl MediaModel for MissingKey {
    async fn caption(&self, _prompt: &str, _image: &[u8]) -> Result<String> {
        Err(self.error())
    }

    async fn summarize_audio(&self, _file_path: &Path) -> Result<String> {
        Err(self.error())
    }

    async fn summarize_text(&self, _prompt_prefix: &str, _text: &str) -> Result<String> {
        Err(self.error())
    }
}

/// Lower-cased extension of `file_name`, if it is one of `allowed`.
pub fn check_extension(file_name: &str, allowed: &[&str]) -> Result<String> {
    let extension = extension_of(file_name).to_lowercase();
    if file_name.contains('.') && allowed.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(HubError::InvalidInput(format!(
            "Unsupported file {}: expected one of {}",
            file_name,
            allowed.join(", ")
        )))
    }
}
