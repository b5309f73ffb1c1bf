//! Configuration settings for Fusion Hub.

use super::Prompts;
use crate::error::{HubError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the Google AI Studio key.
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Environment variable holding the Groq key.
pub const GROQ_API_KEY_VAR: &str = "GROQ_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub gemini: GeminiSettings,
    pub groq: GroqSettings,
    pub youtube: YoutubeSettings,
    pub server: ServerSettings,
    pub prompts: Prompts,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where uploads are staged before being sent upstream.
    pub temp_dir: String,
    /// Log level used when no `-v` flag is given (trace, debug, info, warn, error).
    pub log_level: String,
    /// Timeout applied to every upstream HTTP request.
    pub request_timeout_seconds: u64,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/fusionhub".to_string(),
            log_level: "warn".to_string(),
            request_timeout_seconds: 300,
        }
    }
}

/// Google Gemini settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    /// Base URL of the Generative Language REST API.
    pub api_base: String,
    /// Base URL for media uploads (Files API).
    pub upload_base: String,
    /// Model answering the Gemini chat surface.
    pub chat_model: String,
    /// Model used for image captioning.
    pub vision_model: String,
    /// Model used for audio summarization.
    pub audio_model: String,
    /// Model used for transcript summarization.
    pub text_model: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            upload_base: "https://generativelanguage.googleapis.com/upload".to_string(),
            chat_model: "gemini-1.5-flash".to_string(),
            vision_model: "gemini-1.5-flash".to_string(),
            audio_model: "gemini-1.5-flash".to_string(),
            text_model: "gemini-1.5-flash".to_string(),
        }
    }
}

/// Groq (Llama) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroqSettings {
    /// Base URL of Groq's OpenAI-compatible API.
    pub api_base: String,
    /// Model answering the Llama chat surface.
    pub model: String,
}

impl Default for GroqSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
        }
    }
}

/// YouTube transcript settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// Base URL of the YouTube site (watch pages and caption tracks).
    pub watch_base: String,
    /// Preferred caption language; the first track is used when missing.
    pub language: String,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            watch_base: "https://www.youtube.com".to_string(),
            language: "en".to_string(),
        }
    }
}

/// HTTP API server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fusionhub")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Default tracing filter: `-v` flags win over the configured level.
    pub fn log_filter(&self, verbose: u8) -> String {
        let level = match verbose {
            0 => self.general.log_level.as_str(),
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        format!("fusionhub={}", level)
    }

    /// Upstream request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.general.request_timeout_seconds)
    }
}

/// Provider credentials, read once from the environment at startup.
#[derive(Clone, Default)]
pub struct ApiKeys {
    pub google: Option<String>,
    pub groq: Option<String>,
}

impl ApiKeys {
    /// Read both keys from the process environment. Empty values count as missing.
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            google: read(GOOGLE_API_KEY_VAR),
            groq: read(GROQ_API_KEY_VAR),
        }
    }

    /// The Google key, or a configuration error naming the missing variable.
    pub fn require_google(&self) -> Result<&str> {
        self.google
            .as_deref()
            .ok_or_else(|| missing_key(GOOGLE_API_KEY_VAR))
    }

    /// The Groq key, or a configuration error naming the missing variable.
    pub fn require_groq(&self) -> Result<&str> {
        self.groq.as_deref().ok_or_else(|| missing_key(GROQ_API_KEY_VAR))
    }
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |k: &Option<String>| if k.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("ApiKeys")
            .field("google", &mask(&self.google))
            .field("groq", &mask(&self.groq))
            .finish()
    }
}

fn missing_key(var: &str) -> HubError {
    HubError::Config(format!(
        "{} not set. Add it to your environment or a .env file.",
        var
    ))
}
