//! Configuration module for Fusion Hub.
//!
//! Handles loading application settings, prompt templates and provider keys.

mod prompts;
mod settings;

pub use prompts::{
    Prompts, AUDIO_SUMMARY_INSTRUCTION, DEFAULT_CAPTION_PROMPT, DEFAULT_SYSTEM_PROMPT,
    DEFAULT_VIDEO_PROMPT,
};
pub use settings::{
    ApiKeys, GeminiSettings, GeneralSettings, GroqSettings, ServerSettings, Settings,
    YoutubeSettings, GOOGLE_API_KEY_VAR, GROQ_API_KEY_VAR,
};
