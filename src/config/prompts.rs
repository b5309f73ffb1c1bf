//! Prompt templates for Fusion Hub.
//!
//! Every prompt can be overridden from the `[prompts]` table of the config file.

use serde::{Deserialize, Serialize};

/// System prompt prepended to every Llama request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant";

/// Prompt sent alongside an uploaded image.
pub const DEFAULT_CAPTION_PROMPT: &str = "write a brief caption for this image";

/// Fixed instruction sent alongside an uploaded audio file.
pub const AUDIO_SUMMARY_INSTRUCTION: &str = "Please summarize the following audio.";

/// Prefix for YouTube transcript summarization; the transcript is appended verbatim.
pub const DEFAULT_VIDEO_PROMPT: &str = r#"You are a Youtube video summarizer. You have to take the entire transcript text
from the video and summarize it with bullet points. First, mention the title of the video,
then summarize the entire video with highlighting the keypoints. At the end please include
some conclusion about the video. The entire summarization should be with in 500 words.
Please provide the summary of the text given here: "#;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Prompts {
    /// System message for the Llama surface.
    pub system: String,
    /// Default image captioning prompt.
    pub caption: String,
    /// Audio summarization instruction.
    pub audio: String,
    /// Video summarization prefix.
    pub video: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
            caption: DEFAULT_CAPTION_PROMPT.to_string(),
            audio: AUDIO_SUMMARY_INSTRUCTION.to_string(),
            video: DEFAULT_VIDEO_PROMPT.to_string(),
        }
    }
}
