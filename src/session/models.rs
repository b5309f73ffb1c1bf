//! Data models for chat sessions.

use crate::error::HubError;
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: Role,
    text: String,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Ordered message history for one surface.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    surface_id: String,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub(super) fn new(surface_id: &str, seed: Option<ChatMessage>) -> Self {
        Self {
            surface_id: surface_id.to_string(),
            history: seed.into_iter().collect(),
        }
    }

    pub(super) fn push(&mut self, message: ChatMessage) {
        self.history.push(message);
    }

    pub fn surface_id(&self) -> &str {
        &self.surface_id
    }

    /// Messages in the order they were appended.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }
}

/// A selectable chat surface, each backed by its own hosted model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Gemini,
    Llama,
}

impl Surface {
    /// Stable identifier used as the session key.
    pub fn id(&self) -> &'static str {
        match self {
            Surface::Gemini => "gemini",
            Surface::Llama => "llama",
        }
    }

    /// Page title shown by the presentation layer.
    pub fn title(&self) -> &'static str {
        match self {
            Surface::Gemini => "Chat with Gemini",
            Surface::Llama => "Chat with Llama",
        }
    }
}

impl std::str::FromStr for Surface {
    type Err = HubError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Surface::Gemini),
            "llama" => Ok(Surface::Llama),
            other => Err(HubError::UnknownSurface(other.to_string())),
        }
    }
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_parsing() {
        assert_eq!("gemini".parse::<Surface>().unwrap(), Surface::Gemini);
        assert_eq!(" Llama ".parse::<Surface>().unwrap(), Surface::Llama);
        assert!(matches!(
            "bard".parse::<Surface>(),
            Err(HubError::UnknownSurface(s)) if s == "bard"
        ));
    }

    #[test]
    fn test_message_serializes_lowercase_role() {
        let json = serde_json::to_value(ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["text"], "hi");
    }
}
