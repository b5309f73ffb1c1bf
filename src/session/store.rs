//! In-memory session store.
//!
//! Lives as long as the process; nothing is persisted.

use super::{ChatMessage, ChatSession};
use crate::error::{HubError, Result};
use std::collections::HashMap;
use tracing::debug;

/// Maps a surface id to its chat session.
///
/// The store is a plain value: callers that mutate it hold it by `&mut`.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, ChatSession>,
    seed: Option<ChatMessage>,
}

impl SessionStore {
    /// Create an empty store whose sessions start with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose new sessions start with a fixed message.
    pub fn with_seed(seed: ChatMessage) -> Self {
        Self {
            sessions: HashMap::new(),
            seed: Some(seed),
        }
    }

    /// Return the session for `surface_id`, creating it if needed.
    pub fn get_or_create(&mut self, surface_id: &str) -> &ChatSession {
        let seed = &self.seed;
        self.sessions
            .entry(surface_id.to_string())
            .or_insert_with(|| {
                debug!("Creating session for surface {}", surface_id);
                ChatSession::new(surface_id, seed.clone())
            })
    }

    /// Look up a session without creating it.
    pub fn get(&self, surface_id: &str) -> Option<&ChatSession> {
        self.sessions.get(surface_id)
    }

    /// Append a message to the end of an existing session.
    ///
    /// Sessions are not created implicitly; call [`Self::get_or_create`] first.
    pub fn append(&mut self, surface_id: &str, message: ChatMessage) -> Result<()> {
        let session = self
            .sessions
            .get_mut(surface_id)
            .ok_or_else(|| HubError::UnknownSurface(surface_id.to_string()))?;
        session.push(message);
        Ok(())
    }

    /// Ids of every session created so far, sorted.
    pub fn surfaces(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.sessions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    #[test]
    fn test_appends_preserve_order() {
        let mut store = SessionStore::new();
        store.get_or_create("gemini");

        let messages = vec![
            ChatMessage::user("What is Rust?"),
            ChatMessage::assistant("A systems language."),
            ChatMessage::user("Is it fast?"),
            ChatMessage::assistant("Yes."),
        ];
        for msg in &messages {
            store.append("gemini", msg.clone()).unwrap();
        }

        assert_eq!(store.get_or_create("gemini").history(), messages.as_slice());
    }

    #[test]
    fn test_get_or_create_returns_existing_session() {
        let mut store = SessionStore::new();
        store.get_or_create("llama");
        store.append("llama", ChatMessage::user("hi")).unwrap();

        let session = store.get_or_create("llama");
        assert_eq!(session.surface_id(), "llama");
        assert_eq!(session.history().len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_surfaces_are_independent() {
        let mut store = SessionStore::new();
        store.get_or_create("gemini");
        store.get_or_create("llama");
        store.append("gemini", ChatMessage::user("one")).unwrap();

        assert_eq!(store.get("gemini").unwrap().history().len(), 1);
        assert!(store.get("llama").unwrap().history().is_empty());
        assert_eq!(store.surfaces(), vec!["gemini", "llama"]);
    }

    #[test]
    fn test_append_to_unknown_surface_fails() {
        let mut store = SessionStore::new();
        let err = store.append("gemini", ChatMessage::user("hi")).unwrap_err();
        assert!(matches!(err, HubError::UnknownSurface(s) if s == "gemini"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_seeded_sessions() {
        let mut store = SessionStore::with_seed(ChatMessage::system("You are a helpful assistant"));
        store.get_or_create("llama");
        store.append("llama", ChatMessage::user("hi")).unwrap();

        let history = store.get("llama").unwrap().history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role(), Role::System);
        assert_eq!(history[1].text(), "hi");
    }
}
