//! Chat session state.
//!
//! Each chat surface owns an append-only message history held by a [`SessionStore`].

mod models;
mod store;

pub use models::{ChatMessage, ChatSession, Role, Surface};
pub use store::SessionStore;
