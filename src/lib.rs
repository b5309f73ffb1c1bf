//! Fusion Hub - one front end for several hosted AI models
//!
//! Forwards chat, images, audio and YouTube links to Google Gemini and Groq's
//! Llama models and returns their answers.
//!
//! # Overview
//!
//! Fusion Hub offers five pages:
//! - Chat with Gemini
//! - Chat with Llama
//! - Image captioning
//! - Audio summarization
//! - YouTube video summarization
//!
//! # Architecture
//!
//! - `config` - Settings, prompts and API keys
//! - `session` - Per-surface chat history
//! - `gateway` - Gemini and Groq clients
//! - `staging` - Temporary files for uploads
//! - `transcript` - YouTube caption lookup
//! - `hub` - Routes page actions to the above
//! - `cli` - Commands and the HTTP API server
//!
//! # Example
//!
//! ```rust,no_run
//! use fusionhub::config::{ApiKeys, Settings};
//! use fusionhub::hub::Hub;
//! use fusionhub::session::{SessionStore, Surface};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let hub = Hub::new(&settings, &ApiKeys::from_env())?;
//!     let mut sessions = SessionStore::new();
//!
//!     let reply = hub.chat(&mut sessions, Surface::Llama, "Hello!").await?;
//!     println!("{}", reply);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod hub;
pub mod session;
pub mod staging;
pub mod transcript;

pub use error::{HubError, Result};
