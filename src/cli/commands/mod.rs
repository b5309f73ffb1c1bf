//! CLI command implementations.

mod audio;
mod caption;
mod chat;
mod config;
mod doctor;
mod serve;
mod video;

pub use audio::run_audio;
pub use caption::run_caption;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use serve::{router, run_serve, AppState};
pub use video::run_video;
