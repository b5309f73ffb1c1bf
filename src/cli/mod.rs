//! CLI module for Fusion Hub.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Fusion Hub - chat, captioning and summarization on hosted AI models
///
/// Each page of the hub is a subcommand; `serve` exposes all of them over HTTP.
#[derive(Parser, Debug)]
#[command(name = "fusionhub")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chat with Gemini or Llama
    Chat {
        /// Chat surface (gemini, llama)
        #[arg(default_value = "gemini")]
        surface: String,
    },

    /// Generate a caption for an image (jpg, jpeg, png)
    Caption {
        /// Path to the image
        image: String,

        /// Prompt to send with the image
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// Summarize an audio file (wav, mp3)
    Audio {
        /// Path to the audio file
        file: String,
    },

    /// Summarize a YouTube video from its transcript
    Video {
        /// YouTube watch link (https://www.youtube.com/watch?v=...)
        url: String,
    },

    /// Start the HTTP API server for browser front ends
    Serve {
        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check API keys and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_chat_defaults_to_gemini() {
        let cli = Cli::try_parse_from(["fusionhub", "chat"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat { surface } if surface == "gemini"));
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["fusionhub", "video", "https://x/watch?v=1", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Video { url } if url == "https://x/watch?v=1"));
    }
}
