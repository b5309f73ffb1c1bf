//! Audio summarization command.

use crate::cli::Output;
use crate::config::{ApiKeys, Settings};
use crate::hub::{Hub, Page};
use std::path::Path;

/// Summarize a local audio file.
///
/// The file is read like an upload and staged by the hub, so the same path is
/// taken as for the HTTP API.
pub async fn run_audio(file: &str, settings: Settings, keys: ApiKeys) -> anyhow::Result<()> {
    let path = Path::new(file);
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file)
        .to_string();

    let bytes = tokio::fs::read(path).await?;
    let hub = Hub::new(&settings, &keys)?;

    Output::header(Page::AudioSummarization.title());
    Output::kv("File", file);

    let spinner = Output::spinner("Summarizing...");
    let result = hub.summarize_audio(&file_name, &bytes).await;
    spinner.finish_and_clear();

    println!("\n{}", result?);

    Ok(())
}
