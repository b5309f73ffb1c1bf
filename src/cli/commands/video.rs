//! YouTube video summarization command.

use crate::cli::Output;
use crate::config::{ApiKeys, Settings};
use crate::hub::{Hub, Page};
use console::style;

/// Summarize a YouTube video from its transcript.
pub async fn run_video(url: &str, settings: Settings, keys: ApiKeys) -> anyhow::Result<()> {
    let hub = Hub::new(&settings, &keys)?;

    Output::header(Page::VideoSummarization.title());

    let spinner = Output::spinner("Summarizing...");
    let result = hub.summarize_video(url).await;
    spinner.finish_and_clear();

    let summary = result?;
    Output::kv("Video", &summary.video_id);
    Output::kv("Thumbnail", &summary.thumbnail_url);

    println!("\n{}\n", style("# Detailed Notes:").bold());
    println!("{}", summary.notes);

    Ok(())
}
