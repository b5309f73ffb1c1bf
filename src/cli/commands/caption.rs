//! Image captioning command.

use crate::cli::Output;
use crate::config::{ApiKeys, Settings};
use crate::hub::{Hub, Page};
use std::path::Path;

/// Caption a local image.
pub async fn run_caption(
    image: &str,
    prompt: Option<String>,
    settings: Settings,
    keys: ApiKeys,
) -> anyhow::Result<()> {
    let path = Path::new(image);
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(image);

    let bytes = tokio::fs::read(path).await?;
    let hub = Hub::new(&settings, &keys)?;

    Output::header(Page::ImageCaptioning.title());

    let spinner = Output::spinner("Generating caption...");
    let result = hub.caption(file_name, &bytes, prompt.as_deref()).await;
    spinner.finish_and_clear();

    let caption = result?;
    Output::kv("Image", image);
    println!("\n{}", caption);

    Ok(())
}
