use std::path::Path;

use anyhow::Context as _;
use dotenvy::dotenv;
use tracing::info;

use voxscribe::{PipelineConfig, TranscriptionPipeline};

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let audio_path = std::env::args()
        .nth(1)
        .context("Usage: voxscribe <audio-file>")?;

    let mut config = PipelineConfig::default();
    if let Ok(name) = std::env::var("VOXSCRIBE_MODEL") {
        config.model = name.parse()?;
    }
    if let Ok(lang) = std::env::var("VOXSCRIBE_LANGUAGE") {
        config.options.language = Some(lang);
    }

    info!("Using {} model", config.model);

    let bytes =
        std::fs::read(&audio_path).with_context(|| format!("Failed to read {}", audio_path))?;
    let file_name = Path::new(&audio_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("audio")
        .to_string();

    let pipeline = TranscriptionPipeline::new(config);
    let outcome = pipeline.handle_upload(&file_name, &bytes)?;

    for line in &outcome.display_lines {
        println!("{}", line);
    }

    // Transcript lands next to the input file
    let out_dir = Path::new(&audio_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let saved = outcome.export.save_to(out_dir)?;
    info!("Transcript written to {:?}", saved);

    Ok(())
}
