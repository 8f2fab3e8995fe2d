use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::error::{Error, Result};
use crate::model::size::ModelSize;

/// Get the directory where model weights are cached
///
/// Defaults to `models/whisper` under the working directory; the
/// `VOXSCRIBE_MODEL_DIR` environment variable overrides it.
pub fn models_dir() -> PathBuf {
    std::env::var("VOXSCRIBE_MODEL_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("models").join("whisper"))
}

/// Get the path to a specific model file
pub fn model_path(size: ModelSize) -> PathBuf {
    models_dir().join(size.filename())
}

/// Check if a model is already downloaded
pub fn is_model_downloaded(size: ModelSize) -> bool {
    let path = model_path(size);
    if !path.exists() {
        return false;
    }

    // Check if file size is reasonable (at least 50% of expected)
    if let Ok(metadata) = fs::metadata(&path) {
        let expected_bytes = size.size_mb() * 1024 * 1024;
        return metadata.len() >= expected_bytes / 2;
    }

    false
}

/// Download a Whisper model from Hugging Face if it is not cached yet
pub fn download_model(size: ModelSize) -> Result<PathBuf> {
    let path = model_path(size);

    if is_model_downloaded(size) {
        info!("Model {} already downloaded at {:?}", size, path);
        return Ok(path);
    }

    fs::create_dir_all(models_dir())?;

    info!(
        "Downloading Whisper {} model (~{}MB)...",
        size,
        size.size_mb()
    );

    let url = size.hf_url();

    let response = reqwest::blocking::Client::new()
        .get(url)
        .send()
        .map_err(|e| Error::Download(format!("HTTP request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(Error::Download(format!(
            "HTTP {} from {}",
            response.status(),
            url
        )));
    }

    let total_size = response.content_length().unwrap_or(0);

    let pb = indicatif::ProgressBar::new(total_size);
    pb.set_style(
        indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    // Every attempt streams into its own uniquely named temp file, so
    // concurrent downloads of the same model never touch each other's data
    let mut temp = tempfile::Builder::new()
        .prefix(size.filename())
        .suffix(".tmp")
        .tempfile_in(models_dir())?;

    let mut reader = pb.wrap_read(response);
    std::io::copy(&mut reader, temp.as_file_mut())
        .map_err(|e| Error::Download(format!("Failed to read response: {}", e)))?;

    pb.finish_with_message("Download complete");

    // Atomic rename; only a fully written file ever lands at the final path
    temp.persist(&path).map_err(|e| Error::Io(e.error))?;

    info!("Model downloaded to {:?}", path);

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_paths() {
        assert!(
            model_path(ModelSize::Tiny)
                .to_str()
                .unwrap()
                .contains("ggml-tiny.bin")
        );
        assert!(
            model_path(ModelSize::Large)
                .to_str()
                .unwrap()
                .contains("ggml-large-v3.bin")
        );
    }
}
