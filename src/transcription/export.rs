//! Download payload for assembled transcripts.

use std::path::{Path, PathBuf};

use tracing::info;

use super::transcript::Transcript;
use crate::error::Result;

/// MIME type offered for transcript downloads
pub const TRANSCRIPT_MIME: &str = "text/plain";

/// A downloadable transcript rendering
#[derive(Debug, Clone)]
pub struct TextExport {
    /// Suggested download filename, derived from the upload name
    pub file_name: String,
    /// MIME type of the payload
    pub mime: &'static str,
    /// The transcript text
    pub contents: String,
}

impl TextExport {
    /// Build the download payload for a transcript
    pub fn new(original_name: &str, transcript: &Transcript) -> Self {
        Self {
            file_name: suggested_file_name(original_name),
            mime: TRANSCRIPT_MIME,
            contents: transcript.full_text(),
        }
    }

    /// Write the payload into a directory; returns the written path
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.contents)?;
        info!("Saved transcript to {:?}", path);
        Ok(path)
    }
}

/// Derive the download filename from the uploaded file's name
///
/// "interview.mp3" becomes "interview_transcript.txt"; a name with no stem
/// falls back to "audio".
pub fn suggested_file_name(original_name: &str) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("audio");

    format!("{}_transcript.txt", stem)
}
