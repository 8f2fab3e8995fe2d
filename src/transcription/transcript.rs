//! Transcript types and display formatting.

use serde::{Deserialize, Serialize};

use crate::model::ModelSize;

/// A segment of transcribed speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Transcribed text
    pub text: String,
}

impl Segment {
    /// Render this segment as one display line
    pub fn display_line(&self) -> String {
        format!(
            "[{} -> {}] {}",
            format_timestamp(self.start),
            format_timestamp(self.end),
            self.text
        )
    }
}

/// Metadata about a transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptInfo {
    /// Model used for transcription
    pub model: String,
    /// Language detected by the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Audio duration in seconds
    pub duration_secs: f32,
    /// Assembly time (ISO 8601)
    pub generated_at: String,
}

impl TranscriptInfo {
    pub fn new(model: ModelSize, language: Option<String>, duration_secs: f32) -> Self {
        Self {
            model: model.to_string(),
            language,
            duration_secs,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Complete transcript for one audio input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Request metadata
    pub info: TranscriptInfo,
    /// All segments, in model order
    pub segments: Vec<Segment>,
}

impl Transcript {
    pub fn new(info: TranscriptInfo, segments: Vec<Segment>) -> Self {
        Self { info, segments }
    }

    /// One formatted line per segment, in segment order
    pub fn display_lines(&self) -> Vec<String> {
        self.segments.iter().map(Segment::display_line).collect()
    }

    /// All display lines joined by newlines, with no trailing newline
    pub fn full_text(&self) -> String {
        self.display_lines().join("\n")
    }

    /// Export to JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Export to pretty-printed JSON
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Format a segment offset for display
///
/// Offsets under a minute render as fractional seconds ("7.25s"); from one
/// minute on they switch to zero-padded MM:SS with the fraction dropped.
pub fn format_timestamp(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{:.2}s", seconds)
    } else {
        let total_secs = seconds as u64;
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}
