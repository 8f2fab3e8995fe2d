//! Audio upload transcription.
//!
//! Takes an uploaded audio file as an in-memory byte buffer, decodes it,
//! runs a local whisper.cpp model over it, and produces a timestamped
//! transcript ready for display and download.
//!
//! The crate is organized into the following modules:
//!
//! - `audio`: In-memory decoding and 16kHz mono preparation
//! - `model`: Model sizes, weight downloads, and the memoized loader
//! - `transcription`: Transcript assembly, export payloads, and the pipeline
//! - `error`: Error types
//!
//! # Example
//!
//! ```no_run
//! use voxscribe::{PipelineConfig, TranscriptionPipeline};
//!
//! let pipeline = TranscriptionPipeline::new(PipelineConfig::default());
//!
//! let bytes = std::fs::read("interview.mp3").unwrap();
//! let outcome = pipeline.handle_upload("interview.mp3", &bytes).unwrap();
//!
//! for line in &outcome.display_lines {
//!     println!("{}", line);
//! }
//! ```

pub mod audio;
pub mod error;
pub mod model;
pub mod transcription;

pub use error::{Error, Result};
pub use model::{
    DEFAULT_MODEL_SIZE, EngineOutput, ModelHandle, ModelLoader, ModelSize, SpeechEngine,
    TranscribeOptions, WhisperEngine,
};
pub use transcription::{
    PipelineConfig, Segment, TextExport, Transcript, TranscriptInfo, TranscriptionPipeline,
    UploadOutcome, format_timestamp,
};
