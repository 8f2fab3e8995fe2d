//! Transcript assembly and the upload-facing pipeline.

pub mod export;
pub mod pipeline;
pub mod transcript;

pub use export::{TRANSCRIPT_MIME, TextExport, suggested_file_name};
pub use pipeline::{PipelineConfig, TranscriptionPipeline, UploadOutcome};
pub use transcript::{Segment, Transcript, TranscriptInfo, format_timestamp};
