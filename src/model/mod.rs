//! Speech model loading and memoization.
//!
//! Wraps whisper.cpp behind the [`SpeechEngine`] trait and hands out one
//! shared handle per model size for the lifetime of the process.

mod download;
mod engine;
mod loader;
mod size;

pub use download::{download_model, is_model_downloaded, model_path, models_dir};
pub use engine::{EngineOutput, SpeechEngine, TranscribeOptions, WhisperEngine};
pub use loader::{ModelHandle, ModelLoader};
pub use size::{DEFAULT_MODEL_SIZE, ModelSize};
