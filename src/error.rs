use thiserror::Error;

/// Errors surfaced by model loading and transcription.
///
/// Every fallible operation returns one of these directly to the caller;
/// nothing is retried or swallowed, and a failed request caches nothing.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested model size is not one of the known names.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The uploaded bytes could not be decoded as audio.
    #[error("Audio decode failed: {0}")]
    AudioDecode(String),

    /// The speech model failed to initialize or to run inference.
    #[error("Model inference failed: {0}")]
    ModelInference(String),

    /// Fetching model weights from the remote repository failed.
    #[error("Download failed: {0}")]
    Download(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
