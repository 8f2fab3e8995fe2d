use tracing::info;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::WHISPER_SAMPLE_RATE;
use crate::error::{Error, Result};
use crate::model::download::download_model;
use crate::model::size::ModelSize;
use crate::transcription::Segment;

/// Decoding options for transcription
#[derive(Debug, Clone)]
pub struct TranscribeOptions {
    /// Primary language hint (None = auto-detect)
    pub language: Option<String>,
    /// Whether to translate to English (false = keep original language)
    pub translate: bool,
    /// Beam width for decoding; 1 falls back to greedy sampling
    pub beam_size: i32,
}

impl Default for TranscribeOptions {
    fn default() -> Self {
        Self {
            language: None,
            translate: false,
            beam_size: 5,
        }
    }
}

/// Raw engine output before transcript assembly
#[derive(Debug, Clone)]
pub struct EngineOutput {
    /// Timed segments in model order
    pub segments: Vec<Segment>,
    /// Detected language, when the model reports one
    pub language: Option<String>,
}

/// A loaded speech-to-text engine.
///
/// The pipeline only sees this trait, so tests can substitute a counting
/// fake for the whisper-backed implementation.
pub trait SpeechEngine: Send + Sync {
    /// Transcribe 16kHz mono samples into timed segments
    fn transcribe(&self, samples: &[f32]) -> Result<EngineOutput>;
}

impl std::fmt::Debug for dyn SpeechEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SpeechEngine")
    }
}

/// Whisper-backed speech engine
pub struct WhisperEngine {
    ctx: WhisperContext,
    size: ModelSize,
    options: TranscribeOptions,
    /// Number of threads for inference
    n_threads: i32,
}

impl WhisperEngine {
    /// Load a whisper context for the given size, downloading weights first
    /// when they are not cached
    pub fn load(size: ModelSize, options: TranscribeOptions) -> Result<Self> {
        let path = download_model(size)?;

        info!("Loading Whisper {} model...", size);

        let path_str = path.to_str().ok_or_else(|| {
            Error::ModelInference(format!("Model path is not valid UTF-8: {:?}", path))
        })?;

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| Error::ModelInference(format!("Failed to load model: {}", e)))?;

        let n_threads = std::thread::available_parallelism()
            .map(|p| (p.get() as i32).max(1))
            .unwrap_or(4);

        info!(
            "Whisper model loaded successfully (using {} threads)",
            n_threads
        );

        Ok(Self {
            ctx,
            size,
            options,
            n_threads,
        })
    }
}

impl SpeechEngine for WhisperEngine {
    fn transcribe(&self, samples: &[f32]) -> Result<EngineOutput> {
        let start_time = std::time::Instant::now();
        let audio_secs = samples.len() as f32 / WHISPER_SAMPLE_RATE as f32;

        info!(
            "Transcribing {:.1}s of audio with {} model",
            audio_secs, self.size
        );

        let strategy = if self.options.beam_size > 1 {
            SamplingStrategy::BeamSearch {
                beam_size: self.options.beam_size,
                patience: -1.0,
            }
        } else {
            SamplingStrategy::Greedy { best_of: 1 }
        };
        let mut params = FullParams::new(strategy);

        params.set_n_threads(self.n_threads);
        params.set_token_timestamps(false);

        match &self.options.language {
            Some(lang) => params.set_language(Some(lang)),
            None => params.set_language(Some("auto")),
        }
        params.set_translate(self.options.translate);

        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_print_special(false);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| Error::ModelInference(format!("Failed to create state: {}", e)))?;

        state
            .full(params, samples)
            .map_err(|e| Error::ModelInference(format!("Inference failed: {}", e)))?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| Error::ModelInference(format!("Failed to get segments: {}", e)))?;

        let mut segments = Vec::new();

        for i in 0..num_segments {
            let start_ts = state
                .full_get_segment_t0(i)
                .map_err(|e| Error::ModelInference(format!("Failed to get start time: {}", e)))?;
            let end_ts = state
                .full_get_segment_t1(i)
                .map_err(|e| Error::ModelInference(format!("Failed to get end time: {}", e)))?;
            let text = state
                .full_get_segment_text(i)
                .map_err(|e| Error::ModelInference(format!("Failed to get text: {}", e)))?;

            let text = text.trim().to_string();
            if text.is_empty() {
                continue;
            }

            // Timestamps are in centiseconds (1/100 second)
            segments.push(Segment {
                start: start_ts as f64 / 100.0,
                end: end_ts as f64 / 100.0,
                text,
            });
        }

        let language = state
            .full_lang_id_from_state()
            .ok()
            .and_then(|id| whisper_rs::get_lang_str(id).map(|s| s.to_string()));

        let elapsed = start_time.elapsed();
        info!(
            "Transcribed {:.1}s in {:.1}s ({:.1}x realtime): {} segments",
            audio_secs,
            elapsed.as_secs_f32(),
            audio_secs / elapsed.as_secs_f32(),
            segments.len()
        );

        Ok(EngineOutput { segments, language })
    }
}
