//! The upload-facing transcription pipeline.
//!
//! One call per request; the model cache and the result cache are the only
//! state that outlives a request.

use std::sync::Arc;

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::export::TextExport;
use super::transcript::{Transcript, TranscriptInfo};
use crate::audio;
use crate::error::Result;
use crate::model::{DEFAULT_MODEL_SIZE, ModelLoader, ModelSize, TranscribeOptions};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Model size used for every request
    pub model: ModelSize,
    /// Decoding options passed to the engine
    pub options: TranscribeOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL_SIZE,
            options: TranscribeOptions::default(),
        }
    }
}

/// Cache key for transcription results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ResultKey {
    model: ModelSize,
    digest: [u8; 32],
}

/// Everything a caller needs to render one handled upload
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Formatted lines for display
    pub display_lines: Vec<String>,
    /// Download payload
    pub export: TextExport,
    /// The underlying transcript, shared with the result cache
    pub transcript: Arc<Transcript>,
}

/// Stateless request handler around the two process-lifetime caches
pub struct TranscriptionPipeline {
    config: PipelineConfig,
    loader: ModelLoader,
    results: DashMap<ResultKey, Arc<Transcript>>,
}

impl TranscriptionPipeline {
    /// Create a pipeline backed by whisper engines
    pub fn new(config: PipelineConfig) -> Self {
        let loader = ModelLoader::new(config.options.clone());
        Self::with_loader(config, loader)
    }

    /// Create a pipeline with a custom loader (used by tests)
    pub fn with_loader(config: PipelineConfig, loader: ModelLoader) -> Self {
        Self {
            config,
            loader,
            results: DashMap::new(),
        }
    }

    /// Transcribe an uploaded byte buffer
    ///
    /// `file_name` only hints the decoder; the cache key is the byte
    /// content plus the configured model, so byte-identical uploads return
    /// the cached transcript without decoding or running the model again.
    /// Failed requests cache nothing.
    pub fn transcribe(&self, file_name: &str, bytes: &[u8]) -> Result<Arc<Transcript>> {
        let key = ResultKey {
            model: self.config.model,
            digest: content_digest(bytes),
        };

        if let Some(cached) = self.results.get(&key) {
            debug!("Result cache hit for {} ({} bytes)", file_name, bytes.len());
            return Ok(cached.value().clone());
        }

        info!(
            "Transcribing {} ({} bytes) with {} model",
            file_name,
            bytes.len(),
            self.config.model
        );

        let engine = self.loader.load(self.config.model)?;
        let decoded = audio::decode_bytes(bytes, Some(file_name))?;
        let output = engine.transcribe(&decoded.samples)?;

        let transcript = Arc::new(Transcript::new(
            TranscriptInfo::new(self.config.model, output.language, decoded.duration_secs),
            output.segments,
        ));

        // Concurrent identical requests may both compute; the first insert
        // wins and every caller sees that one.
        let entry = self.results.entry(key).or_insert(transcript);
        Ok(entry.value().clone())
    }

    /// Handle one upload end to end: transcript, display lines, download payload
    pub fn handle_upload(&self, file_name: &str, bytes: &[u8]) -> Result<UploadOutcome> {
        let transcript = self.transcribe(file_name, bytes)?;

        Ok(UploadOutcome {
            display_lines: transcript.display_lines(),
            export: TextExport::new(file_name, &transcript),
            transcript,
        })
    }
}

/// SHA-256 of the exact upload bytes
fn content_digest(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{EngineOutput, ModelHandle, SpeechEngine};
    use crate::transcription::transcript::Segment;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedEngine {
        invocations: Arc<AtomicUsize>,
    }

    impl SpeechEngine for ScriptedEngine {
        fn transcribe(&self, _samples: &[f32]) -> Result<EngineOutput> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            Ok(EngineOutput {
                segments: vec![
                    Segment {
                        start: 0.0,
                        end: 1.5,
                        text: "hello".to_string(),
                    },
                    Segment {
                        start: 1.5,
                        end: 3.0,
                        text: "world".to_string(),
                    },
                ],
                language: Some("en".to_string()),
            })
        }
    }

    struct FlakyEngine {
        invocations: Arc<AtomicUsize>,
    }

    impl SpeechEngine for FlakyEngine {
        fn transcribe(&self, _samples: &[f32]) -> Result<EngineOutput> {
            let n = self.invocations.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(Error::ModelInference("transient failure".to_string()))
            } else {
                Ok(EngineOutput {
                    segments: Vec::new(),
                    language: None,
                })
            }
        }
    }

    fn scripted_pipeline() -> (TranscriptionPipeline, Arc<AtomicUsize>) {
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = invocations.clone();
        let loader = ModelLoader::with_factory(Box::new(move |_size| {
            Ok(Arc::new(ScriptedEngine {
                invocations: counter.clone(),
            }) as ModelHandle)
        }));
        let pipeline = TranscriptionPipeline::with_loader(PipelineConfig::default(), loader);
        (pipeline, invocations)
    }

    fn wav_bytes(frames: usize) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = std::io::Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..frames {
            writer.write_sample(((i % 80) as i16) * 100).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_identical_bytes_hit_cache() {
        let (pipeline, invocations) = scripted_pipeline();
        let bytes = wav_bytes(1600);

        let first = pipeline.transcribe("clip.wav", &bytes).unwrap();
        let second = pipeline.transcribe("renamed.wav", &bytes).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_different_bytes_miss_cache() {
        let (pipeline, invocations) = scripted_pipeline();

        let first = pipeline.transcribe("a.wav", &wav_bytes(1600)).unwrap();
        let second = pipeline.transcribe("b.wav", &wav_bytes(3200)).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(invocations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_upload_outcome_shape() {
        let (pipeline, _invocations) = scripted_pipeline();

        let outcome = pipeline
            .handle_upload("interview.mp3", &wav_bytes(1600))
            .unwrap();

        assert_eq!(
            outcome.display_lines,
            vec![
                "[0.00s -> 1.50s] hello".to_string(),
                "[1.50s -> 3.00s] world".to_string(),
            ]
        );
        assert_eq!(outcome.export.file_name, "interview_transcript.txt");
        assert_eq!(outcome.export.mime, "text/plain");
        assert_eq!(outcome.export.contents, outcome.transcript.full_text());
    }

    #[test]
    fn test_transcript_metadata() {
        let (pipeline, _invocations) = scripted_pipeline();

        let transcript = pipeline.transcribe("clip.wav", &wav_bytes(1600)).unwrap();

        assert_eq!(transcript.info.model, "tiny");
        assert_eq!(transcript.info.language.as_deref(), Some("en"));
        assert!((transcript.info.duration_secs - 0.1).abs() < 0.001);
    }

    #[test]
    fn test_garbage_bytes_fail_before_engine() {
        let (pipeline, invocations) = scripted_pipeline();

        let err = pipeline
            .transcribe("junk.mp3", b"definitely not audio")
            .unwrap_err();

        assert!(matches!(err, Error::AudioDecode(_)));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failed_requests_are_not_cached() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = invocations.clone();
        let loader = ModelLoader::with_factory(Box::new(move |_size| {
            Ok(Arc::new(FlakyEngine {
                invocations: counter.clone(),
            }) as ModelHandle)
        }));
        let pipeline = TranscriptionPipeline::with_loader(PipelineConfig::default(), loader);
        let bytes = wav_bytes(1600);

        assert!(matches!(
            pipeline.transcribe("clip.wav", &bytes),
            Err(Error::ModelInference(_))
        ));

        // The retry reaches the engine again instead of a cached failure
        let transcript = pipeline.transcribe("clip.wav", &bytes).unwrap();
        assert_eq!(invocations.load(Ordering::SeqCst), 2);
        assert!(transcript.segments.is_empty());
        assert_eq!(transcript.full_text(), "");
    }
}
