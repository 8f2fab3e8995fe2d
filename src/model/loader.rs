use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::error::Result;
use crate::model::engine::{SpeechEngine, TranscribeOptions, WhisperEngine};
use crate::model::size::ModelSize;

/// Shared handle to a loaded engine; one per size for the process lifetime
pub type ModelHandle = Arc<dyn SpeechEngine>;

type EngineFactory = Box<dyn Fn(ModelSize) -> Result<ModelHandle> + Send + Sync>;

/// Loads speech engines and memoizes them by size.
///
/// The first load of a size pays for the weight download and context
/// initialization; every later load returns the same handle. Concurrent
/// first loads may both initialize; the first insert wins and the loser
/// is dropped.
pub struct ModelLoader {
    engines: DashMap<ModelSize, ModelHandle>,
    factory: EngineFactory,
}

impl ModelLoader {
    /// Create a loader backed by whisper engines with the given options
    pub fn new(options: TranscribeOptions) -> Self {
        Self::with_factory(Box::new(move |size| {
            let handle: ModelHandle = Arc::new(WhisperEngine::load(size, options.clone())?);
            Ok(handle)
        }))
    }

    /// Create a loader with a custom engine factory
    pub fn with_factory(factory: EngineFactory) -> Self {
        Self {
            engines: DashMap::new(),
            factory,
        }
    }

    /// Get the engine for a size, initializing it on first use
    pub fn load(&self, size: ModelSize) -> Result<ModelHandle> {
        if let Some(handle) = self.engines.get(&size) {
            debug!("Model {} already loaded", size);
            return Ok(handle.value().clone());
        }

        // Initialization runs outside the map lock, so a concurrent load of
        // the same size may also get here; the entry call keeps whichever
        // handle landed first.
        let handle = (self.factory)(size)?;

        let entry = self.engines.entry(size).or_insert(handle);
        Ok(entry.value().clone())
    }

    /// Parse a size name and load it
    pub fn load_named(&self, name: &str) -> Result<ModelHandle> {
        self.load(name.parse()?)
    }

    /// Check whether a size has a live handle
    pub fn is_loaded(&self, size: ModelSize) -> bool {
        self.engines.contains_key(&size)
    }
}
