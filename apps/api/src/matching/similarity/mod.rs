//! Semantic similarity: contextual closeness between résumé and JD text.
//!
//! Two strategies sit behind `SimilarityStrategy`: sentence embeddings (primary) and TF-IDF
//! over the two documents (fallback). `SimilarityEngine` picks one per call with a capability
//! check: the embedding model is loaded lazily, at most once, under a mutex. A failed load or
//! a failed encode downgrades the engine to the lexical path until `reset()` is called.
//!
//! Both paths return a value in [0, 1], so callers never care which one ran; the backend
//! label travels with the result for logging and reporting.

pub mod embedding;
pub mod lexical;

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::matching::text::normalize_text;

pub use embedding::{Embedder, EmbedderLoader, EmbeddingError, EmbeddingStrategy};
pub use lexical::LexicalFallbackStrategy;

#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

/// One way of scoring two documents. Results are in [0, 1], higher is more similar.
pub trait SimilarityStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError>;
}

/// Which strategy produced a similarity value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityBackend {
    Embedding,
    Lexical,
}

impl SimilarityBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityBackend::Embedding => "embedding",
            SimilarityBackend::Lexical => "lexical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityScore {
    /// 0.0 – 1.0
    pub value: f64,
    pub backend: SimilarityBackend,
}

enum ModelState {
    Uninitialized,
    Ready(Arc<EmbeddingStrategy>),
    Unavailable,
}

/// Process-wide similarity service. Construct once at startup and share behind an `Arc`.
pub struct SimilarityEngine {
    loader: Option<EmbedderLoader>,
    state: Mutex<ModelState>,
    lexical: LexicalFallbackStrategy,
}

impl SimilarityEngine {
    /// Engine that will lazily build its embedding model with `loader`.
    pub fn with_loader(loader: EmbedderLoader) -> Self {
        Self {
            loader: Some(loader),
            state: Mutex::new(ModelState::Uninitialized),
            lexical: LexicalFallbackStrategy,
        }
    }

    /// Engine with no embedding model; every call uses the lexical strategy.
    pub fn lexical_only() -> Self {
        Self {
            loader: None,
            state: Mutex::new(ModelState::Unavailable),
            lexical: LexicalFallbackStrategy,
        }
    }

    /// Production engine: the local fastembed model when compiled with the `embeddings`
    /// feature and `enabled` is set, otherwise lexical only.
    pub fn from_settings(enabled: bool, cache_dir: Option<std::path::PathBuf>) -> Self {
        if !enabled {
            info!("Embeddings disabled by configuration; using lexical similarity");
            return Self::lexical_only();
        }
        default_engine(cache_dir)
    }

    // A caller abandoned mid-load can poison the mutex; the state is still one of the
    // three variants, so it is safe to keep using it.
    fn lock_state(&self) -> MutexGuard<'_, ModelState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Capability check. Loads the model on first use; returns it if available.
    fn resolve(&self) -> Option<Arc<EmbeddingStrategy>> {
        let mut state = self.lock_state();
        match &*state {
            ModelState::Ready(strategy) => return Some(Arc::clone(strategy)),
            ModelState::Unavailable => return None,
            ModelState::Uninitialized => {}
        }

        let Some(loader) = self.loader.as_ref() else {
            *state = ModelState::Unavailable;
            return None;
        };

        match loader() {
            Ok(embedder) => {
                let strategy = Arc::new(EmbeddingStrategy::new(embedder));
                info!(model = strategy.model_name(), "Embedding model loaded");
                *state = ModelState::Ready(Arc::clone(&strategy));
                Some(strategy)
            }
            Err(e) => {
                warn!(error = %e, "Embedding model unavailable; using lexical similarity");
                *state = ModelState::Unavailable;
                None
            }
        }
    }

    /// Explicit startup initialization. Returns the backend future calls will use.
    pub fn warm_up(&self) -> SimilarityBackend {
        self.active_backend()
    }

    pub fn active_backend(&self) -> SimilarityBackend {
        match self.resolve() {
            Some(_) => SimilarityBackend::Embedding,
            None => SimilarityBackend::Lexical,
        }
    }

    /// Forgets the current model state so the next call tries to load the model again.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        *state = if self.loader.is_some() {
            ModelState::Uninitialized
        } else {
            ModelState::Unavailable
        };
        debug!("Similarity engine reset");
    }

    /// Marks `failed` unavailable. A no-op when the engine has since been reset or
    /// reloaded, so a stale failure never takes down a fresh model.
    fn downgrade(&self, failed: &Arc<EmbeddingStrategy>, error: &SimilarityError) {
        let mut state = self.lock_state();
        match &*state {
            ModelState::Ready(current) if Arc::ptr_eq(current, failed) => {
                warn!(
                    model = failed.model_name(),
                    error = %error,
                    "Embedding encode failed; downgrading to lexical similarity"
                );
                *state = ModelState::Unavailable;
            }
            _ => debug!(
                model = failed.model_name(),
                error = %error,
                "Embedding encode failed on a superseded model; state left as is"
            ),
        }
    }

    /// Similarity of `resume_text` to `jd_text`, in [0, 1]. Never fails: empty input scores 0,
    /// embedding failures fall back to the lexical strategy.
    pub fn similarity(&self, resume_text: &str, jd_text: &str) -> SimilarityScore {
        let resume = normalize_text(resume_text);
        let jd = normalize_text(jd_text);

        if resume.is_empty() || jd.is_empty() {
            debug!("Empty input text; similarity is 0");
            return SimilarityScore {
                value: 0.0,
                backend: SimilarityBackend::Lexical,
            };
        }

        if let Some(strategy) = self.resolve() {
            match strategy.similarity(&resume, &jd) {
                Ok(value) => {
                    debug!(backend = strategy.name(), value, "Similarity computed");
                    return SimilarityScore {
                        value: value.clamp(0.0, 1.0),
                        backend: SimilarityBackend::Embedding,
                    };
                }
                Err(e) => self.downgrade(&strategy, &e),
            }
        }

        self.lexical_similarity(&resume, &jd)
    }

    fn lexical_similarity(&self, resume: &str, jd: &str) -> SimilarityScore {
        let value = match self.lexical.similarity(resume, jd) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Lexical similarity failed; scoring 0");
                0.0
            }
        };
        debug!(backend = self.lexical.name(), value, "Similarity computed");
        SimilarityScore {
            value: value.clamp(0.0, 1.0),
            backend: SimilarityBackend::Lexical,
        }
    }
}

#[cfg(feature = "embeddings")]
fn default_engine(cache_dir: Option<std::path::PathBuf>) -> SimilarityEngine {
    SimilarityEngine::with_loader(Box::new(move || {
        let embedder = embedding::FastEmbedder::load(cache_dir.clone())?;
        Ok(Arc::new(embedder) as Arc<dyn Embedder>)
    }))
}

#[cfg(not(feature = "embeddings"))]
fn default_engine(_cache_dir: Option<std::path::PathBuf>) -> SimilarityEngine {
    info!("Built without the `embeddings` feature; using lexical similarity");
    SimilarityEngine::lexical_only()
}
