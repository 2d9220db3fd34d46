//! Embedding-backed similarity.
//!
//! `Embedder` abstracts the sentence-embedding model so the engine can be driven by the
//! local fastembed model in production and by deterministic fakes in tests.

use std::sync::Arc;

use thiserror::Error;

use super::{SimilarityError, SimilarityStrategy};

#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The model could not be constructed (missing files, download failure, disabled).
    #[error("embedding model unavailable: {0}")]
    Unavailable(String),

    /// The model was loaded but inference failed.
    #[error("embedding inference failed: {0}")]
    Inference(String),

    #[error("embedding model returned {got} vectors for {expected} inputs")]
    Shape { expected: usize, got: usize },
}

/// A loaded sentence-embedding model. Implementations must be safe for concurrent inference.
pub trait Embedder: Send + Sync {
    fn model_name(&self) -> &str;

    /// Encodes each input into a fixed-length dense vector, in input order.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Constructs the embedder. Called at most once per engine initialization.
pub type EmbedderLoader =
    Box<dyn Fn() -> Result<Arc<dyn Embedder>, EmbeddingError> + Send + Sync>;

/// Cosine similarity of two vectors, in [-1, 1]. Zero-norm or mismatched vectors yield 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        tracing::warn!(
            a_len = a.len(),
            b_len = b.len(),
            "embedding dimension mismatch; returning zero similarity"
        );
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Primary strategy: cosine similarity of the two documents' embeddings.
/// Negative cosine is floored to 0 so the result stays in [0, 1].
pub struct EmbeddingStrategy {
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingStrategy {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }
}

impl SimilarityStrategy for EmbeddingStrategy {
    fn name(&self) -> &'static str {
        "embedding"
    }

    fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError> {
        let vectors = self.embedder.embed(&[a, b])?;
        if vectors.len() != 2 {
            return Err(EmbeddingError::Shape {
                expected: 2,
                got: vectors.len(),
            }
            .into());
        }
        let cosine = cosine_similarity(&vectors[0], &vectors[1]) as f64;
        Ok(cosine.clamp(0.0, 1.0))
    }
}

impl std::fmt::Debug for EmbeddingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingStrategy")
            .field("model_name", &self.embedder.model_name())
            .finish()
    }
}

#[cfg(feature = "embeddings")]
pub use self::local::FastEmbedder;

#[cfg(feature = "embeddings")]
mod local {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

    use super::{Embedder, EmbeddingError};

    /// Local AllMiniLML6V2 sentence-embedding model via fastembed.
    pub struct FastEmbedder {
        model: Mutex<TextEmbedding>,
        model_name: String,
    }

    impl FastEmbedder {
        pub fn load(cache_dir: Option<PathBuf>) -> Result<Self, EmbeddingError> {
            let model_type = EmbeddingModel::AllMiniLML6V2;
            let model_name = format!("{model_type:?}");

            let mut options = InitOptions::new(model_type).with_show_download_progress(false);
            if let Some(dir) = cache_dir {
                options = options.with_cache_dir(dir);
            }

            let model = TextEmbedding::try_new(options)
                .map_err(|e| EmbeddingError::Unavailable(e.to_string()))?;

            Ok(Self {
                model: Mutex::new(model),
                model_name,
            })
        }
    }

    impl Embedder for FastEmbedder {
        fn model_name(&self) -> &str {
            &self.model_name
        }

        fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            let model = self
                .model
                .lock()
                .map_err(|_| EmbeddingError::Inference("model lock poisoned".to_string()))?;
            model
                .embed(texts.to_vec(), None)
                .map_err(|e| EmbeddingError::Inference(e.to_string()))
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;

    #[test]
    fn test_cosine_identical_vectors_is_one() {
        let sim = cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite_vectors_is_negative_one() {
        let sim = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((sim + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector_and_mismatch_are_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_negative_cosine_is_floored_to_zero() {
        let strategy = EmbeddingStrategy::new(Arc::new(FixedEmbedder(
            vec![1.0, 0.0],
            vec![-1.0, 0.0],
        )));
        assert_eq!(strategy.similarity("a", "b").unwrap(), 0.0);
    }

    #[test]
    fn test_embedding_strategy_ranks_closer_texts_higher() {
        let strategy = EmbeddingStrategy::new(letters());
        let close = strategy.similarity("python sql", "sql python").unwrap();
        let far = strategy.similarity("python sql", "zzz").unwrap();
        assert!((close - 1.0).abs() < 1e-6);
        assert!(far < close);
        assert!((0.0..=1.0).contains(&far));
    }

    #[test]
    fn test_encode_failure_surfaces_as_error() {
        let strategy = EmbeddingStrategy::new(Arc::new(BrokenEmbedder {
            calls: Default::default(),
        }));
        assert!(strategy.similarity("a", "b").is_err());
    }

    #[test]
    fn test_debug_shows_model_name() {
        let strategy = EmbeddingStrategy::new(letters());
        assert!(format!("{strategy:?}").contains("letters"));
    }
}
