//! Embedding generation seam.
//!
//! The chunker never talks to a model directly; it goes through
//! [`EmbeddingProvider`], which keeps the core algorithm testable with
//! deterministic vectors. [`MockEmbeddingProvider`] is the batteries-included
//! stand-in for tests and CI.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use parking_lot::Mutex;

/// Failures at the embedding boundary.
///
/// Malformed vectors are rejected here, before any similarity math runs:
/// silently producing wrong groupings would be worse than failing loudly.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// The provider itself failed (timeout, transport, model error).
    #[error("embedding provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    /// The batch response does not line up with the request.
    #[error("embedding batch returned {actual} vectors for {expected} inputs")]
    BatchSizeMismatch { expected: usize, actual: usize },

    /// A vector's dimension disagrees with the rest of the batch (or the
    /// provider's advertised dimension).
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A vector contains NaN or infinite components.
    #[error("embedding for input {index} contains non-finite values")]
    MalformedVector { index: usize },
}

/// Produces embedding vectors for batches of text.
///
/// One call to [`embed_batch`](Self::embed_batch) covers all base sentences
/// of a document, so implementations should batch efficiently. Vectors must
/// share a single fixed dimension per provider instance.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short identifier used in telemetry and diagnostics.
    fn id(&self) -> &str;

    /// Advertised vector dimension, when the provider knows it up front.
    fn dimension(&self) -> Option<usize> {
        None
    }

    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Deterministic embedding provider for tests and offline runs.
///
/// Vectors are bag-of-words bucket counts (words hashed into a fixed number
/// of buckets, L2-normalized). The same text always maps to the same vector,
/// and texts sharing vocabulary land close in cosine space — enough structure
/// for the grouping passes to behave meaningfully without a model.
pub struct MockEmbeddingProvider {
    dimension: usize,
    memo: Mutex<HashMap<String, Vec<f32>>>,
}

impl MockEmbeddingProvider {
    pub const DEFAULT_DIMENSION: usize = 64;

    pub fn new() -> Self {
        Self::with_dimension(Self::DEFAULT_DIMENSION)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        assert!(dimension > 0, "embedding dimension must be non-zero");
        Self {
            dimension,
            memo: Mutex::new(HashMap::new()),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for word in text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % self.dimension;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        } else {
            // No alphanumeric content at all; pin to a fixed axis so the
            // vector is still unit length.
            vector[0] = 1.0;
        }
        vector
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockEmbeddingProvider")
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn id(&self) -> &str {
        "mock"
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }

    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut memo = self.memo.lock();
        Ok(inputs
            .iter()
            .map(|input| {
                memo.entry(input.clone())
                    .or_insert_with(|| self.embed_one(input))
                    .clone()
            })
            .collect())
    }
}
