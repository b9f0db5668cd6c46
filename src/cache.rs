//! Per-call embedding cache.
//!
//! All base-sentence embeddings are fetched in a single batch round trip and
//! memoized by sentence index; group centroids are computed as means over the
//! cached vectors, never by re-embedding concatenated text. The cache lives
//! for one `chunk()` call and is dropped with it — there is no cross-call
//! state.

use crate::embeddings::{EmbeddingError, EmbeddingProvider};
use crate::types::Sentence;

/// Sentence embeddings for one chunking run, keyed by sentence index.
#[derive(Debug)]
pub struct EmbeddingCache {
    vectors: Vec<Vec<f32>>,
    dimension: usize,
}

impl EmbeddingCache {
    /// Embeds every sentence in one batch and validates the response at the
    /// boundary: batch length, consistent dimension, finite components.
    pub async fn build(
        provider: &dyn EmbeddingProvider,
        sentences: &[Sentence],
    ) -> Result<Self, EmbeddingError> {
        let inputs: Vec<String> = sentences
            .iter()
            .map(|sentence| sentence.text.trim().to_string())
            .collect();

        let vectors = provider.embed_batch(&inputs).await?;
        if vectors.len() != inputs.len() {
            return Err(EmbeddingError::BatchSizeMismatch {
                expected: inputs.len(),
                actual: vectors.len(),
            });
        }

        let dimension = match provider.dimension() {
            Some(dimension) => dimension,
            None => vectors.first().map(|v| v.len()).unwrap_or(0),
        };

        for (index, vector) in vectors.iter().enumerate() {
            if vector.len() != dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            if vector.iter().any(|v| !v.is_finite()) {
                return Err(EmbeddingError::MalformedVector { index });
            }
        }

        Ok(Self { vectors, dimension })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The cached vector for a sentence index.
    pub fn vector(&self, index: usize) -> &[f32] {
        &self.vectors[index]
    }

    /// Mean of the cached vectors for the given sentence indices.
    ///
    /// The raw mean is not re-normalized; cosine similarity is
    /// scale-invariant so the magnitude carries no information.
    pub fn centroid(&self, indices: &[usize]) -> Vec<f32> {
        debug_assert!(!indices.is_empty());
        let mut centroid = vec![0.0f32; self.dimension];
        for &index in indices {
            for (slot, component) in centroid.iter_mut().zip(self.vectors[index].iter()) {
                *slot += component;
            }
        }
        let scale = 1.0 / indices.len() as f32;
        for slot in &mut centroid {
            *slot *= scale;
        }
        centroid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedProvider {
        vectors: Vec<Vec<f32>>,
        dimension: Option<usize>,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedProvider {
        fn id(&self) -> &str {
            "fixed"
        }

        fn dimension(&self) -> Option<usize> {
            self.dimension
        }

        async fn embed_batch(&self, _inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(self.vectors.clone())
        }
    }

    fn sentence(index: usize, text: &str) -> Sentence {
        Sentence {
            index,
            text: text.to_string(),
            start: 0,
            end: text.len(),
            token_count: 1,
        }
    }

    #[tokio::test]
    async fn caches_one_vector_per_sentence() {
        let provider = FixedProvider {
            vectors: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            dimension: Some(2),
        };
        let sentences = vec![sentence(0, "a"), sentence(1, "b")];

        let cache = EmbeddingCache::build(&provider, &sentences).await.unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.dimension(), 2);
        assert_eq!(cache.vector(1), &[0.0, 1.0]);
    }

    #[tokio::test]
    async fn centroid_is_the_member_mean() {
        let provider = FixedProvider {
            vectors: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            dimension: Some(2),
        };
        let sentences = vec![sentence(0, "a"), sentence(1, "b")];
        let cache = EmbeddingCache::build(&provider, &sentences).await.unwrap();

        assert_eq!(cache.centroid(&[0, 1]), vec![0.5, 0.5]);
        assert_eq!(cache.centroid(&[0]), vec![1.0, 0.0]);
    }

    #[tokio::test]
    async fn rejects_batch_size_mismatch() {
        let provider = FixedProvider {
            vectors: vec![vec![1.0, 0.0]],
            dimension: Some(2),
        };
        let sentences = vec![sentence(0, "a"), sentence(1, "b")];

        let err = EmbeddingCache::build(&provider, &sentences).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::BatchSizeMismatch { expected: 2, actual: 1 }));
    }

    #[tokio::test]
    async fn rejects_dimension_mismatch() {
        let provider = FixedProvider {
            vectors: vec![vec![1.0, 0.0], vec![0.0, 1.0, 0.0]],
            dimension: Some(2),
        };
        let sentences = vec![sentence(0, "a"), sentence(1, "b")];

        let err = EmbeddingCache::build(&provider, &sentences).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::DimensionMismatch { expected: 2, actual: 3 }));
    }

    #[tokio::test]
    async fn rejects_non_finite_components() {
        let provider = FixedProvider {
            vectors: vec![vec![1.0, 0.0], vec![f32::NAN, 1.0]],
            dimension: Some(2),
        };
        let sentences = vec![sentence(0, "a"), sentence(1, "b")];

        let err = EmbeddingCache::build(&provider, &sentences).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::MalformedVector { index: 1 }));
    }
}
