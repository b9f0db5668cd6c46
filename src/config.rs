//! Chunker configuration, validated once at construction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the similarity cutoff between sentence groups is chosen.
///
/// A tagged choice rather than two optional fields: exactly one of the two
/// modes is always in effect, so the "both set" / "neither set" states are
/// unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BreakpointStrategy {
    /// Use the given cosine similarity directly. Must lie in `[0.0, 1.0]`.
    Fixed(f32),
    /// Derive the cutoff from the document itself: the given percentile of
    /// the adjacent seed-group similarity distribution. Must lie in
    /// `(0.0, 100.0]`. Adapts the cutoff to the document's own similarity
    /// spread instead of a global constant.
    Percentile(f32),
}

impl fmt::Display for BreakpointStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakpointStrategy::Fixed(threshold) => {
                write!(f, "similarity_threshold={threshold}")
            }
            BreakpointStrategy::Percentile(percentile) => {
                write!(f, "similarity_percentile={percentile}")
            }
        }
    }
}

/// Parameters for [`DoublePassChunker`](crate::service::DoublePassChunker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Maximum tokens per emitted chunk.
    pub chunk_size: usize,
    /// Similarity cutoff selection.
    pub strategy: BreakpointStrategy,
    /// Sentences per seed group in the first pass.
    pub initial_sentences: usize,
    /// How many finalized groups the second pass may look back across. Zero
    /// disables the second pass.
    pub skip_window: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            strategy: BreakpointStrategy::Fixed(0.5),
            initial_sentences: 1,
            skip_window: 1,
        }
    }
}

impl ChunkerConfig {
    /// Checks every parameter range. Called by the service builder so an
    /// invalid configuration fails at construction, never at chunk time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ChunkSizeZero);
        }
        if self.initial_sentences == 0 {
            return Err(ConfigError::InitialSentencesZero);
        }
        match self.strategy {
            BreakpointStrategy::Fixed(threshold) => {
                if !(0.0..=1.0).contains(&threshold) || !threshold.is_finite() {
                    return Err(ConfigError::ThresholdOutOfRange(threshold));
                }
            }
            BreakpointStrategy::Percentile(percentile) => {
                if !(percentile > 0.0 && percentile <= 100.0) {
                    return Err(ConfigError::PercentileOutOfRange(percentile));
                }
            }
        }
        Ok(())
    }
}

/// Construction-time configuration failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("chunk_size must be greater than zero")]
    ChunkSizeZero,

    #[error("initial_sentences must be at least 1")]
    InitialSentencesZero,

    #[error("similarity threshold {0} is outside [0.0, 1.0]")]
    ThresholdOutOfRange(f32),

    #[error("similarity percentile {0} is outside (0.0, 100.0]")]
    PercentileOutOfRange(f32),

    #[error("an embedding provider is required")]
    MissingEmbedder,
}
