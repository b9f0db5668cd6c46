//! Core data model shared across the chunking pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ConfigError;
use crate::embeddings::EmbeddingError;

/// A single sentence of the input text, as produced by the segmenter.
///
/// `text` is the exact substring `original[start..end]`; sentences are
/// contiguous and non-overlapping, so concatenating them in index order
/// reconstructs the input byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Position of the sentence within the document (0-based).
    pub index: usize,
    /// Exact sentence text, including any trailing whitespace the segmenter
    /// attached to it.
    pub text: String,
    /// Start byte offset into the original text.
    pub start: usize,
    /// End byte offset into the original text (exclusive).
    pub end: usize,
    /// Token count of `text` according to the configured counter.
    pub token_count: usize,
}

/// Final output segment: a contiguous span of the input with a bounded token
/// count.
///
/// `text` is the exact substring of the original input from the first member
/// sentence's `start` to the last member sentence's `end` — never a re-join
/// with altered whitespace. `token_count` is the configured counter's count
/// of `text` and stays within the configured budget, except when a single
/// sentence alone exceeds it (that sentence is emitted as its own oversized
/// chunk rather than truncated).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticChunk {
    pub id: Uuid,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub token_count: usize,
    pub sentences: Vec<Sentence>,
}

impl SemanticChunk {
    /// Builds a chunk from its member sentences and the already-counted text.
    pub fn new(text: String, token_count: usize, sentences: Vec<Sentence>) -> Self {
        let start = sentences.first().map(|s| s.start).unwrap_or(0);
        let end = sentences.last().map(|s| s.end).unwrap_or(start);
        Self {
            id: Uuid::new_v4(),
            text,
            start,
            end,
            token_count,
            sentences,
        }
    }
}

/// Chunking result paired with summary statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingOutcome {
    pub chunks: Vec<SemanticChunk>,
    pub stats: ChunkingStats,
}

impl ChunkingOutcome {
    pub(crate) fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            stats: ChunkingStats::default(),
        }
    }
}

/// Summary statistics for one chunking run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkingStats {
    /// Sentences produced by segmentation.
    pub total_sentences: usize,
    /// Groups left after the adjacent-similarity pass.
    pub first_pass_groups: usize,
    /// Groups left after the skip-window pass.
    pub merged_groups: usize,
    /// Chunks emitted by assembly.
    pub total_chunks: usize,
    /// Mean token count across emitted chunks.
    pub average_tokens: f32,
}

/// Errors surfaced by the chunking pipeline.
///
/// Empty or whitespace-only input is not an error: `chunk()` returns an empty
/// sequence for it.
#[derive(Debug, thiserror::Error)]
pub enum ChunkingError {
    /// Invalid configuration, rejected at construction time.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The embedding collaborator failed or returned malformed vectors.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// The token counter could not be constructed or applied.
    #[error("tokenizer failure: {0}")]
    Tokenizer(String),
}
