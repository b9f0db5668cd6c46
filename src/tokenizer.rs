//! Token counting seam.
//!
//! The pipeline only ever asks "how many tokens is this text" — the counter
//! behind that question is swappable. The `tiktoken` feature (on by default)
//! provides a BPE-accurate counter; [`HeuristicTokenCounter`] is always
//! available as a dependency-free approximation.

#[cfg(feature = "tiktoken")]
use crate::types::ChunkingError;

/// Counts tokens in a piece of text.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Rough counter for when BPE accuracy is not needed: one token per four
/// characters, never zero. Close enough for English prose budgeting.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenCounter;

impl TokenCounter for HeuristicTokenCounter {
    fn count(&self, text: &str) -> usize {
        (text.chars().count() / 4).max(1)
    }
}

/// BPE token counter backed by `tiktoken-rs`.
#[cfg(feature = "tiktoken")]
pub struct TiktokenCounter {
    bpe: tiktoken_rs::CoreBPE,
}

#[cfg(feature = "tiktoken")]
impl TiktokenCounter {
    /// Loads the `cl100k_base` encoding.
    pub fn cl100k() -> Result<Self, ChunkingError> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|err| ChunkingError::Tokenizer(err.to_string()))?;
        Ok(Self { bpe })
    }
}

#[cfg(feature = "tiktoken")]
impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

#[cfg(feature = "tiktoken")]
impl std::fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokenCounter").finish_non_exhaustive()
    }
}
