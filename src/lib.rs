//! ```text
//! Raw text ──► segmenter::index_sentences ──► Sentence arena
//!                          │
//!                          ▼
//!       embeddings::EmbeddingProvider ──► cache::EmbeddingCache
//!                          │                  (one batch per call)
//!                          ▼
//!   breakpoints (threshold) ──► grouping (adjacent pass)
//!                          │
//!                          ▼
//!          merge (skip-window pass) ──► assembly (token budget)
//!                          │
//!                          ▼
//!            ordered, offset-exact SemanticChunks
//! ```
//!
//! Semantic text chunking with skip-window double-pass merging: sentences are
//! grouped by embedding similarity, regrouped across short digressions by a
//! bounded-lookback second pass, and packed into token-bounded chunks whose
//! offsets reconstruct the original document byte for byte.

pub mod assembly;
pub mod breakpoints;
pub mod cache;
pub mod config;
pub mod embeddings;
pub mod grouping;
pub mod merge;
pub mod segmenter;
pub mod service;
pub mod tokenizer;
pub mod types;

pub use config::{BreakpointStrategy, ChunkerConfig, ConfigError};
pub use embeddings::{EmbeddingError, EmbeddingProvider, MockEmbeddingProvider};
pub use segmenter::{SentenceSegmenter, SentenceSpan, UnicodeSegmenter};
pub use service::{ChunkResponse, ChunkTelemetry, DoublePassChunker, DoublePassChunkerBuilder};
pub use tokenizer::{HeuristicTokenCounter, TokenCounter};
#[cfg(feature = "tiktoken")]
pub use tokenizer::TiktokenCounter;
pub use types::{ChunkingError, ChunkingOutcome, ChunkingStats, SemanticChunk, Sentence};
