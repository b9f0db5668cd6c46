//! The chunking service: wiring, orchestration, and telemetry.
//!
//! [`DoublePassChunker`] owns the three collaborator seams (segmenter,
//! embedding provider, token counter) plus a validated configuration, and
//! runs the pipeline end to end: segment → embed once → derive threshold →
//! adjacent pass → skip-window pass → assembly.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::assembly;
use crate::breakpoints;
use crate::cache::EmbeddingCache;
use crate::config::{ChunkerConfig, ConfigError};
use crate::embeddings::EmbeddingProvider;
use crate::grouping;
use crate::merge;
use crate::segmenter::{self, SentenceSegmenter, UnicodeSegmenter};
use crate::tokenizer::TokenCounter;
use crate::types::{ChunkingError, ChunkingOutcome, ChunkingStats, SemanticChunk};

#[cfg(not(feature = "tiktoken"))]
use crate::tokenizer::HeuristicTokenCounter;
#[cfg(feature = "tiktoken")]
use crate::tokenizer::TiktokenCounter;

/// Run-level diagnostics emitted alongside the chunking outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkTelemetry {
    /// Identifier of the embedding provider that served the run.
    pub embedder: String,
    /// Rendered breakpoint strategy (`similarity_threshold=…` or
    /// `similarity_percentile=…`).
    pub strategy: String,
    /// The effective similarity cutoff, when one was derived. `None` for
    /// runs that never reached the grouping passes (empty input, single
    /// sentence).
    pub derived_threshold: Option<f32>,
    pub duration_ms: u64,
    pub chunk_count: usize,
    pub average_tokens: f32,
}

/// Outcome plus telemetry for one chunking run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkResponse {
    pub outcome: ChunkingOutcome,
    pub telemetry: ChunkTelemetry,
}

/// Semantic chunker with skip-window double-pass merging.
///
/// Each call to [`chunk`](Self::chunk) is a pure function of the input text
/// and the configuration: the call owns its sentences, embeddings, and
/// groups exclusively, so concurrent calls share no mutable state. Partial
/// results are never produced — either the full chunk list comes back or an
/// error does.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use chunksmith::{DoublePassChunker, MockEmbeddingProvider};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), chunksmith::ChunkingError> {
/// let chunker = DoublePassChunker::builder()
///     .embedding_provider(Arc::new(MockEmbeddingProvider::new()))
///     .build()?;
///
/// let chunks = chunker.chunk("One topic here. Still the same topic.").await?;
/// assert!(!chunks.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct DoublePassChunker {
    embedder: Arc<dyn EmbeddingProvider>,
    segmenter: Arc<dyn SentenceSegmenter>,
    tokenizer: Arc<dyn TokenCounter>,
    config: ChunkerConfig,
}

impl DoublePassChunker {
    /// Create a new builder.
    pub fn builder() -> DoublePassChunkerBuilder {
        DoublePassChunkerBuilder::default()
    }

    /// The validated configuration this chunker runs with.
    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunks `text` into token-bounded, semantically grouped segments.
    ///
    /// Empty or whitespace-only input returns an empty list.
    pub async fn chunk(&self, text: &str) -> Result<Vec<SemanticChunk>, ChunkingError> {
        Ok(self.chunk_with_telemetry(text).await?.outcome.chunks)
    }

    /// Like [`chunk`](Self::chunk), but also returns run statistics and
    /// telemetry.
    pub async fn chunk_with_telemetry(&self, text: &str) -> Result<ChunkResponse, ChunkingError> {
        let started = Instant::now();

        if text.trim().is_empty() {
            return Ok(self.respond(ChunkingOutcome::empty(), None, started));
        }

        let sentences = segmenter::index_sentences(text, &*self.segmenter, &*self.tokenizer);
        tracing::debug!(sentences = sentences.len(), "segmented document");

        if sentences.is_empty() {
            return Ok(self.respond(ChunkingOutcome::empty(), None, started));
        }

        // A lone sentence has nothing to compare against; skip the embedding
        // round trip entirely.
        if sentences.len() == 1 {
            let sentence = sentences.into_iter().next().expect("one sentence");
            let chunk = SemanticChunk::new(
                text[sentence.start..sentence.end].to_string(),
                sentence.token_count,
                vec![sentence],
            );
            let average = chunk.token_count as f32;
            let outcome = ChunkingOutcome {
                chunks: vec![chunk],
                stats: ChunkingStats {
                    total_sentences: 1,
                    first_pass_groups: 1,
                    merged_groups: 1,
                    total_chunks: 1,
                    average_tokens: average,
                },
            };
            return Ok(self.respond(outcome, None, started));
        }

        let cache = EmbeddingCache::build(&*self.embedder, &sentences).await?;

        let seeds = grouping::seed_groups(&sentences, &cache, self.config.initial_sentences);
        let threshold = breakpoints::derive_threshold(&seeds, self.config.strategy);
        tracing::debug!(
            threshold,
            strategy = %self.config.strategy,
            seeds = seeds.len(),
            "derived similarity threshold"
        );

        let first_pass = grouping::merge_adjacent(seeds, threshold);
        tracing::debug!(groups = first_pass.len(), "adjacent-similarity pass complete");

        let merged = merge::merge_skip_window(first_pass.clone(), threshold, self.config.skip_window);
        tracing::debug!(
            groups = merged.len(),
            skip_window = self.config.skip_window,
            "skip-window pass complete"
        );

        let chunks = assembly::assemble(
            text,
            &merged,
            &sentences,
            self.config.chunk_size,
            &*self.tokenizer,
        );
        tracing::debug!(chunks = chunks.len(), "assembly complete");

        let average_tokens = if chunks.is_empty() {
            0.0
        } else {
            chunks.iter().map(|c| c.token_count).sum::<usize>() as f32 / chunks.len() as f32
        };
        let outcome = ChunkingOutcome {
            stats: ChunkingStats {
                total_sentences: sentences.len(),
                first_pass_groups: first_pass.len(),
                merged_groups: merged.len(),
                total_chunks: chunks.len(),
                average_tokens,
            },
            chunks,
        };

        Ok(self.respond(outcome, Some(threshold), started))
    }

    fn respond(
        &self,
        outcome: ChunkingOutcome,
        derived_threshold: Option<f32>,
        started: Instant,
    ) -> ChunkResponse {
        let telemetry = ChunkTelemetry {
            embedder: self.embedder.id().to_string(),
            strategy: self.config.strategy.to_string(),
            derived_threshold,
            duration_ms: started.elapsed().as_millis() as u64,
            chunk_count: outcome.chunks.len(),
            average_tokens: outcome.stats.average_tokens,
        };
        ChunkResponse { outcome, telemetry }
    }
}

impl fmt::Display for DoublePassChunker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DoublePassChunker(chunk_size={}, {}, initial_sentences={}, skip_window={})",
            self.config.chunk_size,
            self.config.strategy,
            self.config.initial_sentences,
            self.config.skip_window
        )
    }
}

impl fmt::Debug for DoublePassChunker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoublePassChunker")
            .field("embedder", &self.embedder.id())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`DoublePassChunker`].
///
/// The embedding provider is required; segmenter and token counter default to
/// [`UnicodeSegmenter`] and the crate's default counter. Configuration is
/// validated here so an invalid setup fails at construction, never at chunk
/// time.
#[derive(Default)]
pub struct DoublePassChunkerBuilder {
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    segmenter: Option<Arc<dyn SentenceSegmenter>>,
    tokenizer: Option<Arc<dyn TokenCounter>>,
    config: Option<ChunkerConfig>,
}

impl DoublePassChunkerBuilder {
    #[must_use]
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(provider);
        self
    }

    #[must_use]
    pub fn segmenter(mut self, segmenter: Arc<dyn SentenceSegmenter>) -> Self {
        self.segmenter = Some(segmenter);
        self
    }

    #[must_use]
    pub fn token_counter(mut self, counter: Arc<dyn TokenCounter>) -> Self {
        self.tokenizer = Some(counter);
        self
    }

    #[must_use]
    pub fn config(mut self, config: ChunkerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<DoublePassChunker, ChunkingError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let embedder = self.embedder.ok_or(ConfigError::MissingEmbedder)?;
        let segmenter = self
            .segmenter
            .unwrap_or_else(|| Arc::new(UnicodeSegmenter));
        let tokenizer = match self.tokenizer {
            Some(counter) => counter,
            None => default_token_counter()?,
        };

        Ok(DoublePassChunker {
            embedder,
            segmenter,
            tokenizer,
            config,
        })
    }
}

fn default_token_counter() -> Result<Arc<dyn TokenCounter>, ChunkingError> {
    #[cfg(feature = "tiktoken")]
    {
        Ok(Arc::new(TiktokenCounter::cl100k()?))
    }
    #[cfg(not(feature = "tiktoken"))]
    {
        Ok(Arc::new(HeuristicTokenCounter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BreakpointStrategy;
    use crate::embeddings::MockEmbeddingProvider;

    fn mock_builder() -> DoublePassChunkerBuilder {
        DoublePassChunker::builder().embedding_provider(Arc::new(MockEmbeddingProvider::new()))
    }

    #[test]
    fn builder_requires_an_embedding_provider() {
        let err = DoublePassChunker::builder().build().unwrap_err();
        assert!(matches!(
            err,
            ChunkingError::Config(ConfigError::MissingEmbedder)
        ));
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let err = mock_builder()
            .config(ChunkerConfig {
                chunk_size: 0,
                ..ChunkerConfig::default()
            })
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ChunkingError::Config(ConfigError::ChunkSizeZero)
        ));
    }

    #[test]
    fn display_names_the_configuration() {
        let chunker = mock_builder()
            .config(ChunkerConfig {
                chunk_size: 512,
                strategy: BreakpointStrategy::Fixed(0.5),
                initial_sentences: 1,
                skip_window: 2,
            })
            .build()
            .unwrap();

        assert_eq!(
            chunker.to_string(),
            "DoublePassChunker(chunk_size=512, similarity_threshold=0.5, initial_sentences=1, skip_window=2)"
        );
    }

    #[tokio::test]
    async fn telemetry_reports_the_embedder_and_strategy() {
        let chunker = mock_builder().build().unwrap();
        let response = chunker
            .chunk_with_telemetry("First topic sentence. Second sentence entirely.")
            .await
            .unwrap();

        assert_eq!(response.telemetry.embedder, "mock");
        assert_eq!(response.telemetry.strategy, "similarity_threshold=0.5");
        assert!(response.telemetry.derived_threshold.is_some());
        assert_eq!(
            response.telemetry.chunk_count,
            response.outcome.chunks.len()
        );
    }
}
