//! First pass: adjacency grouping over sentence embeddings.
//!
//! Sentences are seeded into windows of `initial_sentences`, then a single
//! left-to-right scan merges each seed into the still-open group while the
//! cosine similarity of their centroids meets the threshold (inclusive).
//! Groups hold sentence indices into the shared sentence arena, not text, so
//! merges are cheap index splices plus a running centroid update.

use crate::breakpoints::cosine_similarity;
use crate::cache::EmbeddingCache;
use crate::types::Sentence;

/// An intermediate cluster of sentences, pre-token-budgeting.
///
/// `sentence_indices` is a strictly increasing, contiguous run of original
/// sentence indices; after each pass the groups partition the full sentence
/// sequence in order — no gaps, no overlap.
#[derive(Debug, Clone)]
pub struct SentenceGroup {
    pub sentence_indices: Vec<usize>,
    pub centroid: Vec<f32>,
}

impl SentenceGroup {
    /// Number of member sentences.
    pub fn len(&self) -> usize {
        self.sentence_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentence_indices.is_empty()
    }

    /// Merges `other` into `self`, appending its sentence run and updating
    /// the centroid as a member-count-weighted mean.
    pub(crate) fn absorb(&mut self, other: SentenceGroup) {
        debug_assert_eq!(self.centroid.len(), other.centroid.len());
        debug_assert!(
            self.sentence_indices.last() < other.sentence_indices.first(),
            "groups must be absorbed in sentence order"
        );

        let own = self.len() as f32;
        let incoming = other.len() as f32;
        let total = own + incoming;
        for (slot, component) in self.centroid.iter_mut().zip(other.centroid.iter()) {
            *slot = (*slot * own + component * incoming) / total;
        }
        self.sentence_indices.extend(other.sentence_indices);
    }
}

/// Seeds one group per `initial_sentences` consecutive sentences, in order.
pub(crate) fn seed_groups(
    sentences: &[Sentence],
    cache: &EmbeddingCache,
    initial_sentences: usize,
) -> Vec<SentenceGroup> {
    debug_assert!(initial_sentences >= 1);
    sentences
        .chunks(initial_sentences)
        .map(|window| {
            let sentence_indices: Vec<usize> = window.iter().map(|s| s.index).collect();
            let centroid = cache.centroid(&sentence_indices);
            SentenceGroup {
                sentence_indices,
                centroid,
            }
        })
        .collect()
}

/// Single left-to-right pass merging adjacent seeds whose centroid similarity
/// meets the threshold. Similarity exactly equal to the threshold merges.
pub(crate) fn merge_adjacent(seeds: Vec<SentenceGroup>, threshold: f32) -> Vec<SentenceGroup> {
    let mut groups: Vec<SentenceGroup> = Vec::with_capacity(seeds.len());
    for seed in seeds {
        match groups.last_mut() {
            Some(open) if cosine_similarity(&open.centroid, &seed.centroid) >= threshold => {
                open.absorb(seed);
            }
            _ => groups.push(seed),
        }
    }
    groups
}

#[cfg(test)]
pub(crate) fn assert_partition(groups: &[SentenceGroup], sentence_count: usize) {
    let mut expected = 0usize;
    for group in groups {
        for &index in &group.sentence_indices {
            assert_eq!(index, expected, "groups must cover sentences in order");
            expected += 1;
        }
    }
    assert_eq!(expected, sentence_count);
}
