//! Similarity math and threshold derivation.
//!
//! The cutoff between "same topic, keep merging" and "topic shift, close the
//! group" is either a fixed cosine value or derived from the document itself:
//! the configured percentile of the adjacent seed-group similarity
//! distribution. Derivation is fully deterministic — `total_cmp` ordering,
//! linear interpolation between ranks.

use crate::config::BreakpointStrategy;
use crate::grouping::SentenceGroup;

/// Cosine similarity `dot(a, b) / (|a| * |b|)`.
///
/// A zero-magnitude operand yields 0.0 rather than NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Resolves the effective similarity threshold for a document.
///
/// With fewer than two seed groups there is no adjacent-similarity
/// distribution to take a percentile of; 1.0 is returned, which is vacuous
/// since a lone group has nothing to merge with.
pub(crate) fn derive_threshold(seeds: &[SentenceGroup], strategy: BreakpointStrategy) -> f32 {
    match strategy {
        BreakpointStrategy::Fixed(threshold) => threshold,
        BreakpointStrategy::Percentile(percentile) => {
            if seeds.len() < 2 {
                return 1.0;
            }
            let mut similarities: Vec<f32> = seeds
                .windows(2)
                .map(|pair| cosine_similarity(&pair[0].centroid, &pair[1].centroid))
                .collect();
            similarities.sort_by(|a, b| a.total_cmp(b));
            percentile_of_sorted(&similarities, percentile)
        }
    }
}

/// Linear-interpolated percentile of an ascending-sorted slice.
fn percentile_of_sorted(sorted: &[f32], percentile: f32) -> f32 {
    debug_assert!(!sorted.is_empty());
    let rank = (percentile as f64 / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = (rank - lower as f64) as f32;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(centroid: Vec<f32>) -> SentenceGroup {
        SentenceGroup {
            sentence_indices: vec![0],
            centroid,
        }
    }

    #[test]
    fn identical_vectors_have_similarity_one() {
        let v = vec![1.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&v, &v), 1.0);
    }

    #[test]
    fn orthogonal_vectors_have_similarity_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn zero_vector_does_not_produce_nan() {
        let sim = cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]);
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn fixed_strategy_passes_through() {
        let seeds = vec![group(vec![1.0, 0.0]), group(vec![0.0, 1.0])];
        assert_eq!(
            derive_threshold(&seeds, BreakpointStrategy::Fixed(0.42)),
            0.42
        );
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        // Adjacent similarities: sim(e0,e0)=1.0, sim(e0,e1)=0.0, sim(e1,e1)=1.0
        // Sorted: [0.0, 1.0, 1.0]; 50th percentile = middle value.
        let e0 = vec![1.0, 0.0];
        let e1 = vec![0.0, 1.0];
        let seeds = vec![
            group(e0.clone()),
            group(e0.clone()),
            group(e1.clone()),
            group(e1),
        ];
        let threshold = derive_threshold(&seeds, BreakpointStrategy::Percentile(50.0));
        assert_eq!(threshold, 1.0);

        // 25th percentile falls halfway between 0.0 and 1.0.
        let threshold = derive_threshold(&seeds, BreakpointStrategy::Percentile(25.0));
        assert!((threshold - 0.5).abs() < 1e-6);
    }

    #[test]
    fn percentile_with_single_seed_is_vacuous() {
        let seeds = vec![group(vec![1.0, 0.0])];
        assert_eq!(
            derive_threshold(&seeds, BreakpointStrategy::Percentile(50.0)),
            1.0
        );
    }

    #[test]
    fn percentile_derivation_is_deterministic() {
        let seeds: Vec<SentenceGroup> = (0..8)
            .map(|i| {
                let angle = i as f32 * 0.35;
                group(vec![angle.cos(), angle.sin()])
            })
            .collect();

        let first = derive_threshold(&seeds, BreakpointStrategy::Percentile(60.0));
        let second = derive_threshold(&seeds, BreakpointStrategy::Percentile(60.0));
        assert_eq!(first, second);
    }
}
