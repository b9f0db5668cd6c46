//! Second pass: skip-window merging.
//!
//! The first pass only ever compares a group to its immediate predecessor, so
//! a topic that resumes after a short digression (A, B, A′) stays split. This
//! pass repairs that with a bounded lookback: each group is compared against
//! up to `skip_window` of the most recent finalized groups, nearest first,
//! and on the first match it merges into that group together with everything
//! in between — intervening groups are absorbed too, so the result is always
//! a single contiguous run and the partition invariant survives.
//!
//! Cost is O(groups × skip_window) similarity computations, not quadratic in
//! sentence count.

use crate::breakpoints::cosine_similarity;
use crate::grouping::SentenceGroup;

/// Runs the skip-window pass. A `skip_window` of zero is a no-op.
pub(crate) fn merge_skip_window(
    groups: Vec<SentenceGroup>,
    threshold: f32,
    skip_window: usize,
) -> Vec<SentenceGroup> {
    if skip_window == 0 {
        return groups;
    }

    let mut merged: Vec<SentenceGroup> = Vec::with_capacity(groups.len());
    for group in groups {
        let lookback = merged.len().min(skip_window);
        let target = (1..=lookback).find_map(|back| {
            let candidate = &merged[merged.len() - back];
            (cosine_similarity(&candidate.centroid, &group.centroid) >= threshold)
                .then(|| merged.len() - back)
        });

        match target {
            Some(position) => {
                let mut run = merged.split_off(position);
                let mut host = run.remove(0);
                for intervening in run {
                    host.absorb(intervening);
                }
                host.absorb(group);
                merged.push(host);
            }
            None => merged.push(group),
        }
    }
    merged
}
