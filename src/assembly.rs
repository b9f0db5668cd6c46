//! Final pass: packing groups into token-bounded chunks.
//!
//! Groups are walked in order and accumulated into a pending chunk while the
//! candidate text still fits the budget. Budget checks count the actual
//! candidate substring rather than summing per-sentence counts, so the
//! emitted `token_count` always equals the counter's answer for the chunk
//! text and still respects the bound, whatever tokenizer is plugged in.
//!
//! A group that alone exceeds the budget is split at sentence boundaries. A
//! single sentence that alone exceeds the budget is emitted as its own
//! oversized chunk — truncating mid-sentence would break the offset
//! round-trip guarantee, so the bound is informational for that one chunk.

use crate::grouping::SentenceGroup;
use crate::tokenizer::TokenCounter;
use crate::types::{SemanticChunk, Sentence};

/// Packs merged groups into chunks within `chunk_size` tokens.
pub(crate) fn assemble(
    text: &str,
    groups: &[SentenceGroup],
    sentences: &[Sentence],
    chunk_size: usize,
    counter: &dyn TokenCounter,
) -> Vec<SemanticChunk> {
    let mut chunks: Vec<SemanticChunk> = Vec::new();
    let mut pending: Vec<Sentence> = Vec::new();
    let mut pending_tokens = 0usize;

    for group in groups {
        debug_assert!(!group.is_empty());
        let members: Vec<Sentence> = group
            .sentence_indices
            .iter()
            .map(|&index| sentences[index].clone())
            .collect();

        if !pending.is_empty() {
            let candidate = &text[pending[0].start..members.last().unwrap().end];
            let tokens = counter.count(candidate);
            if tokens <= chunk_size {
                pending.extend(members);
                pending_tokens = tokens;
                continue;
            }
            flush(text, &mut pending, &mut pending_tokens, &mut chunks);
        }

        let span = &text[members[0].start..members.last().unwrap().end];
        let tokens = counter.count(span);
        if tokens <= chunk_size {
            pending = members;
            pending_tokens = tokens;
        } else {
            split_oversized(text, &members, chunk_size, counter, &mut chunks);
        }
    }

    flush(text, &mut pending, &mut pending_tokens, &mut chunks);
    chunks
}

/// Emits the pending sentences as one chunk spanning the exact original
/// substring from the first sentence's start to the last sentence's end.
fn flush(
    text: &str,
    pending: &mut Vec<Sentence>,
    pending_tokens: &mut usize,
    chunks: &mut Vec<SemanticChunk>,
) {
    if pending.is_empty() {
        return;
    }
    let start = pending[0].start;
    let end = pending.last().unwrap().end;
    chunks.push(SemanticChunk::new(
        text[start..end].to_string(),
        *pending_tokens,
        std::mem::take(pending),
    ));
    *pending_tokens = 0;
}

/// Splits a group whose span exceeds the budget at sentence boundaries.
///
/// Pieces are emitted immediately and never coalesced with the following
/// group, keeping chunk boundaries aligned with group boundaries.
fn split_oversized(
    text: &str,
    members: &[Sentence],
    chunk_size: usize,
    counter: &dyn TokenCounter,
    chunks: &mut Vec<SemanticChunk>,
) {
    let mut pending: Vec<Sentence> = Vec::new();
    let mut pending_tokens = 0usize;

    for sentence in members {
        if !pending.is_empty() {
            let candidate = &text[pending[0].start..sentence.end];
            let tokens = counter.count(candidate);
            if tokens <= chunk_size {
                pending.push(sentence.clone());
                pending_tokens = tokens;
                continue;
            }
            flush(text, &mut pending, &mut pending_tokens, chunks);
        }

        if sentence.token_count > chunk_size {
            tracing::warn!(
                sentence = sentence.index,
                tokens = sentence.token_count,
                budget = chunk_size,
                "sentence alone exceeds the chunk budget; emitting oversized chunk"
            );
            chunks.push(SemanticChunk::new(
                sentence.text.clone(),
                sentence.token_count,
                vec![sentence.clone()],
            ));
        } else {
            pending.push(sentence.clone());
            pending_tokens = sentence.token_count;
        }
    }

    flush(text, &mut pending, &mut pending_tokens, chunks);
}
