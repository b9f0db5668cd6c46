//! Sentence boundary detection seam and sentence indexing.
//!
//! Segmentation itself is an external collaborator behind
//! [`SentenceSegmenter`]; the default implementation rides UAX#29 sentence
//! bounds. The indexer layered on top assigns stable indices and token
//! counts, producing the [`Sentence`] arena the rest of the pipeline works
//! over.

use unicode_segmentation::UnicodeSegmentation;

use crate::tokenizer::TokenCounter;
use crate::types::Sentence;

/// One segmented sentence with its byte offsets into the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceSpan {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Splits text into ordered sentence spans.
///
/// Implementations must return spans that partition the input: contiguous,
/// non-overlapping, in original order, with `text == input[start..end]`.
/// That partition is what makes chunk offsets reconstruct the document
/// byte for byte.
pub trait SentenceSegmenter: Send + Sync {
    fn split(&self, text: &str) -> Vec<SentenceSpan>;
}

/// Default segmenter over Unicode (UAX#29) sentence boundaries.
///
/// Whitespace-only segments are folded into the neighboring sentence so every
/// produced span carries actual content while the partition stays gap-free.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSegmenter;

impl SentenceSegmenter for UnicodeSegmenter {
    fn split(&self, text: &str) -> Vec<SentenceSpan> {
        let mut spans: Vec<SentenceSpan> = Vec::new();
        let mut cursor = 0usize;
        // Offset where a pending whitespace-only prefix began, waiting for
        // the next real sentence to claim it.
        let mut pending_start: Option<usize> = None;

        for segment in text.split_sentence_bounds() {
            let start = cursor;
            let end = cursor + segment.len();
            cursor = end;

            if segment.trim().is_empty() {
                if let Some(last) = spans.last_mut() {
                    last.text.push_str(segment);
                    last.end = end;
                } else if pending_start.is_none() {
                    pending_start = Some(start);
                }
                continue;
            }

            let start = pending_start.take().unwrap_or(start);
            spans.push(SentenceSpan {
                text: text[start..end].to_string(),
                start,
                end,
            });
        }

        spans
    }
}

/// Wraps the segmenter output with sequential indices and token counts.
pub fn index_sentences(
    text: &str,
    segmenter: &dyn SentenceSegmenter,
    counter: &dyn TokenCounter,
) -> Vec<Sentence> {
    segmenter
        .split(text)
        .into_iter()
        .enumerate()
        .map(|(index, span)| {
            debug_assert_eq!(&text[span.start..span.end], span.text);
            let token_count = counter.count(&span.text);
            Sentence {
                index,
                text: span.text,
                start: span.start,
                end: span.end,
                token_count,
            }
        })
        .collect()
}
