// file: src/llm/tokens.rs
// description: cl100k token counting and deterministic head-biased truncation
// reference: https://docs.rs/tiktoken-rs

use lazy_static::lazy_static;
use tiktoken_rs::CoreBPE;
use tracing::warn;

/// Ratio used only when the cl100k tables cannot be loaded.
pub const FALLBACK_CHARS_PER_TOKEN: usize = 4;

lazy_static! {
    static ref CL100K: Option<CoreBPE> = match tiktoken_rs::cl100k_base() {
        Ok(bpe) => Some(bpe),
        Err(e) => {
            warn!("cl100k_base unavailable, estimating tokens from characters: {}", e);
            None
        }
    };
}

pub fn estimate_tokens(text: &str) -> usize {
    match CL100K.as_ref() {
        Some(bpe) => bpe.encode_ordinary(text).len(),
        None => text.chars().count().div_ceil(FALLBACK_CHARS_PER_TOKEN),
    }
}

/// Byte length of the longest prefix of `text` that ends on a character boundary and
/// encodes to at most `max_tokens` tokens.
pub fn fitting_prefix_len(text: &str, max_tokens: usize) -> usize {
    if estimate_tokens(text) <= max_tokens {
        return text.len();
    }

    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();

    // boundaries[lo] always fits; boundaries[hi] never does.
    let mut lo = 0;
    let mut hi = boundaries.len() - 1;
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if estimate_tokens(&text[..boundaries[mid]]) <= max_tokens {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    boundaries[lo]
}

/// Keeps the head of `text` within `max_tokens`. Returns the kept text and whether
/// anything was cut.
pub fn truncate_to_tokens(text: &str, max_tokens: usize) -> (&str, bool) {
    let cut = fitting_prefix_len(text, max_tokens);
    (&text[..cut], cut < text.len())
}
