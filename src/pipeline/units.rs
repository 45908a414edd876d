// file: src/pipeline/units.rs
// description: partitioning of ingested files into summarization units
// reference: internal data structures

use crate::llm::fitting_prefix_len;
use crate::models::{FileNode, RepositoryTree, SummarizationUnit, UnitId};
use tracing::debug;

/// Bounds on a single unit: bytes, and tokens of the content sent in the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLimits {
    pub max_bytes: usize,
    pub max_tokens: usize,
}

impl WindowLimits {
    pub fn new(max_bytes: usize, max_tokens: usize) -> Self {
        Self {
            max_bytes: max_bytes.max(1),
            max_tokens: max_tokens.max(1),
        }
    }
}

/// Splits every summarizable file into non-overlapping windows within `limits`, in
/// depth-first file order. Windows end on UTF-8 character boundaries where possible, so a
/// text window never needs truncating before it is sent.
pub fn partition(tree: &RepositoryTree, limits: WindowLimits) -> Vec<SummarizationUnit> {
    let units: Vec<SummarizationUnit> = tree
        .files()
        .into_iter()
        .filter(|file| file.is_summarizable())
        .flat_map(|file| split_file(file, limits))
        .collect();

    debug!(
        "Partitioned {} files into {} units",
        tree.files().iter().filter(|f| f.is_summarizable()).count(),
        units.len()
    );
    units
}

pub fn split_file(file: &FileNode, limits: WindowLimits) -> Vec<SummarizationUnit> {
    let content = &file.content;
    let file_size = content.len();
    let unit = |start: usize, end: usize| SummarizationUnit {
        id: UnitId::new(file.path.clone(), start),
        content: content[start..end].to_vec(),
        file_size,
        language: file.language.clone(),
    };

    if file_size == 0 {
        return vec![unit(0, 0)];
    }

    let mut units = Vec::with_capacity(file_size.div_ceil(limits.max_bytes));
    let mut start = 0;
    while start < file_size {
        let end = window_end(content, start, limits);
        units.push(unit(start, end));
        start = end;
    }
    units
}

fn window_end(content: &[u8], start: usize, limits: WindowLimits) -> usize {
    let end = byte_window_end(content, start, limits.max_bytes);
    match std::str::from_utf8(&content[start..end]) {
        Ok(text) => {
            let fit = fitting_prefix_len(text, limits.max_tokens);
            if fit == 0 {
                // A single character over budget still has to go somewhere.
                start + text.chars().next().map_or(end - start, char::len_utf8)
            } else {
                start + fit
            }
        }
        // Not valid UTF-8: the prompt is decoded lossily and truncated if needed.
        Err(_) => end,
    }
}

fn byte_window_end(content: &[u8], start: usize, max_bytes: usize) -> usize {
    let limit = (start + max_bytes).min(content.len());
    if limit == content.len() {
        return limit;
    }

    let mut end = limit;
    while end > start && is_continuation(content[end]) {
        end -= 1;
    }
    if end == start { limit } else { end }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}
