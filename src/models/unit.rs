// file: src/models/unit.rs
// description: addressable units of summarization work
// reference: internal data structures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Stable identity of a unit: file path plus byte offset of its window.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId {
    pub path: PathBuf,
    pub offset: usize,
}

impl UnitId {
    pub fn new(path: impl Into<PathBuf>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.path.display(), self.offset)
    }
}

#[derive(Debug, Clone)]
pub struct SummarizationUnit {
    pub id: UnitId,
    pub content: Vec<u8>,
    /// Total byte length of the file this unit was cut from.
    pub file_size: usize,
    pub language: Option<String>,
}

impl SummarizationUnit {
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn end(&self) -> usize {
        self.id.offset + self.content.len()
    }

    /// True when the file was split into several windows.
    pub fn is_window(&self) -> bool {
        self.content.len() < self.file_size
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}
