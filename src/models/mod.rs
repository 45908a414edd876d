// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod dependency;
pub mod document;
pub mod summary;
pub mod tree;
pub mod unit;

pub use dependency::{DependencyRecord, Ecosystem};
pub use document::{
    AssembledDocument, Badge, DocumentBuilder, DocumentSection, Fragment, SectionKey,
};
pub use summary::{FailureKind, SummaryMap, SummaryResult, UnitState, UnitTracker};
pub use tree::{DirectoryNode, FileNode, Node, RepositoryTree, SkipReason};
pub use unit::{SummarizationUnit, UnitId};
