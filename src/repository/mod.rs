// file: src/repository/mod.rs
// description: Repository operations module exports
// reference: Internal module structure

pub mod classifier;
pub mod manifest;
pub mod notebook;
pub mod scanner;
pub mod source;
pub mod sync;

pub use classifier::{Classification, FileClassifier, LanguageStat, language_for_path};
pub use scanner::RepositoryIngestor;
pub use source::RepositoryReference;
pub use sync::{RepositorySync, WorkingCopy};
