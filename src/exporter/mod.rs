// file: src/exporter/mod.rs
// description: output writer module exports
// reference: internal module structure

pub mod writer;

pub use writer::{DocumentWriter, OutputFormat};
