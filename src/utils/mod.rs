// file: src/utils/mod.rs
// description: utility functions module exports
// reference: internal module structure

pub mod logging;
pub mod telemetry;
pub mod template;
pub mod text;
pub mod validation;

pub use telemetry::{OperationTimer, PerformanceMetrics};
pub use template::TextTemplate;
pub use text::{flatten_prose, format_sentence, table_cell};
pub use validation::Validator;
