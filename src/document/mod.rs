// file: src/document/mod.rs
// description: document assembly and markdown rendering
// reference: internal module structure

pub mod assembler;
pub mod badges;
pub mod outline;
pub mod render;
pub mod setup;
pub mod tree_diagram;

pub use assembler::{AssemblyInput, DocumentAssembler};
pub use badges::BadgeSelector;
pub use outline::{Outline, verify_section_order};
pub use render::to_markdown;
pub use setup::{SetupGuide, setup_guide};
pub use tree_diagram::render_tree;
