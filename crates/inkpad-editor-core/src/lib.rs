//! Document model and preview serialization, free of UI dependencies.
//!
//! This crate provides:
//! - `Document` / `Block` / `TextRun` - the formatted-text tree the editing
//!   surface owns and mutates; serialization only reads it
//! - `PreviewWriter` - HTML serialization with delimiter state carried
//!   across run boundaries, so math and code spans may start in one run and
//!   close several runs later

pub mod document;
pub mod writer;

pub use document::{Block, Document, TextRun};
pub use smol_str::SmolStr;
pub use writer::{PreviewWriter, WriterConfig, serialize, serialize_with_config};
