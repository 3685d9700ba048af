//! Leaf renderers for the note preview pipeline.
//!
//! This crate provides:
//! - `math` - LaTeX math to MathML, with a fixed macro table and bounded
//!   auto-recovery for macro redefinition conflicts
//! - `code_pretty` - classed syntax highlighting for fenced code spans
//! - `css` - stylesheet generation for the highlight classes
//!
//! Each renderer is a pure function of its arguments plus fixed,
//! never-mutated tables; failures degrade to values the caller can embed
//! inline rather than aborting a render pass.

pub mod macros;
pub mod math;
pub mod utils;

#[cfg(feature = "syntax-highlighting")]
pub mod code_pretty;

#[cfg(feature = "syntax-css")]
pub mod css;

#[derive(thiserror::Error, Debug, miette::Diagnostic)]
pub enum RenderError {
    #[error("highlighting failed for language {language}: {message}")]
    #[diagnostic(code(inkpad::renderer::highlight))]
    Highlight { language: String, message: String },

    #[error("unknown highlight theme {name}")]
    #[diagnostic(code(inkpad::renderer::theme))]
    UnknownTheme { name: String },

    #[error("stylesheet generation failed: {message}")]
    #[diagnostic(code(inkpad::renderer::stylesheet))]
    Stylesheet { message: String },
}
