//! PreviewWriter - HTML serialization of the document tree.
//!
//! The writer is a streaming scanner, not a per-run templating pass: a `$`,
//! `$$`, or ``` opened in one run may close several runs later, after the
//! formatting marks have changed. Open-block state lives in one
//! `BlockContext` carried across the traversal worklist, and is reset at
//! every block boundary.
//!
//! The pass is total: renderer failures and unterminated constructs degrade
//! to inline red annotations, never to an error or a panic. Raw text outside
//! recognized constructs passes through unescaped; the caller injects the
//! result into the preview surface as-is.

mod marks;
mod scan;
mod state;


pub use state::{BlockContext, BlockMode, WriterConfig};

use std::collections::VecDeque;
use std::sync::LazyLock;

use syntect::parsing::SyntaxSet;

use inkpad_renderer::code_pretty;
use inkpad_renderer::math::{self, MathResult};
use inkpad_renderer::utils::escape_html;

use crate::document::{Document, TextRun};
use marks::wrap_marks;
use scan::{Marker, find_marker};

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Serialize a document to preview HTML with the default configuration.
pub fn serialize(document: &Document) -> String {
    PreviewWriter::new(document).run()
}

/// Serialize with an explicit configuration.
pub fn serialize_with_config(document: &Document, config: &WriterConfig) -> String {
    PreviewWriter::new(document)
        .with_config(config.clone())
        .run()
}

/// One unit of traversal work. The explicit worklist flattens the
/// block/child structure while the cross-run scan state stays in one place.
enum WorkItem<'a> {
    Run { run: &'a TextRun, is_last: bool },
    EndBlock,
}

/// Streaming serializer over one document. Single use: construct, `run()`.
pub struct PreviewWriter<'a> {
    document: &'a Document,
    config: WriterConfig,
    out: String,
    block: BlockContext,
}

impl<'a> PreviewWriter<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            config: WriterConfig::default(),
            out: String::new(),
            block: BlockContext::default(),
        }
    }

    pub fn with_config(mut self, config: WriterConfig) -> Self {
        self.config = config;
        self
    }

    /// Consume the writer and produce the document's HTML.
    pub fn run(mut self) -> String {
        let mut work: VecDeque<WorkItem<'_>> = VecDeque::new();
        for block in &self.document.blocks {
            let runs = block.runs();
            for (i, run) in runs.iter().enumerate() {
                work.push_back(WorkItem::Run {
                    run,
                    is_last: i + 1 == runs.len(),
                });
            }
            work.push_back(WorkItem::EndBlock);
        }

        while let Some(item) = work.pop_front() {
            match item {
                WorkItem::Run { run, is_last } => self.process_run(run, is_last),
                WorkItem::EndBlock => self.finish_block(),
            }
        }
        self.out
    }

    fn process_run(&mut self, run: &TextRun, is_last: bool) {
        let text = run.text.as_str();
        let rest: &str = if let Some(mode) = self.block.mode {
            // Inside an open block only the mode's own close delimiter is
            // recognized; every other delimiter is ordinary text.
            let close = mode.close_delimiter();
            match text.find(close) {
                Some(at) => {
                    let end = at + close.len();
                    self.block.push(&text[..end]);
                    self.render_open_block();
                    &text[end..]
                }
                None => {
                    self.block.push(text);
                    if mode == BlockMode::Code {
                        // Run boundaries lose their line breaks; restore one.
                        self.block.push("\n");
                    }
                    return;
                }
            }
        } else {
            text
        };
        self.process_span(rest, run, is_last);
    }

    /// Per-run processing outside any open block: render complete delimiter
    /// pairs in place, then check the tail for an opener with no close.
    fn process_span(&mut self, text: &str, run: &TextRun, is_last: bool) {
        let mut span = String::new();
        let mut cursor = 0; // everything before this is already in `span`
        let mut search = 0; // markers before this were consumed or literal

        while let Some((at, marker)) = find_marker(text, search) {
            let token = marker.token();
            let body_start = at + token.len();
            match text[body_start..].find(token) {
                Some(rel) => {
                    let body = &text[body_start..body_start + rel];
                    let end = body_start + rel + token.len();
                    if marker == Marker::DoubleDollar && body.is_empty() {
                        // Empty math body stays literal.
                        span.push_str(&text[cursor..end]);
                    } else {
                        span.push_str(&text[cursor..at]);
                        match marker {
                            Marker::DoubleDollar => push_math(&mut span, body, true),
                            Marker::Dollar => push_math(&mut span, body, false),
                            Marker::Fence => {
                                push_code(&mut span, &self.config.code_language, body)
                            }
                        }
                    }
                    cursor = end;
                    search = end;
                }
                // No close in this run; adjacent dollars in particular stay
                // literal unless the tail scan below reclaims them.
                None => search = body_start,
            }
        }

        // Open detection on the tail after the last in-place substitution.
        let tail = &text[cursor..];
        match find_marker(tail, 0) {
            Some((at, marker)) => {
                span.push_str(&tail[..at]);
                let mode = marker.mode();
                tracing::trace!(target: "inkpad::writer", ?mode, "block opened");
                if mode == BlockMode::Code {
                    self.block.open(mode, &tail[at + 3..]);
                    self.block.push("\n");
                } else {
                    self.block.open(mode, &tail[at..]);
                }
            }
            None => span.push_str(tail),
        }

        if is_last && !self.block.is_active() {
            // Block-level line separation.
            span.push_str("<br>");
        }
        if !span.is_empty() {
            self.out.push_str(&wrap_marks(run, span));
        }
    }

    /// Render and emit the accumulated open-block span, then reset.
    fn render_open_block(&mut self) {
        let Some(mode) = self.block.mode else { return };
        let buffer = std::mem::take(&mut self.block.buffer);
        self.block.clear();
        match mode {
            BlockMode::InlineMath | BlockMode::DisplayMath => {
                push_math_delimited(&mut self.out, &buffer);
            }
            BlockMode::Code => {
                let source = buffer.strip_suffix("```").unwrap_or(&buffer);
                push_code(&mut self.out, &self.config.code_language, source);
            }
        }
    }

    /// Block boundary. Open state never crosses blocks; anything still open
    /// here is an unterminated construct, surfaced as buffered text plus a
    /// visible annotation rather than dropped.
    fn finish_block(&mut self) {
        if let Some(mode) = self.block.mode {
            let buffer = std::mem::take(&mut self.block.buffer);
            self.block.clear();
            self.out.push_str(&buffer);
            push_error_span(&mut self.out, mode.unclosed_message());
        }
    }
}

fn push_math(dst: &mut String, body: &str, display: bool) {
    match math::render_math(body, display) {
        MathResult::Html(html) => dst.push_str(&html),
        MathResult::Error(message) => {
            tracing::warn!(target: "inkpad::writer", %message, "math render failed");
            push_error_span(dst, &message);
        }
    }
}

fn push_math_delimited(dst: &mut String, source: &str) {
    match math::render_math_delimited(source) {
        MathResult::Html(html) => dst.push_str(&html),
        MathResult::Error(message) => {
            tracing::warn!(target: "inkpad::writer", %message, "math render failed");
            push_error_span(dst, &message);
        }
    }
}

fn push_code(dst: &mut String, language: &str, source: &str) {
    let mut highlighted = String::new();
    match code_pretty::highlight(&SYNTAX_SET, Some(language), source, &mut highlighted) {
        Ok(()) => dst.push_str(&highlighted),
        Err(error) => {
            tracing::warn!(target: "inkpad::writer", %error, "highlight failed");
            // Plain fallback keeps the render pass alive.
            dst.push_str("<pre><code class=\"language-");
            escape_html(dst, language);
            dst.push_str("\">");
            escape_html(dst, source);
            dst.push_str("</code></pre>");
        }
    }
}

fn push_error_span(dst: &mut String, message: &str) {
    dst.push_str("<span style=\"color:#ff6666\">");
    escape_html(dst, message);
    dst.push_str("</span>");
}
