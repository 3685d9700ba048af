//! The in-memory document tree read by the preview writer.
//!
//! The editing component owns and mutates this tree; a serialization pass
//! treats it as immutable. Formatting attributes are a fixed-shape record
//! with one optional field per attribute - runs with identical formatting
//! are not merged.

use smol_str::SmolStr;

/// One contiguous span of text sharing one set of formatting attributes.
///
/// `text` may be empty only transiently while editing, never when handed to
/// the preview writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italics: bool,
    pub underline: bool,
    pub font: Option<SmolStr>,
    pub size: Option<SmolStr>,
    pub color: Option<SmolStr>,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_italics(mut self) -> Self {
        self.italics = true;
        self
    }

    pub fn with_underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn with_font(mut self, font: impl Into<SmolStr>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<SmolStr>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<SmolStr>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A paragraph-level node. Paragraph is the only kind the editor currently
/// produces; the enum leaves room for more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<TextRun>),
}

impl Block {
    /// The ordered runs of this block. Every block has at least one run
    /// while a document is being serialized.
    pub fn runs(&self) -> &[TextRun] {
        match self {
            Block::Paragraph(runs) => runs,
        }
    }
}

/// An ordered sequence of blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_attributes() {
        let run = TextRun::new("x")
            .with_bold()
            .with_font("Arial")
            .with_color("#ff0000");
        assert!(run.bold);
        assert!(!run.italics);
        assert_eq!(run.font.as_deref(), Some("Arial"));
        assert_eq!(run.color.as_deref(), Some("#ff0000"));
        assert_eq!(run.size, None);
    }

    #[test]
    fn block_exposes_runs_in_order() {
        let block = Block::Paragraph(vec![TextRun::new("a"), TextRun::new("b")]);
        let texts: Vec<_> = block.runs().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["a", "b"]);
    }

    #[test]
    fn empty_document() {
        assert!(Document::new().is_empty());
        assert!(!Document::from_blocks(vec![Block::Paragraph(vec![TextRun::new("x")])]).is_empty());
    }
}
