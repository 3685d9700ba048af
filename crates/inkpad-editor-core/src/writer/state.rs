//! Grouped scanner state for the preview writer.

use smol_str::SmolStr;

/// Which sub-language an open block is accumulating across run boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMode {
    /// `$ ... $`
    InlineMath,
    /// `$$ ... $$`
    DisplayMath,
    /// ``` fenced code ```
    Code,
}

impl BlockMode {
    /// The delimiter that closes a block of this mode. While a block is
    /// open, no other delimiter is recognized.
    pub fn close_delimiter(self) -> &'static str {
        match self {
            BlockMode::InlineMath => "$",
            BlockMode::DisplayMath => "$$",
            BlockMode::Code => "```",
        }
    }

    /// Annotation text emitted when a block never closes.
    pub fn unclosed_message(self) -> &'static str {
        match self {
            BlockMode::InlineMath => "Unclosed inline math",
            BlockMode::DisplayMath => "Unclosed display math",
            BlockMode::Code => "Unclosed code block",
        }
    }
}

/// Open-block accumulation state. Reset at every block boundary: an open
/// delimiter carries from run to run, never from block to block.
#[derive(Debug, Clone, Default)]
pub struct BlockContext {
    pub mode: Option<BlockMode>,
    /// Raw source accumulated since the opening delimiter. Math spans keep
    /// their delimiters; code spans never contain fences.
    pub buffer: String,
}

impl BlockContext {
    pub fn is_active(&self) -> bool {
        self.mode.is_some()
    }

    pub fn open(&mut self, mode: BlockMode, seed: &str) {
        self.mode = Some(mode);
        self.buffer.clear();
        self.buffer.push_str(seed);
    }

    pub fn push(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Per-call writer configuration.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Language token every fenced code span is highlighted as.
    pub code_language: SmolStr,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            code_language: SmolStr::new_static("js"),
        }
    }
}
