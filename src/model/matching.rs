//! Match candidates and paragraph bounds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Matcher chain stages, ordered from strictest to most permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    /// Literal substring search
    Exact,
    /// Substring search tolerating ligature glyphs
    LigatureAware,
    /// Ligature-aware search on a prefix of the phrase
    Shortened,
    /// Whitespace-tolerant search for words split across fragments
    Flexible,
    /// Ordered significant words within a bounded window
    Keyword,
    /// Prefix and suffix of one distinguishing word
    WordFragment,
}

impl MatchStage {
    /// All stages in the order the chain tries them.
    pub const ALL: [MatchStage; 6] = [
        MatchStage::Exact,
        MatchStage::LigatureAware,
        MatchStage::Shortened,
        MatchStage::Flexible,
        MatchStage::Keyword,
        MatchStage::WordFragment,
    ];

    /// Stages whose results are exact substring matches of the full phrase.
    pub fn is_exact(self) -> bool {
        matches!(self, MatchStage::Exact | MatchStage::LigatureAware)
    }

    /// Short name used in logs and trace events.
    pub fn name(self) -> &'static str {
        match self {
            MatchStage::Exact => "exact",
            MatchStage::LigatureAware => "ligature_aware",
            MatchStage::Shortened => "shortened",
            MatchStage::Flexible => "flexible",
            MatchStage::Keyword => "keyword",
            MatchStage::WordFragment => "word_fragment",
        }
    }
}

impl fmt::Display for MatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A located occurrence of a phrase in normalized page text.
///
/// `pos` and `len` are byte offsets into the normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub pos: usize,
    pub len: usize,
    pub exact: bool,
    /// Stage that produced this candidate
    pub stage: MatchStage,
}

impl MatchResult {
    /// Creates a match produced by `stage`.
    pub fn new(pos: usize, len: usize, stage: MatchStage) -> Self {
        Self {
            pos,
            len,
            exact: stage.is_exact(),
            stage,
        }
    }

    /// End offset (exclusive) in normalized text.
    pub fn end(&self) -> usize {
        self.pos + self.len
    }
}

/// Fragment span of a visually contiguous block of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphBounds {
    /// First fragment index (inclusive)
    pub start_idx: usize,
    /// Last fragment index (inclusive)
    pub end_idx: usize,
    /// Raw offset where the first fragment starts
    pub start_offset: usize,
    /// Raw offset where the last fragment ends
    pub end_offset: usize,
}

impl ParagraphBounds {
    /// Number of fragments covered.
    pub fn fragment_count(&self) -> usize {
        self.end_idx - self.start_idx + 1
    }
}
