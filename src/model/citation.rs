//! Parsed citation forms.

use serde::{Deserialize, Serialize};

/// One `[page: N | text]` segment of a page-qualified citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSegment {
    /// 1-based page number
    pub page: u32,
    /// Cleaned segment text
    pub text: String,
}

impl PageSegment {
    /// Creates a segment.
    pub fn new(page: u32, text: impl Into<String>) -> Self {
        Self {
            page,
            text: text.into(),
        }
    }
}

/// A citation as classified by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Citation {
    /// A phrase to be found verbatim (modulo normalization)
    Literal { text: String },
    /// A start anchor and an end anchor bounding a span
    Range {
        start_phrase: String,
        end_phrase: String,
    },
    /// Page-tagged segments, already filtered to the page being resolved
    PageQualified { segments: Vec<PageSegment> },
}

impl Citation {
    /// Creates a literal citation.
    pub fn literal(text: impl Into<String>) -> Self {
        Citation::Literal { text: text.into() }
    }

    /// Returns true if there is nothing to look for.
    pub fn is_empty(&self) -> bool {
        match self {
            Citation::Literal { text } => text.trim().is_empty(),
            Citation::Range {
                start_phrase,
                end_phrase,
            } => start_phrase.trim().is_empty() && end_phrase.trim().is_empty(),
            Citation::PageQualified { segments } => segments.is_empty(),
        }
    }
}
