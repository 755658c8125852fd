//! Resolution requests and highlight output.

use super::{MatchStage, RenderedFragment};
use serde::{Deserialize, Serialize};

/// Visual style the view layer applies to a highlighted fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightStyle {
    /// A single located phrase
    Exact,
    /// A start/end range or an inferred paragraph
    Range,
}

/// How a highlight span was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "stage", rename_all = "snake_case")]
pub enum MatchSource {
    /// A matcher chain stage located the phrase
    Stage(MatchStage),
    /// A start and an end anchor were paired
    RangePair,
    /// Only an anchor resolved; its paragraph is highlighted
    ParagraphFallback,
    /// Fragments sharing enough tokens with the phrase
    TokenFallback,
}

/// One contiguous (or token-scattered) highlight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightSpan {
    /// Indices into the page's fragment list, in render order
    pub fragment_indices: Vec<usize>,
    /// Renderer indices of the same fragments
    pub source_indices: Vec<usize>,
    /// Raw start offset (inclusive)
    pub start_offset: usize,
    /// Raw end offset (exclusive)
    pub end_offset: usize,
    pub style: HighlightStyle,
    pub source: MatchSource,
}

impl HighlightSpan {
    /// First fragment of the span in render order.
    pub fn first_fragment(&self) -> Option<usize> {
        self.fragment_indices.first().copied()
    }
}

/// Input to a single resolution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionRequest {
    /// 1-based page number being resolved
    pub page: u32,
    /// Citation string as produced upstream
    pub citation: String,
    /// Rendered fragments of that page, in render order
    pub fragments: Vec<RenderedFragment>,
}

impl ResolutionRequest {
    /// Creates a request.
    pub fn new(page: u32, citation: impl Into<String>, fragments: Vec<RenderedFragment>) -> Self {
        Self {
            page,
            citation: citation.into(),
            fragments,
        }
    }
}

/// Output of a resolution run. Empty when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Page the result belongs to
    pub page: u32,
    /// Highlight spans, in the order they were resolved
    pub highlights: Vec<HighlightSpan>,
    /// Fragment the view should scroll to
    pub scroll_target: Option<usize>,
}

impl ResolutionResult {
    /// Creates an empty result for `page`.
    pub fn empty(page: u32) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }

    /// Builds a result from spans; the scroll target is the earliest fragment.
    pub fn from_spans(page: u32, highlights: Vec<HighlightSpan>) -> Self {
        let scroll_target = highlights.iter().filter_map(|s| s.first_fragment()).min();
        Self {
            page,
            highlights,
            scroll_target,
        }
    }

    /// Returns true if nothing is highlighted.
    pub fn is_empty(&self) -> bool {
        self.highlights.iter().all(|s| s.fragment_indices.is_empty())
    }

    /// Sorted, de-duplicated union of highlighted fragment indices.
    pub fn fragment_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .highlights
            .iter()
            .flat_map(|s| s.fragment_indices.iter().copied())
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}
