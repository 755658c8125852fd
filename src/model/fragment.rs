//! Positioned text fragments.

use serde::{Deserialize, Serialize};

/// Screen-space bounding box of a rendered fragment, in device units.
///
/// `top` grows downwards, as in every text layer we consume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    /// Creates a box from its four edges.
    pub fn new(top: f32, left: f32, right: f32, bottom: f32) -> Self {
        Self {
            top,
            left,
            right,
            bottom,
        }
    }

    /// Width of the box (never negative).
    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    /// Height of the box (never negative).
    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    /// Returns true if every edge is a finite number.
    pub fn is_finite(&self) -> bool {
        self.top.is_finite()
            && self.left.is_finite()
            && self.right.is_finite()
            && self.bottom.is_finite()
    }
}

/// A glyph run as delivered by the rendering backend, before extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedFragment {
    /// Text content of the run
    pub text: String,
    /// Screen rectangle of the run
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

impl RenderedFragment {
    /// Creates a rendered fragment.
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// An addressable fragment of page text.
///
/// `start`/`end` are byte offsets into [`PageText::raw`], not into the
/// normalized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Start offset (inclusive) in the raw page text
    pub start: usize,
    /// End offset (exclusive) in the raw page text
    pub end: usize,
    /// Fragment text as rendered
    pub text: String,
    /// Screen rectangle
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    /// Index of the originating [`RenderedFragment`]
    pub source_index: usize,
}

impl TextFragment {
    /// Returns true if this fragment's `[start, end)` intersects `[start, end)`.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && self.end > start
    }
}

/// The addressable text of one rendered page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    /// Fragments in render order
    pub fragments: Vec<TextFragment>,
    /// Concatenated fragment text, with synthetic separators
    pub raw: String,
}

impl PageText {
    /// Returns true if the page has no addressable text.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty() || self.raw.trim().is_empty()
    }

    /// Returns the number of addressable fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Index of the first fragment overlapping `[start, end)`.
    pub fn first_overlapping(&self, start: usize, end: usize) -> Option<usize> {
        self.fragments.iter().position(|f| f.overlaps(start, end))
    }
}
