//! Paragraph bounds detection from fragment geometry.
//!
//! A paragraph is grown from an anchor fragment in both directions until a
//! boundary is met. Between an upper and a lower fragment, a boundary is:
//!
//! - a vertical gap larger than `paragraph_gap`, or
//! - a gap larger than `indent_gap` where the upper fragment's left edge is
//!   more than `indent_shift` to the right of the lower one's.
//!
//! The same pair rule is applied walking backward and forward, so every
//! anchor inside a paragraph yields the same bounds.

use crate::model::{ParagraphBounds, PageText, TextFragment};
use crate::resolve_options::ResolveOptions;

/// Returns true if a paragraph boundary separates `upper` from `lower`.
pub fn is_paragraph_break(
    upper: &TextFragment,
    lower: &TextFragment,
    options: &ResolveOptions,
) -> bool {
    let gap = lower.bbox.top - upper.bbox.bottom;
    if gap > options.paragraph_gap {
        return true;
    }
    gap > options.indent_gap && upper.bbox.left - lower.bbox.left > options.indent_shift
}

/// Finds the paragraph enclosing fragment `anchor`.
///
/// Returns `None` if `anchor` is out of range.
pub fn paragraph_bounds(
    page: &PageText,
    anchor: usize,
    options: &ResolveOptions,
) -> Option<ParagraphBounds> {
    let fragments = &page.fragments;
    if anchor >= fragments.len() {
        return None;
    }

    let mut start_idx = anchor;
    while start_idx > 0
        && !is_paragraph_break(&fragments[start_idx - 1], &fragments[start_idx], options)
    {
        start_idx -= 1;
    }

    let mut end_idx = anchor;
    while end_idx + 1 < fragments.len()
        && !is_paragraph_break(&fragments[end_idx], &fragments[end_idx + 1], options)
    {
        end_idx += 1;
    }

    Some(ParagraphBounds {
        start_idx,
        end_idx,
        start_offset: fragments[start_idx].start,
        end_offset: fragments[end_idx].end,
    })
}
