//! Highlight projection and the view-side highlight layer.

use crate::model::{HighlightSpan, HighlightStyle, MatchSource, PageText, ResolutionResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Projects a raw `[start, end)` range onto the fragments overlapping it.
///
/// Returns `None` when no fragment overlaps the range.
pub fn project_range(
    page: &PageText,
    start: usize,
    end: usize,
    style: HighlightStyle,
    source: MatchSource,
) -> Option<HighlightSpan> {
    if end <= start {
        return None;
    }
    let fragment_indices: Vec<usize> = page
        .fragments
        .iter()
        .enumerate()
        .filter(|(_, fragment)| fragment.overlaps(start, end))
        .map(|(index, _)| index)
        .collect();
    span_from_indices(page, fragment_indices, Some((start, end)), style, source)
}

/// Builds a span from an explicit fragment selection.
///
/// Offsets default to the extent of the selected fragments.
pub fn project_fragments(
    page: &PageText,
    fragment_indices: Vec<usize>,
    style: HighlightStyle,
    source: MatchSource,
) -> Option<HighlightSpan> {
    span_from_indices(page, fragment_indices, None, style, source)
}

fn span_from_indices(
    page: &PageText,
    mut fragment_indices: Vec<usize>,
    range: Option<(usize, usize)>,
    style: HighlightStyle,
    source: MatchSource,
) -> Option<HighlightSpan> {
    fragment_indices.retain(|&index| index < page.fragments.len());
    fragment_indices.sort_unstable();
    fragment_indices.dedup();

    let first = *fragment_indices.first()?;
    let last = *fragment_indices.last()?;
    let (start_offset, end_offset) =
        range.unwrap_or((page.fragments[first].start, page.fragments[last].end));
    let source_indices = fragment_indices
        .iter()
        .map(|&index| page.fragments[index].source_index)
        .collect();

    Some(HighlightSpan {
        fragment_indices,
        source_indices,
        start_offset,
        end_offset,
        style,
        source,
    })
}

/// Stateful adapter holding the marks currently shown by a view.
///
/// Applying a result always replaces the previous marks; resolutions never
/// accumulate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HighlightLayer {
    page: Option<u32>,
    marks: BTreeMap<usize, HighlightStyle>,
    scroll_target: Option<usize>,
}

impl HighlightLayer {
    /// Creates an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears previous marks, then marks every fragment of `result`.
    ///
    /// Where spans of both styles cover a fragment, the exact style wins.
    pub fn apply(&mut self, result: &ResolutionResult) {
        self.clear();
        self.page = Some(result.page);
        for span in &result.highlights {
            for &index in &span.fragment_indices {
                self.marks
                    .entry(index)
                    .and_modify(|style| {
                        if span.style == HighlightStyle::Exact {
                            *style = HighlightStyle::Exact;
                        }
                    })
                    .or_insert(span.style);
            }
        }
        self.scroll_target = result.scroll_target;
    }

    /// Removes all marks.
    pub fn clear(&mut self) {
        self.page = None;
        self.marks.clear();
        self.scroll_target = None;
    }

    /// Style of fragment `index`, if it is marked.
    pub fn style_of(&self, index: usize) -> Option<HighlightStyle> {
        self.marks.get(&index).copied()
    }

    /// Marked fragment indices in render order.
    pub fn marked(&self) -> impl Iterator<Item = usize> + '_ {
        self.marks.keys().copied()
    }

    /// Page the current marks belong to.
    pub fn page(&self) -> Option<u32> {
        self.page
    }

    /// Fragment the view should scroll to.
    pub fn scroll_target(&self) -> Option<usize> {
        self.scroll_target
    }

    /// Returns true if nothing is marked.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_page_text;
    use crate::model::{BoundingBox, MatchStage, RenderedFragment};
    use crate::ResolveOptions;

    fn sample_page() -> PageText {
        let lines = ["Patients with", "diabetes", "mellitus", "require annual"];
        let rendered: Vec<RenderedFragment> = lines
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let top = i as f32 * 12.0;
                RenderedFragment::new(*text, BoundingBox::new(top, 0.0, 120.0, top + 10.0))
            })
            .collect();
        extract_page_text(&rendered, &ResolveOptions::default())
    }

    #[test]
    fn test_project_range_overlap() {
        let page = sample_page();
        // "diabetes mellitus" spans raw 14..31
        let span = project_range(
            &page,
            14,
            31,
            HighlightStyle::Exact,
            MatchSource::Stage(MatchStage::Exact),
        )
        .unwrap();
        assert_eq!(span.fragment_indices, vec![1, 2]);
        assert_eq!(span.source_indices, vec![1, 2]);
        assert_eq!((span.start_offset, span.end_offset), (14, 31));
    }

    #[test]
    fn test_project_range_partial_fragment() {
        let page = sample_page();
        let span =
            project_range(&page, 10, 16, HighlightStyle::Range, MatchSource::RangePair).unwrap();
        assert_eq!(span.fragment_indices, vec![0, 1]);
    }

    #[test]
    fn test_project_range_in_gap_or_empty() {
        let page = sample_page();
        // offset 13 is the synthetic space between fragments 0 and 1
        let style = HighlightStyle::Exact;
        assert!(project_range(&page, 13, 14, style, MatchSource::RangePair).is_none());
        assert!(project_range(&page, 20, 20, style, MatchSource::RangePair).is_none());
    }

    #[test]
    fn test_project_fragments_offsets() {
        let page = sample_page();
        let span = project_fragments(
            &page,
            vec![3, 1, 1, 9],
            HighlightStyle::Exact,
            MatchSource::TokenFallback,
        )
        .unwrap();
        assert_eq!(span.fragment_indices, vec![1, 3]);
        assert_eq!(span.start_offset, page.fragments[1].start);
        assert_eq!(span.end_offset, page.fragments[3].end);
    }

    #[test]
    fn test_layer_replaces_previous_marks() {
        let page = sample_page();
        let first = ResolutionResult::from_spans(
            1,
            vec![
                project_range(&page, 0, 8, HighlightStyle::Exact, MatchSource::RangePair).unwrap(),
            ],
        );
        let second = ResolutionResult::from_spans(
            1,
            vec![
                project_range(&page, 32, 40, HighlightStyle::Range, MatchSource::RangePair)
                    .unwrap(),
            ],
        );

        let mut layer = HighlightLayer::new();
        layer.apply(&first);
        assert_eq!(layer.marked().collect::<Vec<_>>(), vec![0]);
        assert_eq!(layer.scroll_target(), Some(0));

        layer.apply(&second);
        assert_eq!(layer.marked().collect::<Vec<_>>(), vec![3]);
        assert_eq!(layer.style_of(3), Some(HighlightStyle::Range));
        assert_eq!(layer.style_of(0), None);
        assert_eq!(layer.scroll_target(), Some(3));

        layer.apply(&ResolutionResult::empty(1));
        assert!(layer.is_empty());
        assert_eq!(layer.scroll_target(), None);
    }

    #[test]
    fn test_layer_exact_style_wins() {
        let page = sample_page();
        let result = ResolutionResult::from_spans(
            2,
            vec![
                project_range(&page, 0, 31, HighlightStyle::Range, MatchSource::RangePair)
                    .unwrap(),
                project_range(&page, 14, 22, HighlightStyle::Exact, MatchSource::RangePair)
                    .unwrap(),
            ],
        );
        let mut layer = HighlightLayer::new();
        layer.apply(&result);
        assert_eq!(layer.page(), Some(2));
        assert_eq!(layer.style_of(0), Some(HighlightStyle::Range));
        assert_eq!(layer.style_of(1), Some(HighlightStyle::Exact));
    }
}
