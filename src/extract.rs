//! Fragment extraction.
//!
//! Turns the renderer's glyph runs into addressable [`TextFragment`]s with
//! cumulative offsets into one concatenated page string.

use crate::model::{PageText, RenderedFragment, TextFragment};
use crate::resolve_options::ResolveOptions;

/// Builds the addressable text of a page from rendered fragments.
///
/// Fragments whose box is below `min_fragment_extent` in both dimensions are
/// rendering artifacts and take no offset space, as are fragments with no
/// text or non-finite geometry. A synthetic space is inserted between
/// fragments unless the previous one already ends in whitespace.
///
/// # Example
///
/// ```
/// use citeanchor::extract::extract_page_text;
/// use citeanchor::model::{BoundingBox, RenderedFragment};
/// use citeanchor::ResolveOptions;
///
/// let fragments = vec![
///     RenderedFragment::new("Annual", BoundingBox::new(0.0, 0.0, 60.0, 12.0)),
///     RenderedFragment::new("screening", BoundingBox::new(0.0, 64.0, 150.0, 12.0)),
/// ];
/// let page = extract_page_text(&fragments, &ResolveOptions::default());
/// assert_eq!(page.raw, "Annual screening");
/// assert_eq!(page.fragments[1].start, 7);
/// ```
pub fn extract_page_text(rendered: &[RenderedFragment], options: &ResolveOptions) -> PageText {
    let mut raw = String::new();
    let mut fragments: Vec<TextFragment> = Vec::with_capacity(rendered.len());

    for (source_index, fragment) in rendered.iter().enumerate() {
        if !is_addressable(fragment, options) {
            continue;
        }

        if let Some(previous) = fragments.last() {
            if !previous.text.ends_with(char::is_whitespace) {
                raw.push(' ');
            }
        }

        let start = raw.len();
        raw.push_str(&fragment.text);
        fragments.push(TextFragment {
            start,
            end: raw.len(),
            text: fragment.text.clone(),
            bbox: fragment.bbox,
            source_index,
        });
    }

    tracing::debug!(
        rendered = rendered.len(),
        addressable = fragments.len(),
        bytes = raw.len(),
        "extracted page text"
    );

    PageText { fragments, raw }
}

/// Check if a rendered fragment should take part in the page text
fn is_addressable(fragment: &RenderedFragment, options: &ResolveOptions) -> bool {
    if fragment.text.is_empty() || !fragment.bbox.is_finite() {
        return false;
    }
    let bbox = &fragment.bbox;
    !(bbox.width() < options.min_fragment_extent && bbox.height() < options.min_fragment_extent)
}
