//! Citation parsing.
//!
//! Upstream rule generation emits three citation shapes, recognized in this
//! priority order:
//!
//! 1. `[RANGE]<start>|||<end>[/RANGE]`
//! 2. `[page: N | text], [page: M | text2]` (page-qualified segments)
//! 3. anything else, taken verbatim as a literal phrase
//!
//! An input matching both 1 and 2 is a range.

use crate::model::{Citation, PageSegment};
use regex::Regex;
use std::sync::LazyLock;

static RE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[RANGE\](.*?)\|\|\|(.*?)\[/RANGE\]").unwrap());

static RE_PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[\s*page\s*:\s*(\d+)\s*\|").unwrap());

/// Segments shorter than this (in characters, after cleanup) are dropped.
pub const MIN_SEGMENT_CHARS: usize = 3;

/// Parses `input` for resolution on `page`.
///
/// Page-qualified segments for other pages are discarded, so the result may
/// be empty (see [`Citation::is_empty`]), in which case resolution is a no-op.
///
/// # Example
///
/// ```
/// use citeanchor::citation::parse_citation;
/// use citeanchor::model::Citation;
///
/// let citation = parse_citation("[RANGE]Patients with|||screening.[/RANGE]", 1);
/// assert_eq!(
///     citation,
///     Citation::Range {
///         start_phrase: "Patients with".into(),
///         end_phrase: "screening.".into(),
///     }
/// );
/// ```
pub fn parse_citation(input: &str, page: u32) -> Citation {
    if let Some(caps) = RE_RANGE.captures(input) {
        return Citation::Range {
            start_phrase: caps[1].trim().to_string(),
            end_phrase: caps[2].trim().to_string(),
        };
    }

    if RE_PAGE_MARKER.is_match(input) {
        let segments: Vec<PageSegment> = parse_segments(input)
            .into_iter()
            .filter(|segment| segment.page == page)
            .collect();
        tracing::debug!(page, retained = segments.len(), "page-qualified citation");
        return Citation::PageQualified { segments };
    }

    Citation::literal(input)
}

/// Splits a page-qualified citation into all of its segments, for every page.
///
/// Text before the first `[page: N |` marker has no page and is ignored.
pub fn parse_segments(input: &str) -> Vec<PageSegment> {
    let markers: Vec<(usize, usize, Option<u32>)> = RE_PAGE_MARKER
        .captures_iter(input)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some((whole.start(), whole.end(), caps[1].parse().ok()))
        })
        .collect();

    let mut segments = Vec::with_capacity(markers.len());
    for (i, &(_, text_start, page)) in markers.iter().enumerate() {
        let text_end = markers.get(i + 1).map_or(input.len(), |next| next.0);
        let Some(page) = page else {
            continue;
        };
        let text = clean_segment_text(&input[text_start..text_end]);
        if text.chars().count() < MIN_SEGMENT_CHARS {
            continue;
        }
        segments.push(PageSegment::new(page, text));
    }
    segments
}

/// Strips grammar punctuation and stray quotes from a segment body
fn clean_segment_text(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '|' | '"' | '\u{201C}' | '\u{201D}'))
        .collect();
    let trimmed = stripped.trim().trim_end_matches(',').trim();
    trimmed
        .trim_matches(|c| matches!(c, '\'' | '\u{2018}' | '\u{2019}'))
        .trim()
        .to_string()
}
