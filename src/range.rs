//! Range resolution for `[RANGE]start|||end[/RANGE]` citations.
//!
//! Pairing rules, in order:
//!
//! 1. Among pairs with `end.pos > start.pos` and a distance within
//!    `max_range_distance`, take the smallest distance.
//! 2. Otherwise, among pairs where the end match finishes after the start
//!    match begins, take the smallest `end.end() - start.pos`.
//! 3. Otherwise highlight the paragraph around whichever anchor resolved.
//!
//! Ties keep the earliest start, then the earliest end.

use crate::highlight::project_range;
use crate::matcher::Matcher;
use crate::model::{HighlightSpan, HighlightStyle, MatchResult, MatchSource, PageText};
use crate::normalize::{normalize, NormalizedText};
use crate::paragraph::paragraph_bounds;
use crate::resolve_options::ResolveOptions;
use crate::trace::{TraceEvent, TraceHook};

/// A chosen start/end anchor pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangePair {
    pub start: MatchResult,
    pub end: MatchResult,
    /// True if the pair came from the relaxed overlap rule
    pub relaxed: bool,
}

impl RangePair {
    /// Normalized start offset of the highlighted span.
    pub fn span_start(&self) -> usize {
        self.start.pos
    }

    /// Normalized end offset (exclusive) of the highlighted span.
    pub fn span_end(&self) -> usize {
        self.end.end()
    }

    /// Distance the pair was selected on.
    pub fn distance(&self) -> usize {
        if self.relaxed {
            self.span_end() - self.start.pos
        } else {
            self.end.pos - self.start.pos
        }
    }
}

/// Selects the tightest start/end pairing, if any.
pub fn pair_anchors(
    starts: &[MatchResult],
    ends: &[MatchResult],
    max_distance: usize,
) -> Option<RangePair> {
    let mut best: Option<(usize, RangePair)> = None;
    for start in starts {
        for end in ends {
            if end.pos <= start.pos {
                continue;
            }
            let distance = end.pos - start.pos;
            if distance > max_distance {
                continue;
            }
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((
                    distance,
                    RangePair {
                        start: *start,
                        end: *end,
                        relaxed: false,
                    },
                ));
            }
        }
    }
    if let Some((_, pair)) = best {
        return Some(pair);
    }

    for start in starts {
        for end in ends {
            if end.end() <= start.pos {
                continue;
            }
            let distance = end.end() - start.pos;
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((
                    distance,
                    RangePair {
                        start: *start,
                        end: *end,
                        relaxed: true,
                    },
                ));
            }
        }
    }
    best.map(|(_, pair)| pair)
}

/// Resolves a two-anchor citation against a page.
///
/// `normalized` must be the normalized form of `page.raw`.
pub fn resolve_range(
    page: &PageText,
    normalized: &NormalizedText,
    start_phrase: &str,
    end_phrase: &str,
    options: &ResolveOptions,
    trace: &TraceHook,
) -> Option<HighlightSpan> {
    let matcher = Matcher::new(options, trace);
    let starts = matcher.find_all(normalized.as_str(), &normalize(start_phrase));
    let ends = matcher.find_all(normalized.as_str(), &normalize(end_phrase));
    tracing::debug!(starts = starts.len(), ends = ends.len(), "range anchors");

    if let Some(pair) = pair_anchors(&starts, &ends, options.max_range_distance) {
        trace.emit(TraceEvent::RangePaired {
            distance: pair.distance(),
            relaxed: pair.relaxed,
        });
        let (raw_start, raw_end) =
            normalized.to_raw_range(pair.span_start(), pair.span_end() - pair.span_start())?;
        return project_range(
            page,
            raw_start,
            raw_end,
            HighlightStyle::Range,
            MatchSource::RangePair,
        );
    }

    let anchor = starts.first().or_else(|| ends.first())?;
    paragraph_fallback(page, normalized, anchor, options, trace)
}

/// Highlights the paragraph enclosing `anchor`.
pub fn paragraph_fallback(
    page: &PageText,
    normalized: &NormalizedText,
    anchor: &MatchResult,
    options: &ResolveOptions,
    trace: &TraceHook,
) -> Option<HighlightSpan> {
    let (raw_start, raw_end) = normalized.to_raw_range(anchor.pos, anchor.len)?;
    let anchor_idx = page.first_overlapping(raw_start, raw_end)?;
    let bounds = paragraph_bounds(page, anchor_idx, options)?;
    trace.emit(TraceEvent::ParagraphFallback {
        start_idx: bounds.start_idx,
        end_idx: bounds.end_idx,
    });
    project_range(
        page,
        bounds.start_offset,
        bounds.end_offset,
        HighlightStyle::Range,
        MatchSource::ParagraphFallback,
    )
}
