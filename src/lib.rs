//! # citeanchor
//!
//! Resolves machine-generated citations back onto the rendered text of a
//! document page and reports which fragments to highlight.
//!
//! Extracted text rarely matches the rendered text byte for byte: words are
//! split across glyph runs, ligatures collapse letter pairs, spacing is
//! inserted or lost. The engine normalizes both sides and runs a cascade of
//! increasingly permissive matchers before projecting the match back onto
//! fragment indices.
//!
//! ## Citation Forms
//!
//! - **Literal**: any plain phrase
//! - **Range**: `[RANGE]<start phrase>|||<end phrase>[/RANGE]`
//! - **Page-qualified**: `[page: 3 | text], [page: 5 | more text]`
//!
//! ## Quick Start
//!
//! ```
//! use citeanchor::model::{BoundingBox, RenderedFragment};
//! use citeanchor::{resolve, ResolutionRequest, ResolveOptions};
//!
//! let lines = ["Patients with", "diabetes", "mellitus", "require annual", "screening."];
//! let fragments: Vec<RenderedFragment> = lines
//!     .iter()
//!     .enumerate()
//!     .map(|(i, text)| {
//!         let top = i as f32 * 12.0;
//!         RenderedFragment::new(*text, BoundingBox::new(top, 0.0, 150.0, top + 10.0))
//!     })
//!     .collect();
//!
//! let request = ResolutionRequest::new(1, "diabetes mellitus", fragments);
//! let result = resolve(&request, &ResolveOptions::default());
//!
//! assert_eq!(result.fragment_indices(), vec![1, 2]);
//! assert_eq!(result.scroll_target, Some(1));
//! ```
//!
//! ## Features
//!
//! - `async`: Debounced resolution with Tokio

pub mod citation;
pub mod error;
pub mod extract;
pub mod highlight;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod paragraph;
pub mod provider;
pub mod range;
pub mod resolve;
pub mod resolve_options;
pub mod trace;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use citation::parse_citation;
pub use error::{Error, Result};
pub use highlight::HighlightLayer;
pub use model::{
    BoundingBox, Citation, HighlightSpan, HighlightStyle, MatchResult, MatchSource, MatchStage,
    RenderedFragment, ResolutionRequest, ResolutionResult,
};
pub use normalize::normalize;
pub use provider::{FragmentProvider, StaticPages};
pub use resolve::{resolve, resolve_batch, Resolver};
pub use resolve_options::ResolveOptions;
pub use trace::{TraceEvent, TraceHook};

/// Resolves `citation` against the rendered fragments of `page` with
/// default options.
///
/// # Example
///
/// ```
/// use citeanchor::model::{BoundingBox, RenderedFragment};
///
/// let bbox = BoundingBox::new(0.0, 0.0, 160.0, 12.0);
/// let fragments = vec![RenderedFragment::new("Annual screening", bbox)];
/// let result = citeanchor::locate(1, "totally unrelated gibberish zzz", &fragments);
/// assert!(result.is_empty());
/// ```
pub fn locate(page: u32, citation: &str, fragments: &[RenderedFragment]) -> ResolutionResult {
    Resolver::new().resolve_fragments(page, citation, fragments)
}

/// Loads pages from a JSON file and resolves `citation` on `page`.
pub fn locate_in_file(
    path: impl AsRef<std::path::Path>,
    page: u32,
    citation: &str,
) -> Result<ResolutionResult> {
    let pages = StaticPages::from_path(path)?;
    Resolver::new().resolve_page(&pages, page, citation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn lines(texts: &[&str]) -> Vec<RenderedFragment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let top = i as f32 * 12.0;
                RenderedFragment::new(*text, BoundingBox::new(top, 0.0, 150.0, top + 10.0))
            })
            .collect()
    }

    fn sentence_page() -> Vec<RenderedFragment> {
        lines(&["Patients with", "diabetes", "mellitus", "require annual", "screening."])
    }

    fn first_source(result: &ResolutionResult) -> MatchSource {
        result.highlights[0].source
    }

    #[test]
    fn test_exact_literal() {
        let result = locate(1, "diabetes mellitus", &sentence_page());

        assert_eq!(result.highlights.len(), 1);
        let span = &result.highlights[0];
        let raw = "Patients with diabetes mellitus require annual screening.";
        assert_eq!(span.start_offset, raw.find("diabetes").unwrap());
        assert_eq!(span.end_offset - span.start_offset, 17);
        assert_eq!(span.fragment_indices, vec![1, 2]);
        assert_eq!(span.style, HighlightStyle::Exact);
        assert_eq!(span.source, MatchSource::Stage(MatchStage::Exact));
        assert_eq!(result.scroll_target, Some(1));
    }

    #[test]
    fn test_word_split_across_fragments() {
        let fragments = lines(&[
            "Patients with ",
            "diabe",
            "tes mell",
            "itus",
            " require annual screening.",
        ]);
        let result = locate(1, "diabetes mellitus", &fragments);

        assert_eq!(result.fragment_indices(), vec![1, 2, 3]);
        assert_eq!(first_source(&result), MatchSource::Stage(MatchStage::Flexible));
        assert!(!result.is_empty());
    }

    #[test]
    fn test_range_citation() {
        let citation = "[RANGE]Patients with diabetes|||annual screening.[/RANGE]";
        let result = locate(1, citation, &sentence_page());

        assert_eq!(result.highlights.len(), 1);
        let span = &result.highlights[0];
        let raw = "Patients with diabetes mellitus require annual screening.";
        assert_eq!(span.start_offset, 0);
        assert_eq!(span.end_offset, raw.len());
        assert!(raw[..span.end_offset].ends_with("annual screening."));
        assert_eq!(span.fragment_indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(span.style, HighlightStyle::Range);
        assert_eq!(span.source, MatchSource::RangePair);
    }

    #[test]
    fn test_range_missing_end_falls_back_to_paragraph() {
        let mut fragments = sentence_page();
        fragments.push(RenderedFragment::new(
            "Unrelated footer text",
            BoundingBox::new(120.0, 0.0, 150.0, 130.0),
        ));
        let citation = "[RANGE]Patients with diabetes|||XYZ never appears[/RANGE]";
        let result = locate(1, citation, &fragments);

        assert_eq!(result.fragment_indices(), vec![0, 1, 2, 3, 4]);
        assert_eq!(first_source(&result), MatchSource::ParagraphFallback);
        assert_eq!(result.highlights[0].style, HighlightStyle::Range);
    }

    #[test]
    fn test_unlocatable_citation_is_empty() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let trace = TraceHook::new(move |event| sink.lock().unwrap().push(*event));
        let resolver = Resolver::new().with_trace(trace);

        let result =
            resolver.resolve_fragments(1, "totally unrelated gibberish zzz", &sentence_page());

        assert!(result.is_empty());
        assert_eq!(result.scroll_target, None);
        assert_eq!(events.lock().unwrap().last(), Some(&TraceEvent::NoMatch));
    }

    #[test]
    fn test_page_qualified_segments() {
        let fragments = lines(&[
            "The first part of the rule applies.",
            "Unrelated line",
            "The second part follows.",
        ]);
        let citation = r#"[page: 3 | "first part"], [page: 3 | "second part"]"#;

        let on_page = locate(3, citation, &fragments);
        assert_eq!(on_page.highlights.len(), 2);
        assert_eq!(on_page.fragment_indices(), vec![0, 2]);
        assert_eq!(on_page.scroll_target, Some(0));

        let off_page = locate(5, citation, &fragments);
        assert!(off_page.is_empty());
        assert_eq!(off_page.page, 5);
    }

    #[test]
    fn test_exact_stage_has_priority() {
        // The split form comes first but the exact occurrence must win
        let fragments = lines(&["diabe tes here", "and diabetes there"]);
        let result = locate(1, "diabetes", &fragments);

        assert_eq!(result.fragment_indices(), vec![1]);
        assert_eq!(first_source(&result), MatchSource::Stage(MatchStage::Exact));
    }

    #[test]
    fn test_ligature_glyph_on_page() {
        let fragments = lines(&["Annual \u{FB01}nancial review", "of the clinic"]);
        let result = locate(1, "financial review", &fragments);

        assert_eq!(result.fragment_indices(), vec![0]);
        assert!(result.highlights[0].source == MatchSource::Stage(MatchStage::Exact));
    }

    #[test]
    fn test_curly_quotes_and_case_fold() {
        let fragments = lines(&["The \u{201C}Care Plan\u{201D} is reviewed"]);
        let result = locate(1, "\"care plan\"", &fragments);
        assert_eq!(result.fragment_indices(), vec![0]);
    }

    #[test]
    fn test_range_never_inverted() {
        // End phrase only occurs before the start phrase
        let fragments = lines(&[
            "closing words first",
            "opening words later",
            "closing words again",
        ]);
        let citation = "[RANGE]opening words|||closing words[/RANGE]";
        let result = locate(1, citation, &fragments);

        let span = &result.highlights[0];
        assert!(span.end_offset >= span.start_offset);
        assert_eq!(span.fragment_indices, vec![1, 2]);
    }

    #[test]
    fn test_paragraph_gap_respected() {
        // A(top=0,bottom=10), B(top=30,bottom=40): gap 20
        let fragments = vec![
            RenderedFragment::new("alpha beginning here", BoundingBox::new(0.0, 0.0, 150.0, 10.0)),
            RenderedFragment::new("beta continues there", BoundingBox::new(30.0, 0.0, 150.0, 40.0)),
        ];
        let result = locate(1, "[RANGE]alpha beginning|||qqq absent[/RANGE]", &fragments);

        assert_eq!(result.fragment_indices(), vec![0]);
        assert_eq!(first_source(&result), MatchSource::ParagraphFallback);
    }

    #[test]
    fn test_token_fallback_highlights_fragments() {
        let fragments = lines(&["Scope of the care plan", "Signature block"]);
        let result = locate(1, "plan, care & scope!!", &fragments);
        assert_eq!(result.fragment_indices(), vec![0]);

        let strict = Resolver::new()
            .strict()
            .resolve_fragments(1, "plan, care & scope!!", &fragments);
        assert!(strict.is_empty());
    }

    #[test]
    fn test_artifacts_are_not_highlighted() {
        let mut fragments = sentence_page();
        let artifact = RenderedFragment::new("diabetes", BoundingBox::new(0.0, 0.0, 2.0, 2.0));
        fragments.insert(1, artifact);
        let result = locate(1, "diabetes", &fragments);

        assert_eq!(result.highlights[0].source_indices, vec![2]);
        assert_eq!(result.fragment_indices(), vec![1]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(locate(1, "", &sentence_page()).is_empty());
        assert!(locate(1, "   ", &sentence_page()).is_empty());
        assert!(locate(1, "diabetes", &[]).is_empty());
    }

    #[test]
    fn test_normalization_idempotent() {
        for text in [
            "  Ｅｆﬁcient\u{00AD}  \u{201C}Care\u{201D}  ",
            "e\u{0301}cole",
            "ﬀ ﬂ ﬃ",
        ] {
            let once = normalize(text);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_batch_keeps_order() {
        let requests = vec![
            ResolutionRequest::new(1, "screening", sentence_page()),
            ResolutionRequest::new(2, "nothing like this zzz", sentence_page()),
            ResolutionRequest::new(3, "Patients", sentence_page()),
        ];

        let parallel = resolve_batch(&requests, &ResolveOptions::default());
        let sequential = resolve_batch(&requests, &ResolveOptions::default().sequential());
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.iter().map(|r| r.page).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(parallel[0].fragment_indices(), vec![4]);
        assert!(parallel[1].is_empty());
        assert_eq!(parallel[2].scroll_target, Some(0));
    }

    #[test]
    fn test_resolve_page_through_provider() {
        let pages = StaticPages::new().with_page(2, sentence_page());
        let resolver = Resolver::new();

        let result = resolver.resolve_page(&pages, 2, "require annual").unwrap();
        assert_eq!(result.fragment_indices(), vec![3]);
        assert!(matches!(resolver.resolve_page(&pages, 9, "x"), Err(Error::PageNotFound(9))));
    }

    #[test]
    fn test_layer_applies_result() {
        let result = locate(1, "diabetes mellitus", &sentence_page());
        let mut layer = HighlightLayer::new();
        layer.apply(&result);
        assert_eq!(layer.marked().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(layer.style_of(1), Some(HighlightStyle::Exact));
    }
}
