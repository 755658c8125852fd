//! The resolution pipeline.
//!
//! `ResolutionRequest -> ResolutionResult` with no state kept between calls:
//! parse the citation, extract the page text, normalize it, locate the
//! anchors and project them onto fragments.

use crate::citation::parse_citation;
use crate::error::Result;
use crate::extract::extract_page_text;
use crate::highlight::{project_fragments, project_range};
use crate::matcher::Matcher;
use crate::model::{
    Citation, HighlightSpan, HighlightStyle, MatchSource, PageText, RenderedFragment,
    ResolutionRequest, ResolutionResult,
};
use crate::normalize::{normalize, NormalizedText};
use crate::provider::FragmentProvider;
use crate::range::resolve_range;
use crate::resolve_options::ResolveOptions;
use crate::trace::{TraceEvent, TraceHook};
use rayon::prelude::*;

/// Builder for configuring and running resolutions.
///
/// # Example
///
/// ```
/// use citeanchor::model::{BoundingBox, RenderedFragment};
/// use citeanchor::Resolver;
///
/// let fragments = vec![
///     RenderedFragment::new("Patients with diabetes", BoundingBox::new(0.0, 0.0, 180.0, 12.0)),
///     RenderedFragment::new(
///         "require annual screening.",
///         BoundingBox::new(14.0, 0.0, 200.0, 26.0),
///     ),
/// ];
///
/// let result = Resolver::new().resolve_fragments(1, "annual screening", &fragments);
/// assert_eq!(result.fragment_indices(), vec![1]);
/// assert_eq!(result.scroll_target, Some(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    options: ResolveOptions,
    trace: TraceHook,
}

impl Resolver {
    /// Creates a resolver with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Installs a trace callback.
    pub fn with_trace(mut self, trace: TraceHook) -> Self {
        self.trace = trace;
        self
    }

    /// Restricts matching to the exact stages.
    pub fn strict(mut self) -> Self {
        self.options = ResolveOptions::strict();
        self
    }

    /// Disables parallel batch resolution.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Current options.
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolves one request.
    pub fn resolve(&self, request: &ResolutionRequest) -> ResolutionResult {
        self.resolve_fragments(request.page, &request.citation, &request.fragments)
    }

    /// Resolves `citation` against the rendered fragments of `page`.
    pub fn resolve_fragments(
        &self,
        page: u32,
        citation: &str,
        fragments: &[RenderedFragment],
    ) -> ResolutionResult {
        let parsed = parse_citation(citation, page);
        if parsed.is_empty() {
            tracing::debug!(page, "no citation text for page");
            return ResolutionResult::empty(page);
        }

        let text = extract_page_text(fragments, &self.options);
        if text.is_empty() {
            tracing::debug!(page, "page has no addressable text");
            return ResolutionResult::empty(page);
        }
        let normalized = NormalizedText::new(&text.raw);

        let spans: Vec<HighlightSpan> = match &parsed {
            Citation::Literal { text: phrase } => self
                .resolve_phrase(&text, &normalized, phrase)
                .into_iter()
                .collect(),
            Citation::Range {
                start_phrase,
                end_phrase,
            } => resolve_range(
                &text,
                &normalized,
                start_phrase,
                end_phrase,
                &self.options,
                &self.trace,
            )
            .into_iter()
            .collect(),
            Citation::PageQualified { segments } => segments
                .iter()
                .filter_map(|segment| self.resolve_phrase(&text, &normalized, &segment.text))
                .collect(),
        };

        if spans.is_empty() {
            self.trace.emit(TraceEvent::NoMatch);
        }
        ResolutionResult::from_spans(page, spans)
    }

    /// Fetches the fragments of `page` from `provider`, then resolves.
    pub fn resolve_page<P: FragmentProvider + ?Sized>(
        &self,
        provider: &P,
        page: u32,
        citation: &str,
    ) -> Result<ResolutionResult> {
        let fragments = provider.page_fragments(page)?;
        Ok(self.resolve_fragments(page, citation, &fragments))
    }

    /// Resolves independent requests, in parallel unless configured
    /// [`sequential`](Self::sequential). Results keep the request order.
    pub fn resolve_batch(&self, requests: &[ResolutionRequest]) -> Vec<ResolutionResult> {
        if self.options.parallel {
            requests.par_iter().map(|request| self.resolve(request)).collect()
        } else {
            requests.iter().map(|request| self.resolve(request)).collect()
        }
    }

    /// Single-phrase resolution: matcher chain, then token fallback.
    fn resolve_phrase(
        &self,
        page: &PageText,
        normalized: &NormalizedText,
        phrase: &str,
    ) -> Option<HighlightSpan> {
        let phrase = normalize(phrase);
        if phrase.is_empty() {
            return None;
        }

        let matcher = Matcher::new(&self.options, &self.trace);
        let projected = matcher.find_best(normalized.as_str(), &phrase).and_then(|found| {
            let (start, end) = normalized.to_raw_range(found.pos, found.len)?;
            project_range(page, start, end, HighlightStyle::Exact, MatchSource::Stage(found.stage))
        });
        if projected.is_some() || !self.options.token_fallback {
            return projected;
        }

        let hits = matcher.token_fallback(page, &phrase);
        project_fragments(page, hits, HighlightStyle::Exact, MatchSource::TokenFallback)
    }
}

/// Resolves one request with the given options.
pub fn resolve(request: &ResolutionRequest, options: &ResolveOptions) -> ResolutionResult {
    Resolver::new().with_options(options.clone()).resolve(request)
}

/// Resolves independent requests with the given options.
pub fn resolve_batch(
    requests: &[ResolutionRequest],
    options: &ResolveOptions,
) -> Vec<ResolutionResult> {
    Resolver::new().with_options(options.clone()).resolve_batch(requests)
}
