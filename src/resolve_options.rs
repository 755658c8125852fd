//! Tunable thresholds for citation resolution.
//!
//! The geometric and fuzzy-window defaults were tuned against PDF text
//! layers; a different rendering backend may need recalibration.

use crate::model::MatchStage;

/// Fragments smaller than this in both dimensions are rendering artifacts.
pub const DEFAULT_MIN_FRAGMENT_EXTENT: f32 = 10.0;
/// Vertical gap that always starts a new paragraph.
pub const DEFAULT_PARAGRAPH_GAP: f32 = 15.0;
/// Vertical gap that starts a new paragraph when combined with an indent shift.
pub const DEFAULT_INDENT_GAP: f32 = 5.0;
/// Left-edge shift that signals a new block.
pub const DEFAULT_INDENT_SHIFT: f32 = 30.0;
/// Prefix length used by the shortened exact stage.
pub const DEFAULT_SHORTENED_PHRASE_CHARS: usize = 25;
/// Maximum gap between consecutive keywords.
pub const DEFAULT_KEYWORD_WINDOW: usize = 100;
/// Maximum gap between a word's prefix and suffix.
pub const DEFAULT_WORD_FRAGMENT_WINDOW: usize = 10;
/// Minimum token length for the token fallback.
pub const DEFAULT_MIN_TOKEN_LEN: usize = 3;
/// Maximum start-to-end distance when pairing range anchors.
pub const DEFAULT_MAX_RANGE_DISTANCE: usize = 10_000;

/// Options controlling the matcher chain and the geometric heuristics.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOptions {
    /// Width and height below which a fragment is discarded.
    pub min_fragment_extent: f32,

    /// Gap (device units) above which a paragraph always breaks.
    pub paragraph_gap: f32,

    /// Gap above which an indent shift breaks a paragraph.
    pub indent_gap: f32,

    /// Left-edge shift that counts as an indentation change.
    pub indent_shift: f32,

    /// Characters kept by the shortened exact stage.
    pub shortened_phrase_chars: usize,

    /// Characters allowed between consecutive keywords.
    pub keyword_window: usize,

    /// Preferred minimum keyword length.
    pub min_keyword_len: usize,

    /// Minimum keyword length used when too few words qualify.
    pub relaxed_keyword_len: usize,

    /// Fewest keywords the keyword stage will search for.
    pub min_keywords: usize,

    /// Most keywords the keyword stage will search for.
    pub max_keywords: usize,

    /// Minimum length of a distinguishing word for the word-fragment stage.
    pub word_fragment_min_len: usize,

    /// Leading characters of the distinguishing word.
    pub word_fragment_prefix: usize,

    /// Trailing characters of the distinguishing word.
    pub word_fragment_suffix: usize,

    /// Characters allowed between prefix and suffix.
    pub word_fragment_window: usize,

    /// Minimum token length for the token fallback.
    pub min_token_len: usize,

    /// Maximum distance between paired range anchors.
    pub max_range_distance: usize,

    /// Last matcher stage the chain may try.
    pub max_stage: MatchStage,

    /// Whether single-phrase resolution may fall back to token overlap.
    pub token_fallback: bool,

    /// Whether batch resolution runs requests in parallel.
    pub parallel: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            min_fragment_extent: DEFAULT_MIN_FRAGMENT_EXTENT,
            paragraph_gap: DEFAULT_PARAGRAPH_GAP,
            indent_gap: DEFAULT_INDENT_GAP,
            indent_shift: DEFAULT_INDENT_SHIFT,
            shortened_phrase_chars: DEFAULT_SHORTENED_PHRASE_CHARS,
            keyword_window: DEFAULT_KEYWORD_WINDOW,
            min_keyword_len: 4,
            relaxed_keyword_len: 3,
            min_keywords: 2,
            max_keywords: 4,
            word_fragment_min_len: 6,
            word_fragment_prefix: 4,
            word_fragment_suffix: 5,
            word_fragment_window: DEFAULT_WORD_FRAGMENT_WINDOW,
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
            max_range_distance: DEFAULT_MAX_RANGE_DISTANCE,
            max_stage: MatchStage::WordFragment,
            token_fallback: true,
            parallel: true,
        }
    }
}

impl ResolveOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only exact stages, no token fallback.
    pub fn strict() -> Self {
        Self {
            max_stage: MatchStage::LigatureAware,
            token_fallback: false,
            ..Self::default()
        }
    }

    /// Wider fuzzy windows for badly extracted documents.
    pub fn lenient() -> Self {
        Self {
            keyword_window: 200,
            word_fragment_window: 20,
            shortened_phrase_chars: 15,
            ..Self::default()
        }
    }

    /// Sets the last matcher stage the chain may try.
    pub fn with_max_stage(mut self, stage: MatchStage) -> Self {
        self.max_stage = stage;
        self
    }

    /// Sets the paragraph break gap.
    pub fn with_paragraph_gap(mut self, gap: f32) -> Self {
        self.paragraph_gap = gap;
        self
    }

    /// Sets the indentation shift threshold.
    pub fn with_indent_shift(mut self, shift: f32) -> Self {
        self.indent_shift = shift;
        self
    }

    /// Sets the keyword window.
    pub fn with_keyword_window(mut self, window: usize) -> Self {
        self.keyword_window = window;
        self
    }

    /// Sets the maximum range anchor distance.
    pub fn with_max_range_distance(mut self, distance: usize) -> Self {
        self.max_range_distance = distance;
        self
    }

    /// Disables the token-overlap fallback.
    pub fn without_token_fallback(mut self) -> Self {
        self.token_fallback = false;
        self
    }

    /// Disables parallel batch resolution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Returns true if the chain may try `stage`.
    pub fn allows(&self, stage: MatchStage) -> bool {
        stage <= self.max_stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let default = ResolveOptions::default();
        assert!(default.allows(MatchStage::WordFragment));
        assert!(default.token_fallback);

        let strict = ResolveOptions::strict();
        assert!(strict.allows(MatchStage::LigatureAware));
        assert!(!strict.allows(MatchStage::Shortened));
        assert!(!strict.token_fallback);

        let lenient = ResolveOptions::lenient();
        assert!(lenient.keyword_window > default.keyword_window);
    }

    #[test]
    fn test_builder_chain() {
        let options = ResolveOptions::new()
            .with_paragraph_gap(20.0)
            .with_indent_shift(40.0)
            .with_max_range_distance(500)
            .without_token_fallback()
            .sequential();
        assert_eq!(options.paragraph_gap, 20.0);
        assert_eq!(options.indent_shift, 40.0);
        assert_eq!(options.max_range_distance, 500);
        assert!(!options.token_fallback);
        assert!(!options.parallel);
    }
}
