//! # Matcher Chain
//!
//! Locates a normalized phrase in normalized page text with a cascade of
//! increasingly permissive strategies, stopping at the first stage that
//! produces any candidate:
//!
//! 1. **Exact** - literal substring
//! 2. **Ligature-aware** - substring with ligature glyph alternations
//! 3. **Shortened** - ligature-aware search on the phrase prefix
//! 4. **Flexible** - optional whitespace inside words, mandatory between
//! 5. **Keyword** - longest significant words in order, bounded gaps
//! 6. **Word fragment** - prefix/suffix of one distinguishing word
//!
//! Every stage enumerates all non-overlapping occurrences in text order, so
//! the first candidate is always the earliest occurrence.

pub mod pattern;

use crate::error::Result;
use crate::model::{MatchResult, MatchStage, PageText};
use crate::normalize::normalize;
use crate::resolve_options::ResolveOptions;
use crate::trace::{TraceEvent, TraceHook};
use regex::Regex;

/// Runs the matcher chain with a fixed configuration.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    options: &'a ResolveOptions,
    trace: &'a TraceHook,
}

impl<'a> Matcher<'a> {
    /// Creates a matcher.
    pub fn new(options: &'a ResolveOptions, trace: &'a TraceHook) -> Self {
        Self { options, trace }
    }

    /// All occurrences found by the first successful stage.
    ///
    /// Both `text` and `phrase` must already be normalized.
    pub fn find_all(&self, text: &str, phrase: &str) -> Vec<MatchResult> {
        if text.is_empty() || phrase.is_empty() {
            return Vec::new();
        }

        for stage in MatchStage::ALL {
            if !self.options.allows(stage) {
                break;
            }
            let Some(candidates) = self.run_stage(stage, text, phrase) else {
                continue;
            };
            self.trace.emit(TraceEvent::Stage {
                stage,
                candidates: candidates.len(),
            });
            if !candidates.is_empty() {
                return candidates;
            }
        }

        Vec::new()
    }

    /// The earliest occurrence found by the first successful stage.
    pub fn find_best(&self, text: &str, phrase: &str) -> Option<MatchResult> {
        self.find_all(text, phrase).into_iter().next()
    }

    /// Runs one stage; `None` if the stage does not apply to this phrase or
    /// its pattern could not be compiled.
    fn run_stage(&self, stage: MatchStage, text: &str, phrase: &str) -> Option<Vec<MatchResult>> {
        match stage {
            MatchStage::Exact => Some(
                text.match_indices(phrase)
                    .map(|(pos, found)| MatchResult::new(pos, found.len(), stage))
                    .collect(),
            ),
            MatchStage::LigatureAware => {
                let pattern = pattern::ligature_aware(phrase)?;
                self.regex_matches(stage, &pattern, text)
            }
            MatchStage::Shortened => {
                let prefix = pattern::shortened(phrase, self.options.shortened_phrase_chars)?;
                let pattern =
                    pattern::ligature_aware(prefix).unwrap_or_else(|| regex::escape(prefix));
                self.regex_matches(stage, &pattern, text)
            }
            MatchStage::Flexible => {
                let pattern = pattern::flexible(phrase)?;
                self.regex_matches(stage, &pattern, text)
            }
            MatchStage::Keyword => {
                let pattern = pattern::keyword_sequence(phrase, self.options)?;
                self.regex_matches(stage, &pattern, text)
            }
            MatchStage::WordFragment => {
                let pattern = pattern::word_fragment(phrase, self.options)?;
                self.regex_matches(stage, &pattern, text)
            }
        }
    }

    fn regex_matches(
        &self,
        stage: MatchStage,
        pattern: &str,
        text: &str,
    ) -> Option<Vec<MatchResult>> {
        let re = match compile(pattern) {
            Ok(re) => re,
            Err(err) => {
                tracing::warn!(stage = stage.name(), error = %err, "pattern rejected");
                self.trace.emit(TraceEvent::StageSkipped { stage });
                return None;
            }
        };

        Some(
            re.find_iter(text)
                .filter(|m| !m.as_str().is_empty())
                .map(|m| MatchResult::new(m.start(), m.len(), stage))
                .collect(),
        )
    }

    /// Coarse single-phrase fallback: fragments containing at least
    /// `min(2, token count)` of the phrase's tokens.
    ///
    /// `phrase` must already be normalized. Returns fragment indices in
    /// render order.
    pub fn token_fallback(&self, page: &PageText, phrase: &str) -> Vec<usize> {
        let mut tokens: Vec<String> = pattern::clean_words(phrase)
            .into_iter()
            .map(|(_, word)| word)
            .filter(|word| word.chars().count() >= self.options.min_token_len)
            .collect();
        tokens.sort();
        tokens.dedup();
        if tokens.is_empty() {
            return Vec::new();
        }

        let needed = tokens.len().min(2);
        let hits: Vec<usize> = page
            .fragments
            .iter()
            .enumerate()
            .filter(|(_, fragment)| {
                let text = normalize(&fragment.text);
                tokens.iter().filter(|token| text.contains(token.as_str())).count() >= needed
            })
            .map(|(index, _)| index)
            .collect();

        if !hits.is_empty() {
            self.trace.emit(TraceEvent::TokenFallback { fragments: hits.len() });
        }
        hits
    }
}

/// Compiles a stage pattern.
pub fn compile(pattern: &str) -> Result<Regex> {
    Ok(Regex::new(pattern)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_page_text;
    use crate::model::{BoundingBox, RenderedFragment};
    use std::sync::{Arc, Mutex};

    const PAGE: &str = "patients with diabetes mellitus require annual screening.";

    fn find_all(text: &str, phrase: &str) -> Vec<MatchResult> {
        let options = ResolveOptions::default();
        let trace = TraceHook::none();
        Matcher::new(&options, &trace).find_all(text, phrase)
    }

    #[test]
    fn test_exact_match_first_occurrence() {
        let found = find_all(PAGE, "diabetes mellitus");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pos, PAGE.find("diabetes mellitus").unwrap());
        assert_eq!(found[0].len, 17);
        assert!(found[0].exact);
        assert_eq!(found[0].stage, MatchStage::Exact);
    }

    #[test]
    fn test_exact_enumerates_all_occurrences() {
        let found = find_all("the rule, the rule, the rule", "the rule");
        let positions: Vec<usize> = found.iter().map(|m| m.pos).collect();
        assert_eq!(positions, vec![0, 10, 20]);
    }

    #[test]
    fn test_ligature_aware_stage() {
        let found = find_all("the o\u{FB03}ce of records", "the office");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].stage, MatchStage::LigatureAware);
        assert!(found[0].exact);
    }

    #[test]
    fn test_shortened_stage() {
        let phrase = "patients with diabetes mellitus require quarterly review";
        let found = find_all(PAGE, phrase);
        assert_eq!(found[0].stage, MatchStage::Shortened);
        assert_eq!(found[0].pos, 0);
        assert!(!found[0].exact);
    }

    #[test]
    fn test_flexible_stage() {
        let found = find_all("patients with diabe tes mell itus require", "diabetes mellitus");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].stage, MatchStage::Flexible);
        assert_eq!(found[0].pos, 14);
        assert_eq!(found[0].len, "diabe tes mell itus".len());
    }

    #[test]
    fn test_keyword_stage() {
        let found = find_all(PAGE, "patients require annual screening checks yearly");
        assert_eq!(found[0].stage, MatchStage::Keyword);
    }

    #[test]
    fn test_word_fragment_stage() {
        let found = find_all("the scre-ening program", "screening");
        assert_eq!(found[0].stage, MatchStage::WordFragment);
        assert_eq!(found[0].pos, 4);
    }

    #[test]
    fn test_no_match() {
        assert!(find_all(PAGE, "totally unrelated gibberish zzz").is_empty());
        assert!(find_all(PAGE, "").is_empty());
        assert!(find_all("", "anything").is_empty());
    }

    #[test]
    fn test_strict_options_stop_early() {
        let options = ResolveOptions::strict();
        let trace = TraceHook::none();
        let matcher = Matcher::new(&options, &trace);
        assert!(matcher
            .find_all("patients with diabe tes mell itus", "diabetes mellitus")
            .is_empty());
    }

    #[test]
    fn test_metacharacters_in_phrase() {
        let found = find_all("section 4.2 (b) applies [see note]", "4.2 (b) applies [see");
        assert_eq!(found[0].stage, MatchStage::Exact);
        let found = find_all("section 4.2 ( b) applies", "4.2 (b) applies");
        assert_eq!(found[0].stage, MatchStage::Flexible);
    }

    #[test]
    fn test_trace_reports_stages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let trace = TraceHook::new(move |event| sink.lock().unwrap().push(*event));
        let options = ResolveOptions::default();
        Matcher::new(&options, &trace).find_all("diabe tes", "diabetes");

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.first(),
            Some(&TraceEvent::Stage {
                stage: MatchStage::Exact,
                candidates: 0
            })
        );
        assert_eq!(
            seen.last(),
            Some(&TraceEvent::Stage {
                stage: MatchStage::Flexible,
                candidates: 1
            })
        );
    }

    #[test]
    fn test_oversized_pattern_skips_stage_and_continues() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let trace = TraceHook::new(move |event| sink.lock().unwrap().push(*event));
        let options = ResolveOptions::default().with_keyword_window(5_000_000);

        let found = Matcher::new(&options, &trace)
            .find_best("the scre-ening program", "screening program yearly")
            .unwrap();
        assert_eq!(found.stage, MatchStage::WordFragment);

        let seen = seen.lock().unwrap();
        let skipped = seen
            .iter()
            .position(|event| {
                *event
                    == TraceEvent::StageSkipped {
                        stage: MatchStage::Keyword,
                    }
            })
            .unwrap();
        assert!(matches!(
            seen.get(skipped + 1),
            Some(TraceEvent::Stage {
                stage: MatchStage::WordFragment,
                ..
            })
        ));
    }

    #[test]
    fn test_token_fallback() {
        let rendered = vec![
            RenderedFragment::new("Scope of care plan", BoundingBox::new(0.0, 0.0, 200.0, 12.0)),
            RenderedFragment::new("Unrelated footer", BoundingBox::new(40.0, 0.0, 200.0, 52.0)),
        ];
        let options = ResolveOptions::default();
        let page = extract_page_text(&rendered, &options);
        let trace = TraceHook::none();
        let matcher = Matcher::new(&options, &trace);

        assert_eq!(matcher.token_fallback(&page, "plan, care & scope!!"), vec![0]);
        assert!(matcher.token_fallback(&page, "of an").is_empty());
    }

    #[test]
    fn test_compile_error_maps_to_pattern() {
        assert!(matches!(compile("(unclosed"), Err(crate::Error::Pattern(_))));
        assert!(compile(r"diabetes\s+mellitus").is_ok());
    }
}
