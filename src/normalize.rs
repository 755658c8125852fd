//! # Text Normalizer
//!
//! Produces the matching-friendly form of page text and citation phrases.
//!
//! ## Folding Rules
//!
//! 1. **Ligatures** - typographic ligatures decompose to ASCII (`ﬁ` → `fi`)
//! 2. **Case and compatibility** - lowercase plus per-character NFKD
//! 3. **Punctuation** - curly quotes and dash variants become ASCII
//! 4. **Whitespace** - runs collapse to one space, ends are trimmed
//!
//! Normalization is applied per source character, so every byte of the
//! output can be traced back to the raw character it came from. That map
//! ([`NormalizedText`]) is what keeps fragment offsets usable after matching.

use std::iter;
use unicode_normalization::UnicodeNormalization;

/// Ligature glyph mapping table
const LIGATURE_MAPPINGS: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"), // Long s + t
    ('\u{FB06}', "st"),
    ('\u{A732}', "aa"),
    ('\u{A733}', "aa"),
];

/// Punctuation variants folded to ASCII
const PUNCTUATION_MAPPINGS: &[(char, char)] = &[
    ('\u{2018}', '\''),
    ('\u{2019}', '\''),
    ('\u{201A}', '\''),
    ('\u{201B}', '\''),
    ('\u{2032}', '\''),
    ('\u{201C}', '"'),
    ('\u{201D}', '"'),
    ('\u{201E}', '"'),
    ('\u{201F}', '"'),
    ('\u{2033}', '"'),
    ('\u{00AB}', '"'),
    ('\u{00BB}', '"'),
    ('\u{2010}', '-'),
    ('\u{2011}', '-'),
    ('\u{2012}', '-'),
    ('\u{2013}', '-'),
    ('\u{2014}', '-'),
    ('\u{2015}', '-'),
    ('\u{2212}', '-'),
];

/// Get ligature decomposition if applicable
pub fn ligature_expansion(c: char) -> Option<&'static str> {
    LIGATURE_MAPPINGS
        .iter()
        .find(|(glyph, _)| *glyph == c)
        .map(|(_, expansion)| *expansion)
}

/// Ligature glyph producing `expansion`, used by the ligature-aware matcher.
pub fn ligature_glyph(expansion: &str) -> Option<char> {
    LIGATURE_MAPPINGS
        .iter()
        .find(|(glyph, text)| *text == expansion && matches!(*glyph, '\u{FB00}'..='\u{FB04}'))
        .map(|(glyph, _)| *glyph)
}

fn fold_punctuation(c: char) -> char {
    PUNCTUATION_MAPPINGS
        .iter()
        .find(|(variant, _)| *variant == c)
        .map(|(_, ascii)| *ascii)
        .unwrap_or(c)
}

/// Characters that carry no text and would only split words
fn is_invisible_char(c: char) -> bool {
    matches!(
        c,
        '\0'
        | '\u{00AD}' // Soft hyphen
        | '\u{200B}' // Zero width space
        | '\u{200C}'
        | '\u{200D}'
        | '\u{2060}'
        | '\u{FEFF}' // BOM
    )
}

/// Calls `emit` with every folded character produced by `c`.
fn fold_char(c: char, mut emit: impl FnMut(char)) {
    if is_invisible_char(c) {
        return;
    }
    if let Some(expansion) = ligature_expansion(c) {
        expansion.chars().for_each(emit);
        return;
    }
    if c.is_ascii() {
        emit(c.to_ascii_lowercase());
        return;
    }
    // Before NFKD, which splits the double prime into two primes
    let punctuation = fold_punctuation(c);
    if punctuation != c {
        emit(punctuation);
        return;
    }
    for lower in c.to_lowercase() {
        for decomposed in iter::once(lower).nfkd() {
            if let Some(expansion) = ligature_expansion(decomposed) {
                expansion.chars().for_each(&mut emit);
                continue;
            }
            for folded in decomposed.to_lowercase() {
                emit(fold_punctuation(folded));
            }
        }
    }
}

/// Normalized text together with its map back to raw offsets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedText {
    text: String,
    /// Raw byte range of the source character, one entry per output byte
    origins: Vec<(usize, usize)>,
}

impl NormalizedText {
    /// Normalizes `raw`, recording where each output byte came from.
    pub fn new(raw: &str) -> Self {
        let mut text = String::with_capacity(raw.len());
        let mut origins = Vec::with_capacity(raw.len());
        let mut pending_space: Option<(usize, usize)> = None;

        for (offset, c) in raw.char_indices() {
            let origin = (offset, offset + c.len_utf8());
            fold_char(c, |folded| {
                if folded.is_whitespace() {
                    if !text.is_empty() && pending_space.is_none() {
                        pending_space = Some(origin);
                    }
                    return;
                }
                if let Some(space_origin) = pending_space.take() {
                    text.push(' ');
                    origins.push(space_origin);
                }
                text.push(folded);
                origins.extend(iter::repeat(origin).take(folded.len_utf8()));
            });
        }

        Self { text, origins }
    }

    /// The normalized string.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length of the normalized string in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns true if normalization left nothing.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Maps a normalized `[pos, pos + len)` span to a raw `[start, end)` span.
    ///
    /// Returns `None` for empty or out-of-bounds spans.
    pub fn to_raw_range(&self, pos: usize, len: usize) -> Option<(usize, usize)> {
        if len == 0 || pos + len > self.origins.len() {
            return None;
        }
        let start = self.origins[pos].0;
        let end = self.origins[pos + len - 1].1;
        Some((start, end.max(start)))
    }

    /// Consumes self and returns the normalized string.
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Normalizes text for matching.
///
/// Lowercases, folds ligatures, quotes and dashes, collapses whitespace and
/// trims. Idempotent and total.
///
/// # Example
///
/// ```
/// use citeanchor::normalize::normalize;
///
/// assert_eq!(normalize("  The O\u{FB03}ce’s  “Policy” "), "the office's \"policy\"");
/// ```
pub fn normalize(text: &str) -> String {
    NormalizedText::new(text).into_string()
}
