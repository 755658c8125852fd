//! Regex construction for the tolerant matcher stages.
//!
//! Literal phrase content is always escaped before any tolerance token is
//! inserted, so citation text can never inject regex syntax.

use crate::normalize::ligature_glyph;
use crate::resolve_options::ResolveOptions;

/// Ligature sequences, longest first so `ffi` wins over `ff`.
const LIGATURE_SEQUENCES: &[&str] = &["ffi", "ffl", "ff", "fi", "fl"];

fn push_escaped(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// Escaped phrase where each ligature sequence also accepts its glyph.
///
/// Returns `None` when the phrase contains no ligature sequence, since the
/// pattern would then be identical to a plain substring search.
pub fn ligature_aware(phrase: &str) -> Option<String> {
    let mut out = String::with_capacity(phrase.len() * 2);
    let mut found = false;
    let mut rest = phrase;

    while let Some(c) = rest.chars().next() {
        let sequence = LIGATURE_SEQUENCES
            .iter()
            .find(|seq| rest.starts_with(**seq))
            .and_then(|seq| ligature_glyph(seq).map(|glyph| (*seq, glyph)));

        match sequence {
            Some((seq, glyph)) => {
                out.push_str(&format!("(?:{}|{})", seq, glyph));
                rest = &rest[seq.len()..];
                found = true;
            }
            None => {
                push_escaped(&mut out, c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    found.then_some(out)
}

/// First `max_chars` characters of the phrase, or `None` if it is not longer.
pub fn shortened(phrase: &str, max_chars: usize) -> Option<&str> {
    let (cut, _) = phrase.char_indices().nth(max_chars)?;
    let prefix = phrase[..cut].trim_end();
    (!prefix.is_empty()).then_some(prefix)
}

/// Word-split tolerant pattern: optional whitespace between the characters
/// of a word, mandatory whitespace between words.
pub fn flexible(phrase: &str) -> Option<String> {
    let words: Vec<String> = phrase
        .split_whitespace()
        .map(|word| {
            let mut out = String::with_capacity(word.len() * 4);
            for (i, c) in word.chars().enumerate() {
                if i > 0 {
                    out.push_str(r"\s*");
                }
                push_escaped(&mut out, c);
            }
            out
        })
        .collect();

    if words.is_empty() {
        return None;
    }
    Some(words.join(r"\s+"))
}

/// Words of the phrase with punctuation stripped, paired with their position.
pub fn clean_words(phrase: &str) -> Vec<(usize, String)> {
    phrase
        .split_whitespace()
        .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|word| !word.is_empty())
        .enumerate()
        .collect()
}

/// The longest significant words, kept in phrase order.
pub fn keywords(phrase: &str, options: &ResolveOptions) -> Vec<String> {
    let words = clean_words(phrase);
    let qualifying = |min_len: usize| -> Vec<(usize, String)> {
        words
            .iter()
            .filter(|(_, word)| word.chars().count() >= min_len)
            .cloned()
            .collect()
    };

    let mut selected = qualifying(options.min_keyword_len);
    if selected.len() < options.min_keywords {
        selected = qualifying(options.relaxed_keyword_len);
    }
    if selected.len() < options.min_keywords {
        return Vec::new();
    }

    // Stable sort keeps the earlier word on length ties.
    selected.sort_by(|a, b| b.1.chars().count().cmp(&a.1.chars().count()));
    selected.truncate(options.max_keywords);
    selected.sort_by_key(|(index, _)| *index);
    selected.into_iter().map(|(_, word)| word).collect()
}

/// Keywords in order, each gap bounded by `keyword_window` characters.
pub fn keyword_sequence(phrase: &str, options: &ResolveOptions) -> Option<String> {
    let words = keywords(phrase, options);
    if words.is_empty() {
        return None;
    }
    let gap = format!(".{{0,{}}}?", options.keyword_window);
    let escaped: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    Some(format!("(?s){}", escaped.join(&gap)))
}

/// Prefix (and, for long words, suffix) of the first distinguishing word.
pub fn word_fragment(phrase: &str, options: &ResolveOptions) -> Option<String> {
    let word: Vec<char> = clean_words(phrase)
        .into_iter()
        .map(|(_, word)| word)
        .find(|word| word.chars().count() >= options.word_fragment_min_len)?
        .chars()
        .collect();

    let prefix: String = word.iter().take(options.word_fragment_prefix).collect();
    if word.len() < options.word_fragment_prefix + options.word_fragment_suffix {
        return Some(regex::escape(&prefix));
    }

    let suffix: String = word[word.len() - options.word_fragment_suffix..].iter().collect();
    Some(format!(
        "(?s){}.{{0,{}}}?{}",
        regex::escape(&prefix),
        options.word_fragment_window,
        regex::escape(&suffix)
    ))
}
