//! # Word Extraction
//!
//! Pure tokenization for the trend pipeline. Raw message text goes in,
//! a filtered sequence of candidate words comes out. No I/O, no state,
//! no panics — garbage input yields an empty vector.
//!
//! The rules, in order:
//! 1. Split on whitespace runs.
//! 2. Lowercase, then strip every character that is not a Latin or
//!    Cyrillic letter.
//! 3. Drop tokens that end up empty, shorter than 2 or longer than
//!    8 characters, or that appear in the stopword set.
//!
//! Duplicates are retained and order is preserved; frequency counting
//! happens downstream in [`crate::aggregate`].

use crate::error::Result;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const MIN_WORD_LEN: usize = 2;
const MAX_WORD_LEN: usize = 8;

/// Words excluded from trend counting (articles, prepositions, chat filler).
///
/// Loaded from a newline-delimited filter file in production, built from an
/// iterator in tests. Matching is exact against already-sanitized tokens.
#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    /// Empty set: nothing is filtered.
    pub fn none() -> Self {
        Self::default()
    }

    /// Load from a newline-delimited file. Blank lines are skipped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_lines(content.lines()))
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = lines
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn keep_char(c: char) -> bool {
    c.is_ascii_lowercase() || ('а'..='я').contains(&c) || c == 'ё'
}

/// Lowercase a token and strip everything that is not a Latin or Cyrillic
/// letter. Sanitization is a fixed point: running it twice yields the same
/// token as running it once.
pub fn sanitize_word(word: &str) -> String {
    word.to_lowercase().chars().filter(|c| keep_char(*c)).collect()
}

/// Extract candidate trend words from a raw message.
pub fn extract(message: &str, stopwords: &Stopwords) -> Vec<String> {
    message
        .split_whitespace()
        .map(sanitize_word)
        .filter(|w| {
            let len = w.chars().count();
            (MIN_WORD_LEN..=MAX_WORD_LEN).contains(&len) && !stopwords.contains(w)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_runs() {
        let words = extract("foo   bar\tbaz\nqux", &Stopwords::none());
        assert_eq!(words, vec!["foo", "bar", "baz", "qux"]);
    }

    #[test]
    fn lowercases_and_strips_non_letters() {
        let words = extract("HeLLo, wor1d!!", &Stopwords::none());
        assert_eq!(words, vec!["hello", "word"]);
    }

    #[test]
    fn keeps_cyrillic_including_yo() {
        let words = extract("Привет МИР ёлка", &Stopwords::none());
        assert_eq!(words, vec!["привет", "мир", "ёлка"]);
    }

    #[test]
    fn drops_out_of_range_lengths() {
        // "a" too short, "verylongtoken" too long after sanitization
        let words = extract("a ok verylongtoken", &Stopwords::none());
        assert_eq!(words, vec!["ok"]);
    }

    #[test]
    fn drops_tokens_empty_after_sanitization() {
        let words = extract("123 \u{1F600}\u{1F600} --- word", &Stopwords::none());
        assert_eq!(words, vec!["word"]);
    }

    #[test]
    fn drops_stopwords() {
        let stop = Stopwords::from_lines(["the", "and"]);
        let words = extract("the quick and brown", &stop);
        assert_eq!(words, vec!["quick", "brown"]);
    }

    #[test]
    fn preserves_duplicates_and_order() {
        let words = extract("foo bar foo", &Stopwords::none());
        assert_eq!(words, vec!["foo", "bar", "foo"]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(extract("", &Stopwords::none()).is_empty());
        assert!(extract("   ", &Stopwords::none()).is_empty());
    }

    #[test]
    fn sanitization_is_a_fixed_point() {
        for raw in ["HeLLo!", "Привет123", "ёЖиК", "mixedМикс"] {
            let once = sanitize_word(raw);
            let twice = sanitize_word(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn stopword_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filter.txt");
        std::fs::write(&path, "the\n\nand\n").unwrap();

        let stop = Stopwords::load(&path).unwrap();
        assert_eq!(stop.len(), 2);
        assert!(stop.contains("the"));
        assert!(stop.contains("and"));
        assert!(!stop.contains(""));
    }
}
