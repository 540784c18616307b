//! Word list for spelling correction.

use std::collections::BTreeMap;
use std::path::Path;

use ahash::AHashMap;

use crate::dictionary::read_wordlists;
use crate::error::Result;

/// Known words in the order they were added.
///
/// The order is the tie-break between equally close suggestions, so words
/// loaded from the main list win over session additions.
#[derive(Debug, Clone, Default)]
pub struct SpellingDictionary {
    words: Vec<String>,
    positions: AHashMap<String, usize>,
    /// Character length → word positions.
    by_length: BTreeMap<usize, Vec<usize>>,
}

impl SpellingDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary = Self::new();
        dictionary.extend(words);
        dictionary
    }

    /// Load word lists with one word per line.
    pub fn load_from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        Ok(Self::from_words(read_wordlists(paths, false)?))
    }

    /// Add a word; returns false if it was known already.
    pub fn add_word(&mut self, word: &str) -> bool {
        let normalized = word.trim().to_lowercase();
        if normalized.is_empty() || self.positions.contains_key(&normalized) {
            return false;
        }

        let position = self.words.len();
        self.by_length
            .entry(normalized.chars().count())
            .or_default()
            .push(position);
        self.positions.insert(normalized.clone(), position);
        self.words.push(normalized);
        true
    }

    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.add_word(word.as_ref());
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.positions.contains_key(&word.to_lowercase())
    }

    /// Words whose length is within `max_distance` of `length`, as
    /// `(position, word)` pairs.
    pub fn candidates(
        &self,
        length: usize,
        max_distance: usize,
    ) -> impl Iterator<Item = (usize, &str)> + '_ {
        let range = length.saturating_sub(max_distance)..=length.saturating_add(max_distance);
        self.by_length
            .range(range)
            .flat_map(|(_, positions)| positions.iter())
            .map(|&position| (position, self.words[position].as_str()))
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_add_and_contains() {
        let mut dictionary = SpellingDictionary::from_words(["Скамейка", "урна"]);
        assert!(!dictionary.add_word("скамейка"));
        assert!(dictionary.add_word("дерево"));

        assert!(dictionary.contains("СКАМЕЙКА"));
        assert_eq!(dictionary.word_count(), 3);
        assert_eq!(dictionary.words()[2], "дерево");
    }

    #[test]
    fn test_candidates_by_length() {
        let dictionary = SpellingDictionary::from_words(["урна", "скамейка", "дерево", "лавка"]);
        let mut found: Vec<_> = dictionary.candidates(5, 1).map(|(_, w)| w).collect();
        found.sort();
        assert_eq!(found, vec!["дерево", "лавка", "урна"]);
    }

    #[test]
    fn test_load_from_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "скамейка\n\nурна\nскамейка").unwrap();
        file.flush().unwrap();

        let dictionary = SpellingDictionary::load_from_files(&[file.path()]).unwrap();
        assert_eq!(dictionary.words(), &["скамейка".to_string(), "урна".to_string()]);
    }
}
