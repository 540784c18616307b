//! Exact hypothesis text → final category.

use std::collections::BTreeSet;
use std::path::Path;

use ahash::AHashMap;

use crate::dictionary::loader::read_csv_dictionaries;
use crate::error::{AnketaError, Result};

/// Dictionary of ready answers.
///
/// A hypothesis resolves when its whole text is a key here. Keys are
/// lowercased. When a key is listed under several categories the
/// lexicographically smallest category is kept, so loading is deterministic
/// regardless of file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadyAnswerDictionary {
    answers: AHashMap<String, String>,
}

impl ReadyAnswerDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(text, category)` pairs; repeated texts keep the smallest
    /// category.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut dictionary = Self::new();
        for (text, category) in pairs {
            dictionary.insert(text.as_ref(), category);
        }
        dictionary
    }

    /// Load category tables. With `include_headline` the category name itself
    /// is also a ready answer for that category.
    pub fn from_csv<P: AsRef<Path>>(paths: &[P], include_headline: bool) -> Result<Self> {
        let mut merged: AHashMap<String, BTreeSet<String>> = AHashMap::new();
        for (text, categories) in read_csv_dictionaries(paths, !include_headline, b',')? {
            merged
                .entry(text.to_lowercase())
                .or_default()
                .extend(categories);
        }

        let answers: AHashMap<String, String> = merged
            .into_iter()
            .filter_map(|(text, categories)| {
                categories.into_iter().next().map(|category| (text, category))
            })
            .collect();

        if answers.is_empty() {
            return Err(AnketaError::empty_dictionary("ready-answer dictionary has no entries"));
        }
        Ok(ReadyAnswerDictionary { answers })
    }

    /// Add a ready answer. An existing key keeps whichever category sorts
    /// first.
    pub fn insert<V: Into<String>>(&mut self, text: &str, category: V) {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return;
        }
        let category = category.into();
        match self.answers.get_mut(&text) {
            Some(existing) if *existing <= category => {}
            Some(existing) => *existing = category,
            None => {
                self.answers.insert(text, category);
            }
        }
    }

    /// Category for an exact text, compared case-insensitively.
    pub fn get(&self, text: &str) -> Option<&str> {
        self.answers
            .get(text)
            .or_else(|| self.answers.get(&text.to_lowercase()))
            .map(String::as_str)
    }

    /// Whether the text is a ready answer.
    pub fn contains(&self, text: &str) -> bool {
        self.get(text).is_some()
    }

    /// Number of ready answers.
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// Whether the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_smallest_category_wins() {
        let dictionary = ReadyAnswerDictionary::from_pairs([
            ("нет скамейки", "Убрать скамейки"),
            ("нет скамейки", "Анти-скамейки"),
            ("скамейки", "Скамейки"),
        ]);
        assert_eq!(dictionary.get("нет скамейки"), Some("Анти-скамейки"));
        assert_eq!(dictionary.get("Скамейки"), Some("Скамейки"));
        assert_eq!(dictionary.len(), 2);
    }

    #[test]
    fn test_from_csv_with_headline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Убрать скамейки,нет скамейки,меньше скамейки").unwrap();
        writeln!(file, "Скамейки,скамейки").unwrap();
        file.flush().unwrap();

        let with_headline = ReadyAnswerDictionary::from_csv(&[file.path()], true).unwrap();
        assert_eq!(with_headline.get("нет скамейки"), Some("Убрать скамейки"));
        assert_eq!(with_headline.get("убрать скамейки"), Some("Убрать скамейки"));
        assert_eq!(with_headline.get("скамейки"), Some("Скамейки"));

        let without = ReadyAnswerDictionary::from_csv(&[file.path()], false).unwrap();
        assert!(!without.contains("убрать скамейки"));
        assert!(without.contains("меньше скамейки"));
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(ReadyAnswerDictionary::from_csv(&[file.path()], true).is_err());
    }
}
