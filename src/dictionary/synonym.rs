//! Keyword → category dictionary used for substring search.

use std::path::Path;

use ahash::AHashMap;

use crate::dictionary::loader::read_csv_dictionaries;
use crate::error::{AnketaError, Result};

/// Ordered mapping from keyword to category.
///
/// Order encodes search priority: keywords declared earlier are reported
/// first by the [`PrioritySearcher`](crate::search::PrioritySearcher).
/// Keywords are lowercased; a keyword declared twice keeps its first position
/// and its first category.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SynonymDictionary {
    entries: Vec<(String, String)>,
    index: AHashMap<String, usize>,
}

impl SynonymDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary from `(keyword, category)` pairs in priority order.
    pub fn from_entries<I, K, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, C)>,
        K: AsRef<str>,
        C: Into<String>,
    {
        let mut dictionary = Self::new();
        for (keyword, category) in entries {
            dictionary.insert(keyword.as_ref(), category);
        }
        dictionary
    }

    /// Load category tables (`category,keyword,keyword...`), first file
    /// first.
    pub fn from_csv<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut dictionary = Self::new();
        for (keyword, categories) in read_csv_dictionaries(paths, true, b',')? {
            if let Some(category) = categories.into_iter().next() {
                dictionary.insert(&keyword, category);
            }
        }

        if dictionary.is_empty() {
            return Err(AnketaError::empty_dictionary("synonym dictionary has no keywords"));
        }
        Ok(dictionary)
    }

    /// Add a keyword. Returns false when the keyword was already present, in
    /// which case nothing changes.
    pub fn insert<C: Into<String>>(&mut self, keyword: &str, category: C) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() || self.index.contains_key(&keyword) {
            return false;
        }
        self.index.insert(keyword.clone(), self.entries.len());
        self.entries.push((keyword, category.into()));
        true
    }

    /// Category of a keyword (keyword compared case-insensitively).
    pub fn category(&self, keyword: &str) -> Option<&str> {
        self.position(keyword)
            .map(|slot| self.entries[slot].1.as_str())
    }

    /// Priority of a keyword; lower is searched first.
    pub fn position(&self, keyword: &str) -> Option<usize> {
        match self.index.get(keyword) {
            Some(&slot) => Some(slot),
            None => self.index.get(&keyword.to_lowercase()).copied(),
        }
    }

    /// Whether the keyword is present.
    pub fn contains(&self, keyword: &str) -> bool {
        self.position(keyword).is_some()
    }

    /// Entry at a priority position.
    pub fn get(&self, position: usize) -> Option<(&str, &str)> {
        self.entries
            .get(position)
            .map(|(k, c)| (k.as_str(), c.as_str()))
    }

    /// Entries in priority order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), c.as_str()))
    }

    /// Number of keywords.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no keywords.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
