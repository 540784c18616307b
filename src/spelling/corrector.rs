//! Single-word spelling correction.

use std::num::NonZeroUsize;

use log::trace;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::spelling::dictionary::SpellingDictionary;
use crate::spelling::levenshtein::levenshtein_distance_threshold;

/// Default capacity of the per-word correction memo.
pub const DEFAULT_CACHE_CAPACITY: usize = 300;

/// Corrects single words.
pub trait SpellChecker: Send + Sync {
    /// The word itself when it is accepted or nothing better is known,
    /// otherwise the closest suggestion.
    fn correct(&self, word: &str) -> String;

    fn name(&self) -> &'static str;
}

/// A checker that accepts every word.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySpellChecker;

impl SpellChecker for IdentitySpellChecker {
    fn correct(&self, word: &str) -> String {
        word.to_string()
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Configuration for the dictionary spell checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectorConfig {
    /// Maximum edit distance of a suggestion.
    pub max_distance: usize,
    /// Number of corrections kept in memory.
    pub cache_capacity: usize,
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        CorrectorConfig {
            max_distance: 2,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Word-list spell checker with bounded edit distance.
///
/// Among the words within `max_distance` the closest one wins; equally close
/// words are ranked by dictionary order. Corrections are memoized in a
/// bounded LRU shared between threads.
pub struct DictionarySpellChecker {
    dictionary: SpellingDictionary,
    config: CorrectorConfig,
    cache: Mutex<LruCache<String, String>>,
}

impl std::fmt::Debug for DictionarySpellChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictionarySpellChecker")
            .field("words", &self.dictionary.word_count())
            .field("config", &self.config)
            .finish()
    }
}

impl DictionarySpellChecker {
    pub fn new(dictionary: SpellingDictionary) -> Self {
        Self::with_config(dictionary, CorrectorConfig::default())
    }

    pub fn with_config(dictionary: SpellingDictionary, config: CorrectorConfig) -> Self {
        let capacity = NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        DictionarySpellChecker {
            dictionary,
            config,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn dictionary(&self) -> &SpellingDictionary {
        &self.dictionary
    }

    pub fn config(&self) -> &CorrectorConfig {
        &self.config
    }

    /// Number of memoized corrections.
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }

    /// Closest known word within the configured distance.
    pub fn suggest(&self, word: &str) -> Option<&str> {
        let normalized = word.to_lowercase();
        let length = normalized.chars().count();
        let max_distance = self.config.max_distance;

        self.dictionary
            .candidates(length, max_distance)
            .filter_map(|(position, candidate)| {
                levenshtein_distance_threshold(&normalized, candidate, max_distance)
                    .map(|distance| (distance, position, candidate))
            })
            .min_by_key(|&(distance, position, _)| (distance, position))
            .map(|(_, _, candidate)| candidate)
    }
}

impl SpellChecker for DictionarySpellChecker {
    fn correct(&self, word: &str) -> String {
        if word.is_empty() || self.dictionary.contains(word) {
            return word.to_string();
        }
        if let Some(hit) = self.cache.lock().get(word) {
            return hit.clone();
        }

        let corrected = self
            .suggest(word)
            .map(str::to_string)
            .unwrap_or_else(|| word.to_string());
        trace!("Corrected {word:?} to {corrected:?}");
        self.cache.lock().put(word.to_string(), corrected.clone());
        corrected
    }

    fn name(&self) -> &'static str {
        "dictionary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> DictionarySpellChecker {
        DictionarySpellChecker::new(SpellingDictionary::from_words([
            "скамейка", "скамейки", "урна", "дерево",
        ]))
    }

    #[test]
    fn test_identity() {
        assert_eq!(IdentitySpellChecker.correct("скамека"), "скамека");
        assert_eq!(IdentitySpellChecker.name(), "identity");
    }

    #[test]
    fn test_known_words_are_kept() {
        let checker = checker();
        assert_eq!(checker.correct("Скамейка"), "Скамейка");
        assert_eq!(checker.cached(), 0);
    }

    #[test]
    fn test_closest_suggestion_wins() {
        let checker = checker();
        assert_eq!(checker.correct("скамека"), "скамейка");
        assert_eq!(checker.correct("дервео"), "дерево");
        assert_eq!(checker.correct("урнаа"), "урна");
    }

    #[test]
    fn test_ties_follow_dictionary_order() {
        // One edit away from both "скамейка" and "скамейки".
        assert_eq!(checker().correct("скамейку"), "скамейка");
    }

    #[test]
    fn test_unknown_word_without_suggestion() {
        assert_eq!(checker().correct("фонтан"), "фонтан");
    }

    #[test]
    fn test_cache_is_bounded() {
        let config = CorrectorConfig {
            max_distance: 2,
            cache_capacity: 2,
        };
        let checker = DictionarySpellChecker::with_config(
            SpellingDictionary::from_words(["урна"]),
            config,
        );
        for word in ["урнв", "урнг", "урнд"] {
            assert_eq!(checker.correct(word), "урна");
        }
        assert_eq!(checker.cached(), 2);
    }
}
