//! Priority-ordered keyword search over normalized clause text.
//!
//! Every keyword of a [`SynonymDictionary`] is compiled into its own
//! case-insensitive, word-bounded pattern. A [`RegexSet`] over all of them
//! picks the keywords that occur at all, so only those are scanned for
//! positions.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use anketa::dictionary::SynonymDictionary;
//! use anketa::search::PrioritySearcher;
//!
//! let dictionary = Arc::new(SynonymDictionary::from_entries([
//!     ("урна", "Урны"),
//!     ("скамейка", "Скамейки"),
//! ]));
//! let searcher = PrioritySearcher::new(dictionary).unwrap();
//!
//! assert_eq!(searcher.search("скамейка и урна"), vec!["урна", "скамейка"]);
//! ```

use std::sync::Arc;

use log::debug;
use regex::{Regex, RegexSet};

use crate::dictionary::SynonymDictionary;
use crate::error::Result;

/// One keyword occurrence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordMatch<'a> {
    pub keyword: &'a str,
    pub category: &'a str,
    pub start: usize,
    pub end: usize,
}

struct CompiledPatterns {
    patterns: Vec<Regex>,
    prefilter: Option<RegexSet>,
}

fn keyword_pattern(keyword: &str) -> String {
    format!(r"(?i)\b{}\b", regex::escape(keyword))
}

fn compile(dictionary: &SynonymDictionary) -> Result<CompiledPatterns> {
    let sources: Vec<String> = dictionary.entries().map(|(k, _)| keyword_pattern(k)).collect();
    let patterns = sources
        .iter()
        .map(|source| Regex::new(source))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let prefilter = if sources.is_empty() {
        None
    } else {
        Some(RegexSet::new(&sources)?)
    };

    debug!("Compiled {} keyword patterns", patterns.len());
    Ok(CompiledPatterns {
        patterns,
        prefilter,
    })
}

/// Compiled searcher bound to one dictionary instance.
pub struct PrioritySearcher {
    dictionary: Arc<SynonymDictionary>,
    compiled: CompiledPatterns,
}

impl std::fmt::Debug for PrioritySearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrioritySearcher")
            .field("keywords", &self.compiled.patterns.len())
            .finish()
    }
}

impl PrioritySearcher {
    pub fn new(dictionary: Arc<SynonymDictionary>) -> Result<Self> {
        let compiled = compile(&dictionary)?;
        Ok(PrioritySearcher {
            dictionary,
            compiled,
        })
    }

    /// The dictionary this searcher is compiled for.
    pub fn dictionary(&self) -> &Arc<SynonymDictionary> {
        &self.dictionary
    }

    /// Rebind to a dictionary. Recompiles only if it is a different instance;
    /// returns whether it did.
    pub fn bind(&mut self, dictionary: &Arc<SynonymDictionary>) -> Result<bool> {
        if Arc::ptr_eq(&self.dictionary, dictionary) {
            return Ok(false);
        }
        self.compiled = compile(dictionary)?;
        self.dictionary = Arc::clone(dictionary);
        Ok(true)
    }

    /// All keyword occurrences, ordered by keyword priority and then by
    /// position.
    pub fn find_matches<'s>(&'s self, text: &str) -> Vec<KeywordMatch<'s>> {
        let Some(prefilter) = &self.compiled.prefilter else {
            return Vec::new();
        };

        let mut found = Vec::new();
        // Set indices come back in ascending order, which is priority order.
        for index in prefilter.matches(text).iter() {
            let Some((keyword, category)) = self.dictionary.get(index) else {
                continue;
            };
            for m in self.compiled.patterns[index].find_iter(text) {
                found.push(KeywordMatch {
                    keyword,
                    category,
                    start: m.start(),
                    end: m.end(),
                });
            }
        }
        found
    }

    /// Matched keywords, one entry per occurrence, ordered by priority then
    /// position.
    pub fn search<'s>(&'s self, text: &str) -> Vec<&'s str> {
        self.find_matches(text)
            .into_iter()
            .map(|m| m.keyword)
            .collect()
    }
}
