//! Spelling rewrite of whole answers.

use std::sync::{Arc, LazyLock};

use ahash::AHashSet;
use regex::{Captures, Regex};

use crate::analysis::analyzer::MorphAnalyzer;
use crate::error::{AnketaError, Result};
use crate::spelling::corrector::SpellChecker;

static WORD: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\b[\w-]+\b"));

/// Rewrites the words of a text that the analyzer only guessed.
///
/// Words the analyzer recognizes are left alone even when the spelling
/// dictionary does not know them.
pub struct SpellingNormalizer {
    analyzer: Arc<dyn MorphAnalyzer>,
    checker: Arc<dyn SpellChecker>,
}

impl std::fmt::Debug for SpellingNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpellingNormalizer")
            .field("analyzer", &self.analyzer.name())
            .field("checker", &self.checker.name())
            .finish()
    }
}

impl SpellingNormalizer {
    pub fn new(analyzer: Arc<dyn MorphAnalyzer>, checker: Arc<dyn SpellChecker>) -> Self {
        SpellingNormalizer { analyzer, checker }
    }

    pub fn checker(&self) -> &dyn SpellChecker {
        self.checker.as_ref()
    }

    /// Correct every low-confidence word of the text.
    pub fn correct_text(&self, text: &str) -> Result<String> {
        let pattern = WORD
            .as_ref()
            .map_err(|e| AnketaError::Regex(e.clone()))?;

        let guessed: AHashSet<String> = self
            .analyzer
            .analyze(text)?
            .into_iter()
            .filter(|word| word.is_low_confidence())
            .map(|word| word.text)
            .collect();
        if guessed.is_empty() {
            return Ok(text.to_string());
        }

        // The analyzer may split a hyphenated word that the pattern keeps whole.
        let corrected = pattern.replace_all(text, |caps: &Captures<'_>| {
            let word = &caps[0];
            if guessed.contains(word) || word.split('-').any(|part| guessed.contains(part)) {
                self.checker.correct(word)
            } else {
                word.to_string()
            }
        });
        Ok(corrected.into_owned())
    }
}
