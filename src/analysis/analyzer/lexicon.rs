//! Lexicon-driven morphological analyzer.
//!
//! Segments text on Unicode word boundaries and looks every word up in a
//! form → readings table. Words missing from the table get a guessed reading
//! (lemma = lowercased form, quality `bastard`), the way a statistical
//! analyzer marks out-of-vocabulary words, so that they are picked up by
//! spelling normalization.
//!
//! The lexicon file is a headerless CSV with rows
//! `form,lemma,grammar[,quality]`; lines starting with `#` are comments.

use std::path::Path;

use ahash::AHashMap;
use csv::ReaderBuilder;
use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::analyzer::MorphAnalyzer;
use crate::analysis::token::{Reading, WordAnalysis};
use crate::error::{AnketaError, Result};

/// Grammar assigned to guessed readings unless configured otherwise.
pub const DEFAULT_GUESS_GRAMMAR: &str = "S";

/// An in-process analyzer backed by a word-form table.
#[derive(Clone, Debug)]
pub struct LexiconAnalyzer {
    forms: AHashMap<String, Vec<Reading>>,
    guess_grammar: Option<String>,
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconAnalyzer {
    /// Create an analyzer with an empty lexicon.
    pub fn new() -> Self {
        LexiconAnalyzer {
            forms: AHashMap::new(),
            guess_grammar: Some(DEFAULT_GUESS_GRAMMAR.to_string()),
        }
    }

    /// Add a reading for a word form (builder style).
    pub fn with_entry(mut self, form: &str, lemma: &str, grammar: &str) -> Self {
        self.add_entry(form, Reading::new(lemma, grammar));
        self
    }

    /// Set the grammar of guessed readings. `None` leaves unknown words
    /// without any reading, so they behave like punctuation.
    pub fn with_guess_grammar(mut self, grammar: Option<String>) -> Self {
        self.guess_grammar = grammar;
        self
    }

    /// Add a reading for a word form. Later readings rank after earlier ones.
    pub fn add_entry(&mut self, form: &str, reading: Reading) {
        self.forms
            .entry(form.trim().to_lowercase())
            .or_default()
            .push(reading);
    }

    /// Load a lexicon from a CSV file.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut analyzer = LexiconAnalyzer::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() < 3 {
                return Err(AnketaError::dictionary(format!(
                    "{}: row {} needs form, lemma and grammar",
                    path.display(),
                    row + 1
                )));
            }
            let reading = Reading {
                lex: record[1].to_lowercase(),
                gr: record[2].to_string(),
                qual: record.get(3).filter(|q| !q.is_empty()).map(str::to_string),
            };
            analyzer.add_entry(&record[0], reading);
        }

        if analyzer.forms.is_empty() {
            return Err(AnketaError::empty_dictionary(path.display().to_string()));
        }
        Ok(analyzer)
    }

    /// Number of distinct word forms.
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    /// Whether the lexicon has no forms.
    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    fn analyze_segment(&self, segment: &str) -> WordAnalysis {
        if !segment.chars().any(char::is_alphabetic) {
            return WordAnalysis::bare(segment);
        }

        let form = segment.to_lowercase();
        match self.forms.get(&form) {
            Some(readings) => WordAnalysis {
                text: segment.to_string(),
                analysis: readings.clone(),
            },
            None => match &self.guess_grammar {
                Some(grammar) => {
                    WordAnalysis::analyzed(segment, Reading::guessed(form, grammar.clone()))
                }
                None => WordAnalysis::bare(segment),
            },
        }
    }
}

impl MorphAnalyzer for LexiconAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<WordAnalysis>> {
        Ok(text
            .split_word_bounds()
            .map(|segment| self.analyze_segment(segment))
            .collect())
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}
