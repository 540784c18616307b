//! Morphological analyzer seam.
//!
//! The classification core never talks to a concrete analyzer; it receives an
//! `Arc<dyn MorphAnalyzer>` handle owned by the batch driver. Two backends
//! ship with the crate:
//!
//! - [`LexiconAnalyzer`](lexicon::LexiconAnalyzer): in-process, driven by a
//!   word-form lexicon. Deterministic and used throughout the tests.
//! - [`MystemAnalyzer`](mystem::MystemAnalyzer): talks to a long-running
//!   `mystem` process over its line-oriented JSON protocol.
//!
//! # Examples
//!
//! ```
//! use anketa::analysis::analyzer::MorphAnalyzer;
//! use anketa::analysis::analyzer::lexicon::LexiconAnalyzer;
//!
//! let analyzer = LexiconAnalyzer::new()
//!     .with_entry("скамеек", "скамейка", "S,жен,неод=род,мн")
//!     .with_entry("нет", "нет", "PRAEDIC=");
//!
//! let lemmas = analyzer.lemmatize("Нет скамеек").unwrap();
//! assert_eq!(lemmas, vec!["нет", " ", "скамейка"]);
//! ```

pub mod lexicon;
pub mod mystem;

use crate::analysis::token::WordAnalysis;
use crate::error::Result;

/// Trait for morphological analyzers.
///
/// Implementations must return every segment of the input, whitespace and
/// punctuation included, in input order.
pub trait MorphAnalyzer: Send + Sync {
    /// Segment and analyze the given text.
    fn analyze(&self, text: &str) -> Result<Vec<WordAnalysis>>;

    /// Lemmatize the given text, one entry per segment of [`analyze`].
    ///
    /// The default derives lemmas from the primary readings of a fresh
    /// analysis. Backends with a dedicated lemmatization pass may override it;
    /// callers check that both passes agree.
    ///
    /// [`analyze`]: MorphAnalyzer::analyze
    fn lemmatize(&self, text: &str) -> Result<Vec<String>> {
        Ok(self
            .analyze(text)?
            .iter()
            .map(|word| word.lemma().to_string())
            .collect())
    }

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;
}
