//! Error types for the Anketa library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`AnketaError`] enum. Errors fall into two groups:
//!
//! - per-answer errors ([`AnketaError::AnalysisDesync`], analyzer failures)
//!   which abort the processing of a single answer and are turned into an
//!   "unprocessed" outcome by the batch driver;
//! - startup errors (dictionaries, configuration, I/O) which abort the whole
//!   run before anything is classified.
//!
//! An answer that simply matches nothing is not an error, see
//! [`crate::pipeline::Status`].
//!
//! # Examples
//!
//! ```
//! use anketa::error::{AnketaError, Result};
//!
//! fn load() -> Result<()> {
//!     Err(AnketaError::config("no dictionaries given"))
//! }
//!
//! assert_eq!(
//!     load().unwrap_err().to_string(),
//!     "Configuration error: no dictionaries given"
//! );
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Anketa operations.
#[derive(Error, Debug)]
pub enum AnketaError {
    /// The analyzer's surface pass and lemmatization pass disagree on the
    /// number of tokens of one answer.
    #[error("Analysis desync: {surface} word forms but {lemmas} lemmas")]
    AnalysisDesync { surface: usize, lemmas: usize },

    /// Morphological analyzer failures (process died, malformed output).
    #[error("Analyzer error: {0}")]
    Analyzer(String),

    /// A dictionary or lexicon that must not be empty compiled to nothing.
    #[error("Empty dictionary: {0}")]
    EmptyDictionary(String),

    /// Malformed dictionary contents.
    #[error("Dictionary error: {0}")]
    Dictionary(String),

    /// Invalid or inconsistent configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (file operations, analyzer pipes)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// CSV reading and writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid regular expressions in rules or lexicons
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Backtracking pattern errors (compilation or match limits)
    #[error("Pattern error: {0}")]
    Pattern(#[from] fancy_regex::Error),
}

/// Result type alias for operations that may fail with AnketaError.
pub type Result<T> = std::result::Result<T, AnketaError>;

impl AnketaError {
    /// Create a new analyzer error.
    pub fn analyzer<S: Into<String>>(msg: S) -> Self {
        AnketaError::Analyzer(msg.into())
    }

    /// Create a new empty dictionary error.
    pub fn empty_dictionary<S: Into<String>>(msg: S) -> Self {
        AnketaError::EmptyDictionary(msg.into())
    }

    /// Create a new dictionary error.
    pub fn dictionary<S: Into<String>>(msg: S) -> Self {
        AnketaError::Dictionary(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        AnketaError::Config(msg.into())
    }

    /// Whether this error only concerns the answer being processed.
    ///
    /// Startup errors (dictionaries, configuration) are fatal for the run.
    pub fn is_per_answer(&self) -> bool {
        matches!(
            self,
            AnketaError::AnalysisDesync { .. }
                | AnketaError::Analyzer(_)
                | AnketaError::Pattern(_)
        )
    }
}
