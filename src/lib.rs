//! # anketa
//!
//! Dictionary-driven classification of free-text survey answers.
//!
//! ## Features
//!
//! - Morphological analysis behind a pluggable analyzer trait
//! - Negation and filler stripping with grammar-aware clause tracking
//! - Prioritized keyword dictionaries and ready-answer lookup
//! - Escalating normalization strategies with a spelling retry
//! - Data-driven postprocessing rules
//! - Parallel batch classification into clear, questioned and trash tables

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod matcher;
pub mod negation;
pub mod output;
pub mod pipeline;
pub mod reader;
pub mod resolver;
pub mod rules;
pub mod search;
pub mod segment;
pub mod spelling;

pub mod prelude {
    pub use crate::analysis::analyzer::MorphAnalyzer;
    pub use crate::analysis::analyzer::lexicon::LexiconAnalyzer;
    pub use crate::analysis::answer::AnswerText;
    pub use crate::config::PipelineConfig;
    pub use crate::error::{AnketaError, Result};
    pub use crate::matcher::{HypothesisMatcher, Strategy};
    pub use crate::pipeline::{Classifier, Outcome, Status};
    pub use crate::resolver::{CategoryResolver, CategorySet};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
