//! Classifier configuration.
//!
//! A configuration is a JSON file naming the dictionaries and rule tables
//! of one survey and tuning the pipeline. Relative paths are resolved
//! against the directory of the configuration file.
//!
//! ```json
//! {
//!   "negations": ["negations.csv"],
//!   "ignorables": ["ignorables.csv"],
//!   "synonyms": ["keywords.csv"],
//!   "ready_answers": ["answers.csv"],
//!   "stop_words": "stop.txt",
//!   "spelling_words": "words.txt",
//!   "rules": "rules.json",
//!   "questioned": ["Парковки", "Торговля"],
//!   "lexicon": "lexicon.csv"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnketaError, Result};
use crate::matcher::{DEFAULT_NEGATION_MARKER, Strategy};
use crate::spelling::corrector::DEFAULT_CACHE_CAPACITY;

/// Configuration of one classification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Negation lexicons (`trigger,hint...`).
    #[serde(default)]
    pub negations: Vec<PathBuf>,

    /// Lexicons of filler phrases stripped like negations but without
    /// flipping polarity.
    #[serde(default)]
    pub ignorables: Vec<PathBuf>,

    /// Category tables for keyword search, highest priority first.
    #[serde(default)]
    pub synonyms: Vec<PathBuf>,

    /// Category tables of ready answers.
    #[serde(default)]
    pub ready_answers: Vec<PathBuf>,

    /// Whether a category name is a ready answer for itself.
    #[serde(default = "default_true")]
    pub ready_answers_include_headline: bool,

    /// Word list of hypotheses that abort an answer.
    #[serde(default)]
    pub stop_words: Option<PathBuf>,

    /// Main spelling word list.
    #[serde(default)]
    pub spelling_words: Option<PathBuf>,

    /// Extra word lists added to the spelling dictionary for this run.
    #[serde(default)]
    pub extra_spelling_words: Vec<PathBuf>,

    /// JSON postprocessing rule table.
    #[serde(default)]
    pub rules: Option<PathBuf>,

    /// Categories that send an answer to manual review.
    #[serde(default)]
    pub questioned: Vec<String>,

    /// Category meaning "the classifier is unsure".
    #[serde(default = "default_unsure_marker")]
    pub unsure_marker: String,

    /// Prefix of negated hypotheses.
    #[serde(default = "default_negation_marker")]
    pub negation_marker: String,

    /// Normalization strategies in escalation order.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<Strategy>,

    /// Retry unresolved answers once after spelling correction.
    #[serde(default = "default_true")]
    pub spellcheck_retry: bool,

    /// Capacity of the spelling memo.
    #[serde(default = "default_cache_capacity")]
    pub spelling_cache_capacity: usize,

    /// Maximum edit distance of spelling suggestions.
    #[serde(default = "default_max_distance")]
    pub spelling_max_distance: usize,

    /// In-process analyzer lexicon (`form,lemma,grammar[,quality]`).
    #[serde(default)]
    pub lexicon: Option<PathBuf>,

    /// Path of the `mystem` binary.
    #[serde(default)]
    pub mystem: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_unsure_marker() -> String {
    "?".to_string()
}

fn default_negation_marker() -> String {
    DEFAULT_NEGATION_MARKER.to_string()
}

fn default_strategies() -> Vec<Strategy> {
    Strategy::DEFAULT_ORDER.to_vec()
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_max_distance() -> usize {
    2
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            negations: Vec::new(),
            ignorables: Vec::new(),
            synonyms: Vec::new(),
            ready_answers: Vec::new(),
            ready_answers_include_headline: true,
            stop_words: None,
            spelling_words: None,
            extra_spelling_words: Vec::new(),
            rules: None,
            questioned: Vec::new(),
            unsure_marker: default_unsure_marker(),
            negation_marker: default_negation_marker(),
            strategies: default_strategies(),
            spellcheck_retry: true,
            spelling_cache_capacity: DEFAULT_CACHE_CAPACITY,
            spelling_max_distance: default_max_distance(),
            lexicon: None,
            mystem: None,
        }
    }
}

impl PipelineConfig {
    /// Load and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AnketaError::config(format!("failed to read '{}': {e}", path.display()))
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json(&content, base)
    }

    /// Parse a configuration, resolving relative paths against `base`.
    pub fn from_json(content: &str, base: &Path) -> Result<Self> {
        let mut config: PipelineConfig = serde_json::from_str(content)?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    /// Make every relative path absolute with respect to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        self.negations.iter_mut().for_each(resolve);
        self.ignorables.iter_mut().for_each(resolve);
        self.synonyms.iter_mut().for_each(resolve);
        self.ready_answers.iter_mut().for_each(resolve);
        self.extra_spelling_words.iter_mut().for_each(resolve);
        self.stop_words.iter_mut().for_each(resolve);
        self.spelling_words.iter_mut().for_each(resolve);
        self.rules.iter_mut().for_each(resolve);
        self.lexicon.iter_mut().for_each(resolve);
        // A bare binary name is looked up in PATH.
        if let Some(binary) = &mut self.mystem {
            if binary.components().count() > 1 {
                resolve(binary);
            }
        }
    }

    /// Reject configurations the classifier cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.negations.is_empty() {
            return Err(AnketaError::config("no negation lexicon given"));
        }
        if self.synonyms.is_empty() {
            return Err(AnketaError::config("no synonym dictionary given"));
        }
        if self.ready_answers.is_empty() {
            return Err(AnketaError::config("no ready-answer dictionary given"));
        }
        if self.strategies.is_empty() {
            return Err(AnketaError::config("strategy list is empty"));
        }
        for (i, strategy) in self.strategies.iter().enumerate() {
            if self.strategies[..i].contains(strategy) {
                return Err(AnketaError::config(format!("strategy {strategy} listed twice")));
            }
        }
        if self.spelling_cache_capacity == 0 {
            return Err(AnketaError::config("spelling cache capacity must be positive"));
        }
        if self.negation_marker.trim().is_empty() {
            return Err(AnketaError::config("negation marker is empty"));
        }
        if self.lexicon.is_some() && self.mystem.is_some() {
            return Err(AnketaError::config("choose either lexicon or mystem, not both"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "negations": ["negations.csv"],
        "synonyms": ["keywords.csv"],
        "ready_answers": ["/data/answers.csv"]
    }"#;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_json(MINIMAL, Path::new("/surveys/park")).unwrap();

        assert!(config.ready_answers_include_headline);
        assert!(config.spellcheck_retry);
        assert_eq!(config.unsure_marker, "?");
        assert_eq!(config.negation_marker, "нет");
        assert_eq!(config.spelling_cache_capacity, 300);
        assert_eq!(config.strategies, Strategy::DEFAULT_ORDER.to_vec());
        assert!(config.stop_words.is_none());
    }

    #[test]
    fn test_relative_paths_resolve_against_base() {
        let config = PipelineConfig::from_json(MINIMAL, Path::new("/surveys/park")).unwrap();
        assert_eq!(config.negations, vec![PathBuf::from("/surveys/park/negations.csv")]);
        assert_eq!(config.ready_answers, vec![PathBuf::from("/data/answers.csv")]);
    }

    #[test]
    fn test_bare_mystem_name_is_kept() {
        let json = r#"{"negations": ["n.csv"], "synonyms": ["s.csv"],
                       "ready_answers": ["r.csv"], "mystem": "mystem"}"#;
        let config = PipelineConfig::from_json(json, Path::new("/cfg")).unwrap();
        assert_eq!(config.mystem, Some(PathBuf::from("mystem")));
    }

    #[test]
    fn test_validation() {
        let base = Path::new("/cfg");
        let missing = r#"{"synonyms": ["s.csv"], "ready_answers": ["r.csv"]}"#;
        assert!(matches!(
            PipelineConfig::from_json(missing, base),
            Err(AnketaError::Config(_))
        ));

        let no_strategies = r#"{"negations": ["n.csv"], "synonyms": ["s.csv"],
                                "ready_answers": ["r.csv"], "strategies": []}"#;
        assert!(PipelineConfig::from_json(no_strategies, base).is_err());

        let twice = r#"{"negations": ["n.csv"], "synonyms": ["s.csv"],
                        "ready_answers": ["r.csv"], "strategies": ["raw", "raw"]}"#;
        assert!(PipelineConfig::from_json(twice, base).is_err());

        let zero_cache = r#"{"negations": ["n.csv"], "synonyms": ["s.csv"],
                             "ready_answers": ["r.csv"], "spelling_cache_capacity": 0}"#;
        assert!(PipelineConfig::from_json(zero_cache, base).is_err());

        let both = r#"{"negations": ["n.csv"], "synonyms": ["s.csv"],
                       "ready_answers": ["r.csv"], "lexicon": "l.csv", "mystem": "mystem"}"#;
        assert!(PipelineConfig::from_json(both, base).is_err());
    }

    #[test]
    fn test_unknown_strategy_is_a_json_error() {
        let json = r#"{"negations": ["n.csv"], "synonyms": ["s.csv"],
                       "ready_answers": ["r.csv"], "strategies": ["lemmas"]}"#;
        assert!(matches!(
            PipelineConfig::from_json(json, Path::new("/cfg")),
            Err(AnketaError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(PipelineConfig::load("/nonexistent/anketa.json").is_err());
    }
}
