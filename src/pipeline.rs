//! End-to-end classification of survey answers.
//!
//! A [`Classifier`] owns the analyzer handle, the hypothesis matcher and the
//! resolver. For each answer it tries the configured strategies in order and
//! stops at the first one that resolves; an answer nothing resolves gets one
//! more round after spelling correction.

use std::sync::Arc;

use log::{debug, info, warn};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::analyzer::MorphAnalyzer;
use crate::analysis::analyzer::lexicon::LexiconAnalyzer;
use crate::analysis::analyzer::mystem::MystemAnalyzer;
use crate::analysis::answer::AnswerText;
use crate::config::PipelineConfig;
use crate::dictionary::{
    Lexicon, ReadyAnswerDictionary, SynonymDictionary, read_wordlists,
};
use crate::error::{AnketaError, Result};
use crate::matcher::{Hypothesis, HypothesisMatcher, Strategy};
use crate::negation::NegationParser;
use crate::reader::TableAnswer;
use crate::resolver::{CategoryResolver, CategorySet, Resolution};
use crate::rules::RuleSet;
use crate::segment::Clause;
use crate::spelling::corrector::CorrectorConfig;
use crate::spelling::{DictionarySpellChecker, SpellingDictionary, SpellingNormalizer};

/// Final status of one answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    Resolved,
    Stopped { marker: String },
    Unresolved,
    Failed { reason: String },
}

impl Status {
    pub fn name(&self) -> &'static str {
        match self {
            Status::Resolved => "resolved",
            Status::Stopped { .. } => "stopped",
            Status::Unresolved => "unresolved",
            Status::Failed { .. } => "failed",
        }
    }
}

/// Classification result of one answer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Outcome {
    pub line: Option<usize>,
    pub source: String,
    pub categories: CategorySet,
    #[serde(flatten)]
    pub status: Status,
    /// Strategy that produced the result.
    pub strategy: Option<Strategy>,
    /// Whether the result came from the spelling-corrected text.
    pub spellchecked: bool,
}

impl Outcome {
    fn new(line: Option<usize>, source: &str, status: Status) -> Self {
        Outcome {
            line,
            source: source.trim().to_string(),
            categories: CategorySet::new(),
            status,
            strategy: None,
            spellchecked: false,
        }
    }

    /// Outcome of an answer that raised a per-answer error.
    pub fn failed(line: Option<usize>, source: &str, error: &AnketaError) -> Self {
        Self::new(
            line,
            source,
            Status::Failed {
                reason: error.to_string(),
            },
        )
    }
}

/// What one strategy made of an answer.
#[derive(Clone, Debug, Serialize)]
pub struct StrategyTrace {
    pub strategy: Strategy,
    pub clauses: Vec<Clause>,
    pub hypotheses: Vec<Hypothesis>,
    pub resolution: Resolution,
}

/// Every intermediate view of one answer.
#[derive(Clone, Debug, Serialize)]
pub struct Inspection {
    pub lemmas: Vec<String>,
    pub traces: Vec<StrategyTrace>,
    pub outcome: Outcome,
}

/// Survey answer classifier.
pub struct Classifier {
    analyzer: Arc<dyn MorphAnalyzer>,
    matcher: HypothesisMatcher,
    resolver: CategoryResolver,
    speller: Option<SpellingNormalizer>,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("analyzer", &self.analyzer.name())
            .field("matcher", &self.matcher)
            .field("resolver", &self.resolver)
            .field("speller", &self.speller)
            .finish()
    }
}

impl Classifier {
    pub fn new(
        analyzer: Arc<dyn MorphAnalyzer>,
        matcher: HypothesisMatcher,
        resolver: CategoryResolver,
    ) -> Self {
        Classifier {
            analyzer,
            matcher,
            resolver,
            speller: None,
        }
    }

    /// Retry unresolved answers after correcting their spelling.
    pub fn with_speller(mut self, speller: SpellingNormalizer) -> Self {
        self.speller = Some(speller);
        self
    }

    /// Build a classifier and its analyzer from a configuration.
    ///
    /// The in-process lexicon wins when configured; otherwise a `mystem`
    /// process is spawned (looked up in `PATH` when no binary is given).
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let analyzer: Arc<dyn MorphAnalyzer> = match (&config.lexicon, &config.mystem) {
            (Some(lexicon), _) => Arc::new(LexiconAnalyzer::from_csv(lexicon)?),
            (None, Some(binary)) => Arc::new(MystemAnalyzer::spawn(binary.clone())?),
            (None, None) => Arc::new(MystemAnalyzer::spawn("mystem")?),
        };
        Self::from_config_with_analyzer(config, analyzer)
    }

    /// Build a classifier around an existing analyzer.
    pub fn from_config_with_analyzer(
        config: &PipelineConfig,
        analyzer: Arc<dyn MorphAnalyzer>,
    ) -> Result<Self> {
        let negations = Lexicon::from_csv_non_empty(&config.negations)?;
        let ignorables = if config.ignorables.is_empty() {
            None
        } else {
            Some(Lexicon::from_csv(&config.ignorables)?)
        };
        let parser = Arc::new(NegationParser::new(negations, ignorables)?);

        let synonyms = Arc::new(SynonymDictionary::from_csv(&config.synonyms)?);
        let matcher = HypothesisMatcher::new(parser, synonyms)?
            .with_negation_marker(config.negation_marker.clone())
            .with_strategies(config.strategies.clone());

        let ready = ReadyAnswerDictionary::from_csv(
            &config.ready_answers,
            config.ready_answers_include_headline,
        )?;
        let mut resolver = CategoryResolver::new(Arc::new(ready));
        if let Some(path) = &config.stop_words {
            resolver = resolver.with_stop_words(read_wordlists(&[path], false)?);
        }
        if let Some(path) = &config.rules {
            resolver = resolver.with_postprocessors(RuleSet::load(path)?.postprocessors());
        }

        let mut classifier = Classifier::new(Arc::clone(&analyzer), matcher, resolver);

        let spelling_paths: Vec<_> = config
            .spelling_words
            .iter()
            .chain(&config.extra_spelling_words)
            .collect();
        if config.spellcheck_retry && !spelling_paths.is_empty() {
            let dictionary = SpellingDictionary::load_from_files(&spelling_paths)?;
            let checker = DictionarySpellChecker::with_config(
                dictionary,
                CorrectorConfig {
                    max_distance: config.spelling_max_distance,
                    cache_capacity: config.spelling_cache_capacity,
                },
            );
            classifier =
                classifier.with_speller(SpellingNormalizer::new(analyzer, Arc::new(checker)));
        }

        Ok(classifier)
    }

    pub fn analyzer(&self) -> &dyn MorphAnalyzer {
        self.analyzer.as_ref()
    }

    pub fn matcher(&self) -> &HypothesisMatcher {
        &self.matcher
    }

    pub fn resolver(&self) -> &CategoryResolver {
        &self.resolver
    }

    /// Try the strategies in order until one of them decides the answer.
    fn resolve(&self, answer: &AnswerText) -> Result<Resolution> {
        for pass in self.matcher.passes(self.analyzer.as_ref(), answer) {
            let pass = pass?;
            match self.resolver.resolve(&pass.hypotheses) {
                Resolution::Unresolved => debug!("Escalating past {}", pass.strategy),
                decided => return Ok(decided),
            }
        }
        Ok(Resolution::Unresolved)
    }

    /// Classify one raw answer.
    pub fn classify(&self, line: Option<usize>, raw: &str) -> Result<Outcome> {
        let mut answer = AnswerText::with_line(self.analyzer.as_ref(), raw, line)?;
        if answer.is_empty() {
            debug!("Answer {:?} carries no words", answer.source());
            return Ok(Outcome::new(line, raw, Status::Unresolved));
        }

        let mut resolution = self.resolve(&answer)?;
        let mut spellchecked = false;

        if let (Resolution::Unresolved, Some(speller)) = (&resolution, &self.speller) {
            let corrected = speller.correct_text(answer.source())?;
            if corrected != answer.source() {
                debug!("Retrying {:?} as {corrected:?}", answer.source());
                let retried = AnswerText::with_line(self.analyzer.as_ref(), &corrected, line)?;
                resolution = self.resolve(&retried)?;
                answer = retried;
                spellchecked = true;
            }
        }

        let mut outcome = Outcome::new(line, raw, Status::Unresolved);
        outcome.spellchecked = spellchecked;
        match resolution {
            Resolution::Resolved {
                mut categories,
                strategy,
            } => {
                self.resolver.postprocess(&answer, &mut categories);
                outcome.categories = categories;
                outcome.status = Status::Resolved;
                outcome.strategy = Some(strategy);
            }
            Resolution::Stopped { marker, strategy } => {
                outcome.status = Status::Stopped { marker };
                outcome.strategy = Some(strategy);
            }
            Resolution::Unresolved => {
                debug!("Unresolved: {:?}", outcome.source);
            }
        }
        Ok(outcome)
    }

    /// Classify one answer and keep every intermediate view.
    pub fn inspect(&self, raw: &str) -> Result<Inspection> {
        let answer = AnswerText::new(self.analyzer.as_ref(), raw)?;
        let mut traces = Vec::new();
        for pass in self.matcher.passes(self.analyzer.as_ref(), &answer) {
            let pass = pass?;
            traces.push(StrategyTrace {
                resolution: self.resolver.resolve(&pass.hypotheses),
                strategy: pass.strategy,
                clauses: pass.clauses,
                hypotheses: pass.hypotheses,
            });
        }

        Ok(Inspection {
            lemmas: answer
                .get_lemmas(false)
                .into_iter()
                .map(str::to_string)
                .collect(),
            traces,
            outcome: self.classify(None, raw)?,
        })
    }

    /// Classify a batch on a pool of `jobs` threads (`0` means one per CPU).
    ///
    /// Outcomes keep the input order. Errors that only concern one answer
    /// become [`Status::Failed`] outcomes; any other error aborts the batch.
    pub fn classify_batch(&self, answers: &[TableAnswer], jobs: usize) -> Result<Vec<Outcome>> {
        let threads = if jobs == 0 { num_cpus::get() } else { jobs };
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("anketa-classify-{i}"))
            .build()
            .map_err(|e| AnketaError::config(format!("failed to create thread pool: {e}")))?;

        let outcomes = pool.install(|| {
            answers
                .par_iter()
                .map(|answer| match self.classify(Some(answer.line), &answer.text) {
                    Ok(outcome) => Ok(outcome),
                    Err(e) if e.is_per_answer() => {
                        warn!("Line {}: {e}", answer.line);
                        Ok(Outcome::failed(Some(answer.line), &answer.text, &e))
                    }
                    Err(e) => Err(e),
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let count = |name: &str| outcomes.iter().filter(|o| o.status.name() == name).count();
        info!(
            "Classified {} answers on {threads} threads: {} resolved, {} stopped, {} unresolved, {} failed",
            outcomes.len(),
            count("resolved"),
            count("stopped"),
            count("unresolved"),
            count("failed"),
        );
        Ok(outcomes)
    }
}
