//! Hypothesis generation.
//!
//! For every normalization strategy the matcher turns an answer into one or
//! more polarity-tagged clauses and proposes, per clause, the texts the
//! resolver should look up in the ready-answer dictionary: the clause itself,
//! the category of the clause when the whole clause is a keyword, and the
//! category of every keyword found inside it. Negated candidates carry the
//! negation marker as prefix, so "нет скамеек" proposes "нет скамейка" and
//! "нет Скамейки".

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::MorphAnalyzer;
use crate::analysis::answer::AnswerText;
use crate::dictionary::SynonymDictionary;
use crate::error::{AnketaError, Result};
use crate::negation::NegationParser;
use crate::search::PrioritySearcher;
use crate::segment::{Clause, ClauseSegmenter};

/// Default polarity prefix of negated hypotheses.
pub const DEFAULT_NEGATION_MARKER: &str = "нет";

/// How an answer is normalized into clauses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// The whole answer, punctuation dropped, as one clause.
    Raw,
    /// Clause segmentation of the raw answer.
    Clauses,
    /// The answer cut before its first unanalyzable token, as one clause.
    Shortened,
}

impl Strategy {
    /// Escalation order used when none is configured.
    pub const DEFAULT_ORDER: [Strategy; 3] = [Strategy::Raw, Strategy::Clauses, Strategy::Shortened];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Raw => "raw",
            Strategy::Clauses => "clauses",
            Strategy::Shortened => "shortened",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = AnketaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Ok(Strategy::Raw),
            "clauses" => Ok(Strategy::Clauses),
            "shortened" => Ok(Strategy::Shortened),
            other => Err(AnketaError::config(format!("unknown strategy: {other}"))),
        }
    }
}

/// Where a hypothesis text comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The normalized clause text itself.
    Initial,
    /// The category of a clause that is a keyword as a whole.
    Exact,
    /// The category of a keyword found inside the clause.
    Substring,
}

/// A candidate text for the ready-answer lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Hypothesis {
    pub text: String,
    pub match_kind: MatchKind,
    pub source_strategy: Strategy,
    /// Index of the clause within its strategy.
    pub clause: usize,
    pub polarity: bool,
}

/// What one strategy made of an answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StrategyPass {
    pub strategy: Strategy,
    pub clauses: Vec<Clause>,
    pub hypotheses: Vec<Hypothesis>,
}

/// Produces ranked hypotheses for answers.
#[derive(Debug)]
pub struct HypothesisMatcher {
    parser: Arc<NegationParser>,
    segmenter: ClauseSegmenter,
    dictionary: Arc<SynonymDictionary>,
    searcher: PrioritySearcher,
    negation_marker: String,
    strategies: Vec<Strategy>,
}

impl HypothesisMatcher {
    pub fn new(parser: Arc<NegationParser>, dictionary: Arc<SynonymDictionary>) -> Result<Self> {
        Ok(HypothesisMatcher {
            segmenter: ClauseSegmenter::new(Arc::clone(&parser))?,
            searcher: PrioritySearcher::new(Arc::clone(&dictionary))?,
            parser,
            dictionary,
            negation_marker: DEFAULT_NEGATION_MARKER.to_string(),
            strategies: Strategy::DEFAULT_ORDER.to_vec(),
        })
    }

    /// Set the prefix of negated hypotheses.
    pub fn with_negation_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.negation_marker = marker.into();
        self
    }

    /// Set the strategies and their escalation order.
    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Use another synonym dictionary. The searcher recompiles only when the
    /// instance differs.
    pub fn with_dictionary(mut self, dictionary: Arc<SynonymDictionary>) -> Result<Self> {
        self.searcher.bind(&dictionary)?;
        self.dictionary = dictionary;
        Ok(self)
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn dictionary(&self) -> &SynonymDictionary {
        &self.dictionary
    }

    pub fn searcher(&self) -> &PrioritySearcher {
        &self.searcher
    }

    pub fn segmenter(&self) -> &ClauseSegmenter {
        &self.segmenter
    }

    fn single_clause(&self, answer: &AnswerText) -> Clause {
        let outcome = self.parser.parse(&answer.get_lemmas(true));
        Clause::new(outcome.text(), outcome.polarity)
    }

    /// Clauses of an answer under one strategy.
    pub fn clauses(
        &self,
        analyzer: &dyn MorphAnalyzer,
        strategy: Strategy,
        answer: &AnswerText,
    ) -> Result<Vec<Clause>> {
        match strategy {
            Strategy::Raw => Ok(vec![self.single_clause(answer)]),
            Strategy::Clauses => self.segmenter.to_chunks(analyzer, answer.source()),
            Strategy::Shortened => Ok(vec![self.single_clause(&answer.shorten())]),
        }
    }

    /// Apply the polarity prefix. Empty affirmative texts yield nothing.
    fn with_polarity(&self, text: &str, polarity: bool) -> Option<String> {
        match (polarity, text.is_empty()) {
            (true, true) => None,
            (true, false) => Some(text.to_string()),
            (false, true) => Some(self.negation_marker.clone()),
            (false, false) => Some(format!("{} {text}", self.negation_marker)),
        }
    }

    /// Hypotheses of one clause, in generation order, without repeats.
    pub fn clause_hypotheses(
        &self,
        strategy: Strategy,
        index: usize,
        clause: &Clause,
    ) -> Vec<Hypothesis> {
        let mut candidates: Vec<(String, MatchKind)> = Vec::new();
        let mut propose = |text: &str, kind: MatchKind| {
            if let Some(text) = self.with_polarity(text, clause.polarity) {
                if !candidates.iter().any(|(known, _)| *known == text) {
                    candidates.push((text, kind));
                }
            }
        };

        propose(&clause.text, MatchKind::Initial);
        if let Some(category) = self.dictionary.category(&clause.text) {
            propose(category, MatchKind::Exact);
        }
        for found in self.searcher.find_matches(&clause.text) {
            debug!("Found keyword {:?} in {:?}", found.keyword, clause.text);
            propose(found.category, MatchKind::Substring);
        }

        candidates
            .into_iter()
            .map(|(text, match_kind)| Hypothesis {
                text,
                match_kind,
                source_strategy: strategy,
                clause: index,
                polarity: clause.polarity,
            })
            .collect()
    }

    /// Clauses and hypotheses of an answer under one strategy.
    pub fn pass(
        &self,
        analyzer: &dyn MorphAnalyzer,
        strategy: Strategy,
        answer: &AnswerText,
    ) -> Result<StrategyPass> {
        let clauses = self.clauses(analyzer, strategy, answer)?;
        let hypotheses = clauses
            .iter()
            .enumerate()
            .flat_map(|(index, clause)| self.clause_hypotheses(strategy, index, clause))
            .collect();
        Ok(StrategyPass {
            strategy,
            clauses,
            hypotheses,
        })
    }

    /// Passes of every configured strategy, in strategy order.
    ///
    /// A pass is only computed when the iterator reaches it, so callers that
    /// stop at the first decisive strategy never segment the answer for the
    /// later ones.
    pub fn passes<'a>(
        &'a self,
        analyzer: &'a dyn MorphAnalyzer,
        answer: &'a AnswerText,
    ) -> impl Iterator<Item = Result<StrategyPass>> + 'a {
        self.strategies
            .iter()
            .map(move |&strategy| self.pass(analyzer, strategy, answer))
    }
}
