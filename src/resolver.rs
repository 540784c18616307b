//! Resolution of hypotheses into categories.

use std::sync::Arc;

use ahash::AHashSet;
use log::{debug, info};
use serde::Serialize;

use crate::analysis::answer::AnswerText;
use crate::dictionary::ReadyAnswerDictionary;
use crate::matcher::{Hypothesis, Strategy};
pub use crate::rules::CategorySet;
use crate::rules::Postprocessor;

/// Result of walking the hypotheses of an answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// Categories found by the given strategy.
    Resolved {
        categories: CategorySet,
        strategy: Strategy,
    },
    /// A stop-word hypothesis aborted the answer.
    Stopped { marker: String, strategy: Strategy },
    /// No strategy resolved anything.
    Unresolved,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }
}

/// Looks hypotheses up in the ready-answer dictionary and postprocesses the
/// resulting categories.
#[derive(Debug)]
pub struct CategoryResolver {
    ready: Arc<ReadyAnswerDictionary>,
    stop_words: AHashSet<String>,
    postprocessors: Vec<Arc<dyn Postprocessor>>,
}

impl CategoryResolver {
    pub fn new(ready: Arc<ReadyAnswerDictionary>) -> Self {
        CategoryResolver {
            ready,
            stop_words: AHashSet::new(),
            postprocessors: Vec::new(),
        }
    }

    /// Hypothesis texts that abort an answer (compared case-insensitively).
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        self
    }

    /// Append a postprocessor to the chain.
    pub fn with_postprocessor(mut self, postprocessor: Arc<dyn Postprocessor>) -> Self {
        self.postprocessors.push(postprocessor);
        self
    }

    /// Append several postprocessors, keeping their order.
    pub fn with_postprocessors<I>(mut self, postprocessors: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Postprocessor>>,
    {
        self.postprocessors.extend(postprocessors);
        self
    }

    pub fn ready_answers(&self) -> &ReadyAnswerDictionary {
        &self.ready
    }

    pub fn postprocessors(&self) -> &[Arc<dyn Postprocessor>] {
        &self.postprocessors
    }

    fn is_stop_word(&self, text: &str) -> bool {
        self.stop_words.contains(&text.to_lowercase())
    }

    /// Resolve hypotheses given in strategy, clause, generation order.
    ///
    /// Within a (strategy, clause) group the first ready answer wins. A stop
    /// word met before any hit aborts the answer; after a hit it only ends
    /// its own group. The first strategy that
    /// resolves at least one clause is returned with the union of its
    /// clauses' categories.
    pub fn resolve(&self, hypotheses: &[Hypothesis]) -> Resolution {
        let mut groups = hypotheses
            .chunk_by(|a, b| a.source_strategy == b.source_strategy && a.clause == b.clause)
            .peekable();

        while let Some(first) = groups.peek() {
            let strategy = first[0].source_strategy;
            let mut categories = CategorySet::new();

            while let Some(group) = groups.next_if(|g| g[0].source_strategy == strategy) {
                for hypothesis in group {
                    if self.is_stop_word(&hypothesis.text) {
                        if !categories.is_empty() {
                            debug!("Ignoring {:?} after an earlier hit", hypothesis.text);
                            break;
                        }
                        info!("Stopped by {:?}", hypothesis.text);
                        return Resolution::Stopped {
                            marker: hypothesis.text.clone(),
                            strategy,
                        };
                    }
                    if let Some(category) = self.ready.get(&hypothesis.text) {
                        debug!(
                            "{:?} resolved to {category:?} ({:?}, {strategy})",
                            hypothesis.text, hypothesis.match_kind
                        );
                        categories.insert(category.to_string());
                        break;
                    }
                }
            }

            if !categories.is_empty() {
                return Resolution::Resolved {
                    categories,
                    strategy,
                };
            }
            debug!("Strategy {strategy} resolved nothing");
        }

        Resolution::Unresolved
    }

    /// Run the postprocessing chain in order.
    pub fn postprocess(&self, answer: &AnswerText, categories: &mut CategorySet) {
        for postprocessor in &self.postprocessors {
            postprocessor.apply(answer, categories);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::lexicon::LexiconAnalyzer;
    use crate::matcher::MatchKind;
    use crate::rules::{Rule, RuleSpec};

    fn hypothesis(text: &str, strategy: Strategy, clause: usize) -> Hypothesis {
        Hypothesis {
            text: text.to_string(),
            match_kind: MatchKind::Initial,
            source_strategy: strategy,
            clause,
            polarity: true,
        }
    }

    fn resolver() -> CategoryResolver {
        let ready = ReadyAnswerDictionary::from_pairs([
            ("нет скамейки", "Убрать скамейки"),
            ("скамейки", "Скамейки"),
            ("урны", "Урны"),
            ("дерево", "Озеленение"),
        ]);
        CategoryResolver::new(Arc::new(ready)).with_stop_words(["Не знаю"])
    }

    fn categories(resolution: &Resolution) -> Vec<&str> {
        match resolution {
            Resolution::Resolved { categories, .. } => {
                categories.iter().map(String::as_str).collect()
            }
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_first_hit_per_clause() {
        let hypotheses = vec![
            hypothesis("нет скамейка", Strategy::Raw, 0),
            hypothesis("нет Скамейки", Strategy::Raw, 0),
            hypothesis("Скамейки", Strategy::Raw, 0),
        ];
        let resolution = resolver().resolve(&hypotheses);
        assert_eq!(categories(&resolution), vec!["Убрать скамейки"]);
    }

    #[test]
    fn test_union_of_clauses() {
        let hypotheses = vec![
            hypothesis("скамейки", Strategy::Clauses, 0),
            hypothesis("мусор", Strategy::Clauses, 1),
            hypothesis("урны", Strategy::Clauses, 2),
        ];
        let resolution = resolver().resolve(&hypotheses);
        assert_eq!(categories(&resolution), vec!["Скамейки", "Урны"]);
    }

    #[test]
    fn test_escalation_to_next_strategy() {
        let hypotheses = vec![
            hypothesis("скамейка урна", Strategy::Raw, 0),
            hypothesis("дерево", Strategy::Clauses, 0),
            hypothesis("урны", Strategy::Shortened, 0),
        ];
        let resolution = resolver().resolve(&hypotheses);
        assert_eq!(
            resolution,
            Resolution::Resolved {
                categories: ["Озеленение".to_string()].into(),
                strategy: Strategy::Clauses,
            }
        );
    }

    #[test]
    fn test_stop_word_before_any_hit_aborts_answer() {
        let hypotheses = vec![
            hypothesis("не знаю", Strategy::Clauses, 0),
            hypothesis("скамейки", Strategy::Clauses, 1),
        ];
        assert_eq!(
            resolver().resolve(&hypotheses),
            Resolution::Stopped {
                marker: "не знаю".to_string(),
                strategy: Strategy::Clauses,
            }
        );
    }

    #[test]
    fn test_stop_word_in_later_clause_keeps_hits() {
        let hypotheses = vec![
            hypothesis("скамейки", Strategy::Clauses, 0),
            hypothesis("не знаю", Strategy::Clauses, 1),
            hypothesis("урны", Strategy::Clauses, 1),
            hypothesis("дерево", Strategy::Clauses, 2),
        ];
        assert_eq!(
            resolver().resolve(&hypotheses),
            Resolution::Resolved {
                categories: ["Озеленение".to_string(), "Скамейки".to_string()].into(),
                strategy: Strategy::Clauses,
            }
        );
    }

    #[test]
    fn test_stop_word_after_hit_in_group_is_ignored() {
        let hypotheses = vec![
            hypothesis("скамейки", Strategy::Raw, 0),
            hypothesis("не знаю", Strategy::Raw, 0),
        ];
        assert!(resolver().resolve(&hypotheses).is_resolved());
    }

    #[test]
    fn test_unresolved() {
        assert_eq!(resolver().resolve(&[]), Resolution::Unresolved);
        let hypotheses = vec![hypothesis("мусор", Strategy::Raw, 0)];
        assert_eq!(resolver().resolve(&hypotheses), Resolution::Unresolved);
    }

    #[test]
    fn test_postprocessing_runs_in_order() {
        let implies = Rule::compile(RuleSpec::Implies {
            category: "Скамейки".to_string(),
            adds: vec!["Ничего не менять".to_string()],
        })
        .unwrap();
        let exclusive = Rule::compile(RuleSpec::Exclusive {
            category: "Ничего не менять".to_string(),
        })
        .unwrap();
        let resolver = resolver()
            .with_postprocessor(Arc::new(implies))
            .with_postprocessor(Arc::new(exclusive));

        let answer = AnswerText::new(&LexiconAnalyzer::new(), "скамейки").unwrap();
        let mut categories: CategorySet = ["Скамейки".to_string()].into();
        resolver.postprocess(&answer, &mut categories);

        assert_eq!(resolver.postprocessors().len(), 2);
        assert_eq!(categories, ["Ничего не менять".to_string()].into());
    }
}
