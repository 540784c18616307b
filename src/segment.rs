//! Clause segmentation with polarity tracking.
//!
//! A single answer frequently mixes topics with different polarity: "нет
//! скамеек, урн, но больше деревьев" is a complaint about benches and bins
//! and a wish for trees. [`ClauseSegmenter::to_chunks`] splits the raw
//! answer on commas and dashes, parses every part for negation and merges
//! consecutive parts into clauses while a negated topic is being continued.
//!
//! A part without hints of its own inherits the topic of the previous clause
//! when one of its tokens agrees grammatically with the hints of the last
//! trigger. For "нет скамеек, урн" the trigger "нет" hints the genitive
//! (`род`) and "урн" is genitive, so "урн" becomes a negated clause of its
//! own. Agreeing parts after an affirmative trigger are merged into one
//! clause instead.

use std::sync::Arc;

use fancy_regex::Regex;
use log::trace;
use serde::Serialize;

use crate::analysis::analyzer::MorphAnalyzer;
use crate::analysis::answer::AnswerText;
use crate::error::Result;
use crate::negation::NegationParser;

/// Separators: runs of commas or a spaced dash, unless the separator follows
/// a one-letter word or introduces a relative clause.
const SEPARATOR_PATTERN: &str =
    r"(?i)(?<!\b\w)\s*(?:,+| -)(?! (?:котор|\w{1,3}\s+котор|где|что|а |как))";

const CONJUNCTION: &str = " и ";
const NOMINATIVE: &str = "им";
const NOUN_MARK: char = 'S';

/// A polarity-tagged clause of an answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Clause {
    /// Normalized clause text: lemmas with the leading triggers removed.
    pub text: String,
    /// False for negated clauses.
    pub polarity: bool,
}

impl Clause {
    pub fn new<S: Into<String>>(text: S, polarity: bool) -> Self {
        Clause {
            text: text.into(),
            polarity,
        }
    }
}

/// The clause being assembled.
struct Chunk {
    parts: Vec<String>,
    polarity: bool,
    hints: Vec<String>,
}

impl Chunk {
    fn start(text: String, polarity: bool, hints: Vec<String>) -> Self {
        let mut chunk = Chunk {
            parts: Vec::new(),
            polarity,
            hints,
        };
        chunk.push(text);
        chunk
    }

    fn push(&mut self, text: String) {
        if !text.is_empty() {
            self.parts.push(text);
        }
    }

    fn into_clause(self) -> Clause {
        Clause::new(self.parts.join(", "), self.polarity)
    }
}

/// Splits answers into polarity-tagged clauses.
#[derive(Clone, Debug)]
pub struct ClauseSegmenter {
    parser: Arc<NegationParser>,
    separator: Regex,
}

impl ClauseSegmenter {
    pub fn new(parser: Arc<NegationParser>) -> Result<Self> {
        Ok(ClauseSegmenter {
            parser,
            separator: Regex::new(SEPARATOR_PATTERN)?,
        })
    }

    /// The negation parser used on every part.
    pub fn parser(&self) -> &NegationParser {
        &self.parser
    }

    /// Split a raw sentence on separators; parts are trimmed and blank parts
    /// dropped.
    pub fn split<'a>(&self, sentence: &'a str) -> Result<Vec<&'a str>> {
        let mut parts = Vec::new();
        let mut last = 0;
        for found in self.separator.find_iter(sentence) {
            let found = found?;
            parts.push(&sentence[last..found.start()]);
            last = found.end();
        }
        parts.push(&sentence[last..]);

        Ok(parts
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect())
    }

    /// Split a part on " и " when it enumerates nominative nouns ("скамейки
    /// и урны"). Every sub-part must hold a noun and all nouns must be
    /// nominative, otherwise the part stays whole.
    fn split_enumeration<'a>(
        &self,
        analyzer: &dyn MorphAnalyzer,
        part: &'a str,
    ) -> Result<Vec<&'a str>> {
        if !part.contains(CONJUNCTION) {
            return Ok(vec![part]);
        }

        let subparts: Vec<&str> = part.split(CONJUNCTION).collect();
        for subpart in &subparts {
            let analyzed = AnswerText::new(analyzer, subpart)?;
            let nouns: Vec<&str> = analyzed
                .grammars()
                .filter(|gr| gr.contains(NOUN_MARK))
                .collect();
            if nouns.is_empty() || !nouns.iter().all(|gr| gr.contains(NOMINATIVE)) {
                return Ok(vec![part]);
            }
        }

        Ok(subparts
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect())
    }

    /// Segment a raw answer into clauses.
    pub fn to_chunks(&self, analyzer: &dyn MorphAnalyzer, sentence: &str) -> Result<Vec<Clause>> {
        let mut parts = Vec::new();
        for part in self.split(sentence)? {
            parts.extend(self.split_enumeration(analyzer, part)?);
        }

        let mut clauses = Vec::new();
        let mut current: Option<Chunk> = None;

        for part in parts {
            let analyzed = AnswerText::new(analyzer, part)?;
            let outcome = self.parser.parse(&analyzed.get_lemmas(false));
            let text = outcome.text();
            trace!("Part {part:?}: {text:?} (polarity {})", outcome.polarity);

            current = Some(match current.take() {
                // A negation always opens a new topic.
                chunk if !outcome.polarity => {
                    clauses.extend(chunk.map(Chunk::into_clause));
                    Chunk::start(text, false, outcome.hints)
                }
                None => Chunk::start(text, true, outcome.hints),
                Some(chunk) if chunk.hints.is_empty() || !outcome.hints.is_empty() => {
                    clauses.push(chunk.into_clause());
                    Chunk::start(text, true, outcome.hints)
                }
                Some(mut chunk) if agrees_with(&chunk.hints, &analyzed) => {
                    if chunk.polarity {
                        chunk.push(text);
                        chunk
                    } else {
                        let hints = std::mem::take(&mut chunk.hints);
                        clauses.push(chunk.into_clause());
                        Chunk::start(text, false, hints)
                    }
                }
                Some(chunk) => {
                    clauses.push(chunk.into_clause());
                    Chunk::start(text, true, outcome.hints)
                }
            });
        }

        clauses.extend(current.map(Chunk::into_clause));
        Ok(clauses)
    }
}

/// Whether any analyzed token's grammar contains one of the hints.
fn agrees_with(hints: &[String], part: &AnswerText) -> bool {
    part.grammars()
        .any(|grammar| hints.iter().any(|hint| grammar.contains(hint.as_str())))
}
