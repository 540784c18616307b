//! Leading-trigger stripping with polarity tracking.

use std::sync::Arc;

use regex::Regex;
use serde::Serialize;

use crate::dictionary::Lexicon;
use crate::error::{AnketaError, Result};

/// Result of parsing one lemma sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NegationOutcome {
    /// Lemmas left after the leading triggers were stripped.
    pub tokens: Vec<String>,
    /// False when at least one negation trigger was stripped.
    pub polarity: bool,
    /// Grammar hints of the last stripped trigger.
    pub hints: Vec<String>,
    /// The last stripped trigger, if any.
    pub trigger: Option<String>,
}

impl NegationOutcome {
    /// Remaining lemmas joined with single spaces.
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }

    /// Whether any trigger was stripped.
    pub fn has_trigger(&self) -> bool {
        self.trigger.is_some()
    }
}

/// Strips negation and ignorable triggers from the start of a lemma
/// sequence.
///
/// ```
/// use anketa::dictionary::Lexicon;
/// use anketa::negation::NegationParser;
///
/// let negations = Lexicon::new().with_trigger("нет", ["род"]);
/// let ignorables = Lexicon::from_words(["очень"]);
/// let parser = NegationParser::new(negations, Some(ignorables)).unwrap();
///
/// let outcome = parser.parse(&["очень", "нет", "скамейка"]);
/// assert_eq!(outcome.tokens, vec!["скамейка"]);
/// assert!(!outcome.polarity);
/// assert_eq!(outcome.hints, vec!["род"]);
/// ```
#[derive(Clone, Debug)]
pub struct NegationParser {
    negations: Arc<Lexicon>,
    ignorables: Option<Arc<Lexicon>>,
    negation_pattern: Regex,
    ignorable_pattern: Option<Regex>,
}

/// Start-anchored, word-bounded alternation of the triggers in lexicon
/// order. `None` for an empty lexicon.
fn compile_triggers(lexicon: &Lexicon) -> Result<Option<Regex>> {
    if lexicon.is_empty() {
        return Ok(None);
    }
    let alternatives: Vec<String> = lexicon.triggers().map(regex::escape).collect();
    let pattern = format!(r"^\b(?:{})\b", alternatives.join("|"));
    Ok(Some(Regex::new(&pattern)?))
}

impl NegationParser {
    /// Compile a parser. The negation lexicon must not be empty; an empty
    /// ignorable lexicon is the same as none.
    pub fn new(negations: Lexicon, ignorables: Option<Lexicon>) -> Result<Self> {
        Self::from_shared(Arc::new(negations), ignorables.map(Arc::new))
    }

    /// Compile a parser over lexicons that are already shared.
    pub fn from_shared(negations: Arc<Lexicon>, ignorables: Option<Arc<Lexicon>>) -> Result<Self> {
        let negation_pattern = compile_triggers(&negations)?
            .ok_or_else(|| AnketaError::empty_dictionary("negation lexicon has no triggers"))?;
        let ignorable_pattern = match &ignorables {
            Some(lexicon) => compile_triggers(lexicon)?,
            None => None,
        };

        Ok(NegationParser {
            negations,
            ignorables: ignorable_pattern.as_ref().and(ignorables),
            negation_pattern,
            ignorable_pattern,
        })
    }

    /// Negation lexicon.
    pub fn negations(&self) -> &Lexicon {
        &self.negations
    }

    /// Ignorable lexicon, if one with triggers was given.
    pub fn ignorables(&self) -> Option<&Lexicon> {
        self.ignorables.as_deref()
    }

    /// Parse a lemma sequence.
    ///
    /// Each pass strips one leading negation trigger and then one leading
    /// ignorable trigger; passes repeat until one strips nothing. Any stripped
    /// negation makes the outcome negative; two negations do not cancel out.
    pub fn parse<S: AsRef<str>>(&self, lemmas: &[S]) -> NegationOutcome {
        let joined = lemmas
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let mut rest = joined.trim_start();
        let mut polarity = true;
        let mut trigger: Option<&str> = None;

        loop {
            let mut stripped = false;

            if let Some(m) = self.negation_pattern.find(rest) {
                trigger = Some(m.as_str());
                rest = rest[m.end()..].trim_start();
                polarity = false;
                stripped = true;
            }
            if let Some(m) = self.ignorable_pattern.as_ref().and_then(|p| p.find(rest)) {
                trigger = Some(m.as_str());
                rest = rest[m.end()..].trim_start();
                stripped = true;
            }

            if !stripped {
                break;
            }
        }

        let hints = trigger
            .and_then(|t| {
                self.negations
                    .hints(t)
                    .or_else(|| self.ignorables.as_ref().and_then(|i| i.hints(t)))
            })
            .map(<[String]>::to_vec)
            .unwrap_or_default();

        NegationOutcome {
            tokens: rest.split_whitespace().map(str::to_string).collect(),
            polarity,
            hints,
            trigger: trigger.map(str::to_string),
        }
    }
}
