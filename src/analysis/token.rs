//! Token types produced by morphological analysis.
//!
//! Two layers live here:
//!
//! - [`WordAnalysis`] / [`Reading`] are the raw analyzer output, one entry per
//!   segment of the input (words, punctuation and whitespace alike). Their
//!   serde layout matches the line-oriented JSON of the `mystem` analyzer, so
//!   the subprocess backend can deserialize them directly.
//! - [`TokenAnalysis`] is the immutable per-token view an
//!   [`AnswerText`](crate::analysis::answer::AnswerText) owns: surface form,
//!   lemma, part of speech and confidence.
//!
//! # Examples
//!
//! ```
//! use anketa::analysis::token::{PosTag, Reading, WordAnalysis};
//!
//! let word = WordAnalysis::analyzed("скамеек", Reading::new("скамейка", "S,жен,неод=род,мн"));
//! assert_eq!(word.lemma(), "скамейка");
//! assert_eq!(word.pos(), Some(PosTag::Noun));
//! assert!(!word.is_low_confidence());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Quality marker the analyzer puts on guessed (out-of-vocabulary) readings.
pub const GUESSED_QUALITY: &str = "bastard";

/// Part-of-speech tag, the leading word of a grammar string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PosTag {
    /// `S`
    Noun,
    /// `A`
    Adjective,
    /// `V`
    Verb,
    /// `ADV`
    Adverb,
    /// `PR`
    Preposition,
    /// `CONJ`
    Conjunction,
    /// `PART`
    Particle,
    /// `INTJ`
    Interjection,
    /// `NUM`
    Numeral,
    /// `ANUM`
    OrdinalNumeral,
    /// `SPRO`
    NounPronoun,
    /// `APRO`
    AdjectivePronoun,
    /// `ADVPRO`
    AdverbPronoun,
    /// `COM`
    CompoundPart,
    /// Any tag outside the list above, kept verbatim.
    Other(String),
}

impl PosTag {
    /// Extract the tag from a grammar string such as `S,жен,неод=род,ед`.
    ///
    /// Returns `None` when the grammar string does not start with a word.
    pub fn from_grammar(grammar: &str) -> Option<Self> {
        let head: String = grammar
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if head.is_empty() {
            None
        } else {
            head.parse().ok()
        }
    }

    /// The analyzer's short code for this tag.
    pub fn code(&self) -> &str {
        match self {
            PosTag::Noun => "S",
            PosTag::Adjective => "A",
            PosTag::Verb => "V",
            PosTag::Adverb => "ADV",
            PosTag::Preposition => "PR",
            PosTag::Conjunction => "CONJ",
            PosTag::Particle => "PART",
            PosTag::Interjection => "INTJ",
            PosTag::Numeral => "NUM",
            PosTag::OrdinalNumeral => "ANUM",
            PosTag::NounPronoun => "SPRO",
            PosTag::AdjectivePronoun => "APRO",
            PosTag::AdverbPronoun => "ADVPRO",
            PosTag::CompoundPart => "COM",
            PosTag::Other(code) => code,
        }
    }
}

impl FromStr for PosTag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "S" => PosTag::Noun,
            "A" => PosTag::Adjective,
            "V" => PosTag::Verb,
            "ADV" => PosTag::Adverb,
            "PR" => PosTag::Preposition,
            "CONJ" => PosTag::Conjunction,
            "PART" => PosTag::Particle,
            "INTJ" => PosTag::Interjection,
            "NUM" => PosTag::Numeral,
            "ANUM" => PosTag::OrdinalNumeral,
            "SPRO" => PosTag::NounPronoun,
            "APRO" => PosTag::AdjectivePronoun,
            "ADVPRO" => PosTag::AdverbPronoun,
            "COM" => PosTag::CompoundPart,
            other => PosTag::Other(other.to_string()),
        })
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One reading (lemma + grammar) the analyzer proposes for a word.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// The lemma.
    pub lex: String,
    /// The grammar tag string, e.g. `S,жен,неод=им,ед`.
    #[serde(default)]
    pub gr: String,
    /// Quality marker; `bastard` for guessed readings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qual: Option<String>,
}

impl Reading {
    /// Create a dictionary reading.
    pub fn new<L: Into<String>, G: Into<String>>(lex: L, gr: G) -> Self {
        Reading {
            lex: lex.into(),
            gr: gr.into(),
            qual: None,
        }
    }

    /// Create a guessed reading for an out-of-vocabulary word.
    pub fn guessed<L: Into<String>, G: Into<String>>(lex: L, gr: G) -> Self {
        Reading {
            lex: lex.into(),
            gr: gr.into(),
            qual: Some(GUESSED_QUALITY.to_string()),
        }
    }

    /// Whether the analyzer guessed this reading.
    pub fn is_guessed(&self) -> bool {
        self.qual.as_deref() == Some(GUESSED_QUALITY)
    }
}

/// Raw analyzer output for one segment of the input text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordAnalysis {
    /// The segment exactly as it appears in the input.
    pub text: String,
    /// Readings, best first. Empty for punctuation, whitespace and
    /// unanalyzable segments.
    #[serde(default)]
    pub analysis: Vec<Reading>,
}

impl WordAnalysis {
    /// A segment without any reading.
    pub fn bare<S: Into<String>>(text: S) -> Self {
        WordAnalysis {
            text: text.into(),
            analysis: Vec::new(),
        }
    }

    /// A segment with a single reading.
    pub fn analyzed<S: Into<String>>(text: S, reading: Reading) -> Self {
        WordAnalysis {
            text: text.into(),
            analysis: vec![reading],
        }
    }

    /// The primary reading, if any.
    pub fn primary(&self) -> Option<&Reading> {
        self.analysis.first()
    }

    /// The primary lemma, or the raw text for segments without a reading.
    pub fn lemma(&self) -> &str {
        self.primary().map(|r| r.lex.as_str()).unwrap_or(&self.text)
    }

    /// The grammar string of the primary reading (empty without one).
    pub fn grammar(&self) -> &str {
        self.primary().map(|r| r.gr.as_str()).unwrap_or("")
    }

    /// Part of speech of the primary reading.
    pub fn pos(&self) -> Option<PosTag> {
        self.primary().and_then(|r| PosTag::from_grammar(&r.gr))
    }

    /// Whether the primary reading was guessed by the analyzer.
    pub fn is_low_confidence(&self) -> bool {
        self.primary().is_some_and(Reading::is_guessed)
    }

    /// Whether the segment is only whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// One analyzed token of an answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAnalysis {
    /// Surface form as written by the respondent.
    pub surface: String,
    /// Lowercased lemma.
    pub lemma: String,
    /// Part of speech, `None` for punctuation and unanalyzable tokens.
    pub pos: Option<PosTag>,
    /// Full grammar tag string of the primary reading (may be empty).
    pub grammar: String,
    /// The analyzer guessed this word (unknown or misspelled).
    pub is_low_confidence: bool,
    /// The token carries no analysis (punctuation, digits, symbols).
    pub is_whitespace_or_punct: bool,
}

impl TokenAnalysis {
    /// Build a token from the surface segment and the lemma of the second
    /// analyzer pass.
    pub fn from_analysis(word: &WordAnalysis, lemma: &str) -> Self {
        TokenAnalysis {
            surface: word.text.trim().to_string(),
            lemma: lemma.trim().to_lowercase(),
            pos: word.pos(),
            grammar: word.grammar().to_string(),
            is_low_confidence: word.is_low_confidence(),
            is_whitespace_or_punct: word.primary().is_none(),
        }
    }

    /// Whether the part of speech could not be determined.
    pub fn is_undetermined(&self) -> bool {
        self.pos.is_none()
    }
}

impl fmt::Display for TokenAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lemma)
    }
}
