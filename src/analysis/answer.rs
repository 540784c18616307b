//! The analyzed representation of one survey answer.

use std::borrow::Cow;

use serde::Serialize;

use crate::analysis::analyzer::MorphAnalyzer;
use crate::analysis::token::{PosTag, TokenAnalysis, WordAnalysis};
use crate::error::{AnketaError, Result};

/// Whether a string holds at least one Cyrillic letter.
pub(crate) fn has_cyrillic(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё'))
}

/// One raw answer with its tokens, lemmas and part-of-speech tags.
///
/// Built once per answer from two analyzer passes (segmentation and
/// lemmatization). Blank segments are dropped, and so are leading tokens
/// whose lemma has no letters (quotes, dashes, bullet marks). All views are
/// computed on demand; the tokens never change after construction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnswerText {
    source: String,
    line: Option<usize>,
    tokens: Vec<TokenAnalysis>,
}

impl AnswerText {
    /// Analyze a raw answer.
    ///
    /// Fails with [`AnketaError::AnalysisDesync`] when the analyzer's two
    /// passes disagree on the number of tokens.
    pub fn new(analyzer: &dyn MorphAnalyzer, raw: &str) -> Result<Self> {
        Self::with_line(analyzer, raw, None)
    }

    /// Analyze a raw answer read from the given table line.
    pub fn with_line(analyzer: &dyn MorphAnalyzer, raw: &str, line: Option<usize>) -> Result<Self> {
        let source = raw.trim().to_string();

        let words: Vec<WordAnalysis> = analyzer
            .analyze(&source)?
            .into_iter()
            .filter(|w| !w.is_blank())
            .collect();
        let lemmas: Vec<String> = analyzer
            .lemmatize(&source)?
            .into_iter()
            .filter(|l| !l.trim().is_empty())
            .collect();

        if words.len() != lemmas.len() {
            return Err(AnketaError::AnalysisDesync {
                surface: words.len(),
                lemmas: lemmas.len(),
            });
        }

        let tokens = words
            .iter()
            .zip(&lemmas)
            .skip_while(|(_, lemma)| !lemma.chars().any(char::is_alphabetic))
            .map(|(word, lemma)| TokenAnalysis::from_analysis(word, lemma))
            .collect();

        Ok(AnswerText {
            source,
            line,
            tokens,
        })
    }

    /// The trimmed raw answer.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Table line the answer came from, if known.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// All tokens, punctuation included.
    pub fn tokens(&self) -> &[TokenAnalysis] {
        &self.tokens
    }

    /// Number of tokens (punctuation included).
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Lemmas of the answer, optionally without tokens whose part of speech is
    /// undetermined.
    pub fn get_lemmas(&self, skip_punctuation: bool) -> Vec<&str> {
        self.tokens
            .iter()
            .filter(|t| !skip_punctuation || !t.is_undetermined())
            .map(|t| t.lemma.as_str())
            .collect()
    }

    /// Lemmas joined with single spaces.
    pub fn lemma_string(&self, skip_punctuation: bool) -> String {
        self.get_lemmas(skip_punctuation).join(" ")
    }

    /// Part-of-speech tag of every token.
    pub fn pos_tags(&self) -> Vec<Option<&PosTag>> {
        self.tokens.iter().map(|t| t.pos.as_ref()).collect()
    }

    /// Grammar strings of the tokens that carry an analysis.
    pub fn grammars(&self) -> impl Iterator<Item = &str> {
        self.tokens
            .iter()
            .filter(|t| !t.is_whitespace_or_punct)
            .map(|t| t.grammar.as_str())
    }

    /// Surface forms of all tokens.
    pub fn surfaces(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.surface.as_str()).collect()
    }

    /// True when the answer carries no recognizable word: every token is
    /// either POS-undetermined or has no Cyrillic letter.
    pub fn is_empty(&self) -> bool {
        self.tokens
            .iter()
            .all(|t| t.is_undetermined() || !has_cyrillic(&t.lemma))
    }

    /// The answer truncated right before its first POS-undetermined token.
    ///
    /// Returns `self` (borrowed, not a copy) when every token has a part of
    /// speech.
    pub fn shorten(&self) -> Cow<'_, AnswerText> {
        match self.tokens.iter().position(TokenAnalysis::is_undetermined) {
            Some(cut) => Cow::Owned(AnswerText {
                source: self.source.clone(),
                line: self.line,
                tokens: self.tokens[..cut].to_vec(),
            }),
            None => Cow::Borrowed(self),
        }
    }
}
