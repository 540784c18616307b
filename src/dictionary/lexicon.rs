//! Trigger lexicons for negation parsing.
//!
//! A lexicon maps trigger phrases (`нет`, `не хватать`, `больше`) to the
//! grammar hints that a continuation clause must agree with. For example,
//! `нет` governs the genitive, so its hint is `род`: in "нет скамеек, урн"
//! the genitive "урн" continues the negated topic.
//!
//! File format: headerless CSV, trigger in the first cell, hints after it.

use std::path::Path;

use ahash::AHashMap;
use csv::ReaderBuilder;

use crate::error::{AnketaError, Result};

/// An ordered trigger → grammar hints mapping.
///
/// Order matters: when several triggers could match at the same place, the
/// one declared first wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lexicon {
    entries: Vec<(String, Vec<String>)>,
    index: AHashMap<String, usize>,
}

impl Lexicon {
    /// Create an empty lexicon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a lexicon of triggers without hints.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lexicon = Lexicon::new();
        for word in words {
            lexicon.insert(word.as_ref(), Vec::<String>::new());
        }
        lexicon
    }

    /// Add a trigger with hints (builder style).
    pub fn with_trigger<I, S>(mut self, trigger: &str, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(trigger, hints);
        self
    }

    /// Add a trigger. Triggers are lowercased; hints of a repeated trigger are
    /// merged into the first declaration.
    pub fn insert<I, S>(&mut self, trigger: &str, hints: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let trigger = trigger.trim().to_lowercase();
        if trigger.is_empty() {
            return;
        }

        let slot = match self.index.get(&trigger) {
            Some(&slot) => slot,
            None => {
                self.entries.push((trigger.clone(), Vec::new()));
                self.index.insert(trigger, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let known = &mut self.entries[slot].1;
        for hint in hints {
            let hint = hint.into();
            if !hint.is_empty() && !known.contains(&hint) {
                known.push(hint);
            }
        }
    }

    /// Load lexicon files.
    pub fn from_csv<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut lexicon = Lexicon::new();
        for path in paths {
            let mut reader = ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .trim(csv::Trim::All)
                .from_path(path.as_ref())?;
            for record in reader.records() {
                let record = record?;
                if let Some(trigger) = record.get(0) {
                    lexicon.insert(trigger, record.iter().skip(1).map(str::to_string));
                }
            }
        }
        Ok(lexicon)
    }

    /// Load lexicon files that must yield at least one trigger.
    pub fn from_csv_non_empty<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let lexicon = Self::from_csv(paths)?;
        if lexicon.is_empty() {
            let names: Vec<_> = paths
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect();
            return Err(AnketaError::empty_dictionary(names.join(", ")));
        }
        Ok(lexicon)
    }

    /// Hints of a trigger, `None` for unknown triggers.
    pub fn hints(&self, trigger: &str) -> Option<&[String]> {
        self.index
            .get(trigger)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    /// Whether the trigger is declared.
    pub fn contains(&self, trigger: &str) -> bool {
        self.index.contains_key(trigger)
    }

    /// Triggers in declaration order.
    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    /// Number of triggers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the lexicon has no triggers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_insert_merges_hints() {
        let lexicon = Lexicon::new()
            .with_trigger("Нет", ["род"])
            .with_trigger("мало", ["род"])
            .with_trigger("нет", ["род", "мн"]);

        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.triggers().collect::<Vec<_>>(), vec!["нет", "мало"]);
        assert_eq!(
            lexicon.hints("нет"),
            Some(&["род".to_string(), "мн".to_string()][..])
        );
        assert_eq!(lexicon.hints("больше"), None);
    }

    #[test]
    fn test_from_words() {
        let lexicon = Lexicon::from_words(["очень", "", "очень", "просто"]);
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.hints("очень"), Some(&[][..]));
    }

    #[test]
    fn test_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "нет,род").unwrap();
        writeln!(file, "не хватать,род").unwrap();
        writeln!(file, "не").unwrap();
        file.flush().unwrap();

        let lexicon = Lexicon::from_csv(&[file.path()]).unwrap();
        assert_eq!(lexicon.len(), 3);
        assert!(lexicon.contains("не хватать"));
        assert_eq!(lexicon.hints("не"), Some(&[][..]));
    }

    #[test]
    fn test_empty_lexicon_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            Lexicon::from_csv_non_empty(&[file.path()]),
            Err(AnketaError::EmptyDictionary(_))
        ));
    }
}
