//! Category postprocessing rules.
//!
//! After an answer is resolved, its category set passes through an ordered
//! chain of [`Postprocessor`]s that merge, split or refine categories. The
//! rule tables are data: a JSON array of tagged rule objects, compiled once
//! into a [`RuleSet`].
//!
//! ```json
//! [
//!   {"kind": "exclusive", "category": "Ничего не менять"},
//!   {"kind": "conflict", "general": "Торговля",
//!    "options": ["Разрешить торговлю", "Запретить торговлю"]},
//!   {"kind": "refine", "general": "Парковки",
//!    "templates": [{"pattern": "\\bподземный (стоянка|паркинг)\\b",
//!                   "label": "устроить подземную парковку"}],
//!    "fallback": "устроить парковку", "forbid": ["вело"]},
//!   {"kind": "implies", "category": "Великан Парк", "adds": ["Кинотеатр"]}
//! ]
//! ```
//!
//! Rules run in file order, each seeing the output of the previous one.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::answer::AnswerText;
use crate::analysis::token::PosTag;
use crate::error::{AnketaError, Result};

/// Sorted set of categories assigned to one answer.
pub type CategorySet = BTreeSet<String>;

/// One step of the postprocessing chain.
pub trait Postprocessor: Send + Sync + fmt::Debug {
    /// Rewrite the categories of an answer in place.
    fn apply(&self, answer: &AnswerText, categories: &mut CategorySet);

    /// Short name for diagnostics.
    fn name(&self) -> &str;
}

static SIMPLE_NEGATION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\bнет?\b").ok());

/// Whether the answer consists of adjectives, nouns, prepositions,
/// conjunctions, adverbs and unanalyzable tokens only.
pub fn is_nonverbal(answer: &AnswerText) -> bool {
    answer.pos_tags().into_iter().all(|tag| {
        matches!(
            tag,
            None | Some(
                PosTag::Adjective
                    | PosTag::Noun
                    | PosTag::Preposition
                    | PosTag::Conjunction
                    | PosTag::Adverb
            )
        )
    })
}

fn has_simple_negation(lemmas: &str) -> bool {
    SIMPLE_NEGATION
        .as_ref()
        .is_some_and(|negation| negation.is_match(lemmas))
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// When a refining rule removes its general category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropGeneral {
    /// Only when a refined label was assigned.
    #[default]
    OnMatch,
    /// Whenever the rule fires.
    Always,
}

/// A regex over the lemma string and the label it assigns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub pattern: String,
    /// Label; `$1`, `${name}` expand to capture groups.
    pub label: String,
}

/// Rule as written in a rule table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSpec {
    /// The category replaces every other one.
    Exclusive { category: String },
    /// The category is dropped when any other one is present.
    Recessive { category: String },
    /// Any option removes the general category; all options together
    /// collapse back into it.
    Conflict { general: String, options: Vec<String> },
    /// Replace a general category by a more precise label.
    Refine {
        general: String,
        #[serde(default)]
        templates: Vec<TemplateSpec>,
        #[serde(default)]
        fallback: Option<String>,
        #[serde(default)]
        forbid: Vec<String>,
        #[serde(default)]
        drop_general: DropGeneral,
    },
    /// The category removes others.
    Suppresses { category: String, removes: Vec<String> },
    /// The category is replaced when the answer contains one of the lemmas.
    LemmaSwitch {
        category: String,
        lemmas: Vec<String>,
        replacement: String,
    },
    /// The category is dropped when its lemma is only a landmark, i.e. it
    /// is governed by a preposition ("у Пика").
    Landmark { category: String, lemma: String },
    /// The category adds others.
    Implies { category: String, adds: Vec<String> },
}

#[derive(Debug)]
struct Template {
    pattern: Regex,
    label: String,
}

/// A compiled rule.
#[derive(Debug)]
pub struct Rule {
    spec: RuleSpec,
    templates: Vec<Template>,
}

impl Rule {
    pub fn compile(spec: RuleSpec) -> Result<Self> {
        let templates = match &spec {
            RuleSpec::Refine { templates, .. } => templates
                .iter()
                .map(|t| {
                    Ok(Template {
                        pattern: Regex::new(&t.pattern)?,
                        label: t.label.clone(),
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            RuleSpec::Conflict { options, .. } if options.is_empty() => {
                return Err(AnketaError::config("conflict rule without options"));
            }
            _ => Vec::new(),
        };
        Ok(Rule { spec, templates })
    }

    pub fn spec(&self) -> &RuleSpec {
        &self.spec
    }

    fn refine_label(
        &self,
        answer: &AnswerText,
        fallback: Option<&str>,
        forbid: &[String],
    ) -> Option<String> {
        let lemmas = answer.lemma_string(false);
        for template in &self.templates {
            if let Some(captures) = template.pattern.captures(&lemmas) {
                let mut label = String::new();
                captures.expand(&template.label, &mut label);
                return Some(label);
            }
        }

        let fallback = fallback?;
        let allowed = is_nonverbal(answer)
            && !has_simple_negation(&lemmas)
            && !forbid.iter().any(|f| lemmas.contains(f.as_str()));
        allowed.then(|| fallback.to_string())
    }

    /// Whether a landmark lemma is governed by a preposition.
    fn is_landmark(answer: &AnswerText, lemma: &str) -> bool {
        let tokens = answer.tokens();
        let Some(start) = tokens.iter().position(|t| t.lemma == lemma) else {
            return false;
        };

        for index in (0..=start).rev() {
            match tokens[index].pos.as_ref() {
                Some(PosTag::Preposition) => return true,
                Some(PosTag::Adjective | PosTag::Adverb | PosTag::Noun) => {}
                // A quote right before the name.
                None if index + 1 == start => {}
                _ => return false,
            }
        }
        false
    }
}

impl Postprocessor for Rule {
    fn apply(&self, answer: &AnswerText, categories: &mut CategorySet) {
        match &self.spec {
            RuleSpec::Exclusive { category } => {
                if categories.contains(category) {
                    categories.retain(|c| c == category);
                }
            }
            RuleSpec::Recessive { category } => {
                if categories.contains(category) && categories.len() > 1 {
                    categories.remove(category);
                }
            }
            RuleSpec::Conflict { general, options } => {
                if options.iter().any(|o| categories.contains(o)) {
                    categories.remove(general);
                }
                if options.iter().all(|o| categories.contains(o)) {
                    for option in options {
                        categories.remove(option);
                    }
                    categories.insert(general.clone());
                }
            }
            RuleSpec::Refine {
                general,
                fallback,
                forbid,
                drop_general,
                ..
            } => {
                if !categories.contains(general) {
                    return;
                }
                let label = self.refine_label(answer, fallback.as_deref(), forbid);
                if label.is_some() || *drop_general == DropGeneral::Always {
                    categories.remove(general);
                }
                if let Some(label) = label {
                    categories.insert(capitalize(&label));
                }
            }
            RuleSpec::Suppresses { category, removes } => {
                if categories.contains(category) {
                    for removed in removes {
                        categories.remove(removed);
                    }
                }
            }
            RuleSpec::LemmaSwitch {
                category,
                lemmas,
                replacement,
            } => {
                if !categories.contains(category) {
                    return;
                }
                let present = answer
                    .get_lemmas(false)
                    .into_iter()
                    .any(|l| lemmas.iter().any(|wanted| wanted == l));
                if present {
                    categories.remove(category);
                    categories.insert(replacement.clone());
                }
            }
            RuleSpec::Landmark { category, lemma } => {
                if categories.contains(category) && Self::is_landmark(answer, lemma) {
                    categories.remove(category);
                }
            }
            RuleSpec::Implies { category, adds } => {
                if categories.contains(category) {
                    categories.extend(adds.iter().cloned());
                }
            }
        }
    }

    fn name(&self) -> &str {
        match &self.spec {
            RuleSpec::Exclusive { .. } => "exclusive",
            RuleSpec::Recessive { .. } => "recessive",
            RuleSpec::Conflict { .. } => "conflict",
            RuleSpec::Refine { .. } => "refine",
            RuleSpec::Suppresses { .. } => "suppresses",
            RuleSpec::LemmaSwitch { .. } => "lemma_switch",
            RuleSpec::Landmark { .. } => "landmark",
            RuleSpec::Implies { .. } => "implies",
        }
    }
}

/// An ordered table of compiled rules.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Arc<Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs<I: IntoIterator<Item = RuleSpec>>(specs: I) -> Result<Self> {
        let rules = specs
            .into_iter()
            .map(|spec| Rule::compile(spec).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        Ok(RuleSet { rules })
    }

    /// Load a JSON rule table.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AnketaError::config(format!("failed to read rules '{}': {e}", path.display()))
        })?;
        let specs: Vec<RuleSpec> = serde_json::from_str(&content)?;
        let rules = Self::from_specs(specs)?;
        debug!("Loaded {} rules from {}", rules.len(), path.display());
        Ok(rules)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rules as a postprocessing chain.
    pub fn postprocessors(&self) -> Vec<Arc<dyn Postprocessor>> {
        self.rules
            .iter()
            .map(|rule| Arc::clone(rule) as Arc<dyn Postprocessor>)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::lexicon::LexiconAnalyzer;

    fn analyzer() -> LexiconAnalyzer {
        LexiconAnalyzer::new()
            .with_entry("нужна", "нужный", "A=кр,ед,жен")
            .with_entry("подземная", "подземный", "A=им,ед,полн,жен")
            .with_entry("стоянка", "стоянка", "S,жен,неод=им,ед")
            .with_entry("парковка", "парковка", "S,жен,неод=им,ед")
            .with_entry("парковки", "парковка", "S,жен,неод=род,ед")
            .with_entry("нет", "нет", "PART=")
            .with_entry("хочу", "хотеть", "V,несов,пе=непрош,ед,изъяв,1-л")
            .with_entry("велопарковка", "велопарковка", "S,жен,неод=им,ед")
            .with_entry("у", "у", "PR=")
            .with_entry("возле", "возле", "PR=")
            .with_entry("пика", "пик", "S,муж,неод=род,ед")
            .with_entry("торговый", "торговый", "A=им,ед,полн,муж")
            .with_entry("центр", "центр", "S,муж,неод=им,ед")
            .with_entry("мост", "мост", "S,муж,неод=им,ед")
            .with_entry("к", "к", "PR=")
            .with_entry("арсеналу", "арсенал", "S,муж,неод=дат,ед")
    }

    fn set(items: &[&str]) -> CategorySet {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn apply(spec: RuleSpec, text: &str, categories: &[&str]) -> CategorySet {
        let rule = Rule::compile(spec).unwrap();
        let answer = AnswerText::new(&analyzer(), text).unwrap();
        let mut categories = set(categories);
        rule.apply(&answer, &mut categories);
        categories
    }

    fn parking() -> RuleSpec {
        RuleSpec::Refine {
            general: "Парковки".to_string(),
            templates: vec![TemplateSpec {
                pattern: r"\bподземный (стоянка|паркинг)\b".to_string(),
                label: "устроить подземную $1".to_string(),
            }],
            fallback: Some("устроить парковку".to_string()),
            forbid: vec!["вело".to_string()],
            drop_general: DropGeneral::OnMatch,
        }
    }

    #[test]
    fn test_exclusive_and_recessive() {
        let exclusive = RuleSpec::Exclusive {
            category: "Ничего не менять".to_string(),
        };
        assert_eq!(
            apply(exclusive, "", &["Ничего не менять", "Парковки"]),
            set(&["Ничего не менять"])
        );

        let recessive = RuleSpec::Recessive {
            category: "Ничего не менять".to_string(),
        };
        assert_eq!(
            apply(recessive.clone(), "", &["Ничего не менять", "Парковки"]),
            set(&["Парковки"])
        );
        assert_eq!(
            apply(recessive, "", &["Ничего не менять"]),
            set(&["Ничего не менять"])
        );
    }

    #[test]
    fn test_conflict() {
        let conflict = RuleSpec::Conflict {
            general: "Торговля".to_string(),
            options: vec!["Разрешить".to_string(), "Запретить".to_string()],
        };
        assert_eq!(
            apply(conflict.clone(), "", &["Торговля", "Разрешить"]),
            set(&["Разрешить"])
        );
        assert_eq!(
            apply(conflict.clone(), "", &["Разрешить", "Запретить", "Кафе"]),
            set(&["Кафе", "Торговля"])
        );
        assert_eq!(apply(conflict, "", &["Торговля"]), set(&["Торговля"]));
    }

    #[test]
    fn test_refine_by_template() {
        assert_eq!(
            apply(parking(), "нужна подземная стоянка", &["Парковки"]),
            set(&["Устроить подземную стоянка"])
        );
    }

    #[test]
    fn test_refine_fallback_for_nonverbal_answers() {
        assert_eq!(
            apply(parking(), "парковка", &["Парковки"]),
            set(&["Устроить парковку"])
        );
        // Negated, verbal or forbidden answers keep the general category.
        assert_eq!(apply(parking(), "нет парковки", &["Парковки"]), set(&["Парковки"]));
        assert_eq!(apply(parking(), "хочу парковка", &["Парковки"]), set(&["Парковки"]));
        assert_eq!(apply(parking(), "велопарковка", &["Парковки"]), set(&["Парковки"]));
        // Untouched without the general category.
        assert_eq!(apply(parking(), "парковка", &["Кафе"]), set(&["Кафе"]));
    }

    #[test]
    fn test_refine_drops_general_always() {
        let zoo = RuleSpec::Refine {
            general: "Зоопарк".to_string(),
            templates: vec![],
            fallback: None,
            forbid: vec![],
            drop_general: DropGeneral::Always,
        };
        assert_eq!(apply(zoo, "парковка", &["Зоопарк", "Кафе"]), set(&["Кафе"]));
    }

    #[test]
    fn test_suppresses_and_implies() {
        let suppresses = RuleSpec::Suppresses {
            category: "Благоустроить набережную".to_string(),
            removes: vec!["Набережная".to_string()],
        };
        assert_eq!(
            apply(suppresses, "", &["Благоустроить набережную", "Набережная"]),
            set(&["Благоустроить набережную"])
        );

        let implies = RuleSpec::Implies {
            category: "Великан Парк".to_string(),
            adds: vec!["Кинотеатр".to_string()],
        };
        assert_eq!(
            apply(implies, "", &["Великан Парк"]),
            set(&["Великан Парк", "Кинотеатр"])
        );
    }

    #[test]
    fn test_lemma_switch() {
        let bridge = RuleSpec::LemmaSwitch {
            category: "Мост".to_string(),
            lemmas: vec!["арсенал".to_string(), "кронверк".to_string()],
            replacement: "Мостики к музею".to_string(),
        };
        assert_eq!(
            apply(bridge.clone(), "мост к арсеналу", &["Мост"]),
            set(&["Мостики к музею"])
        );
        assert_eq!(apply(bridge, "мост", &["Мост"]), set(&["Мост"]));
    }

    #[test]
    fn test_landmark() {
        let peak = RuleSpec::Landmark {
            category: "ТК Пик".to_string(),
            lemma: "пик".to_string(),
        };
        assert_eq!(apply(peak.clone(), "парковка у «пика»", &["ТК Пик"]), set(&[]));
        assert_eq!(apply(peak.clone(), "возле торговый пика", &["ТК Пик"]), set(&[]));
        assert_eq!(apply(peak.clone(), "пика", &["ТК Пик"]), set(&["ТК Пик"]));
        assert_eq!(apply(peak, "хочу пика", &["ТК Пик"]), set(&["ТК Пик"]));
    }

    #[test]
    fn test_rule_table_from_json() {
        let json = r#"[
            {"kind": "exclusive", "category": "Ничего не менять"},
            {"kind": "refine", "general": "Парковки", "fallback": "устроить парковку"},
            {"kind": "implies", "category": "Великан Парк", "adds": ["Кинотеатр"]}
        ]"#;
        let specs: Vec<RuleSpec> = serde_json::from_str(json).unwrap();
        let rules = RuleSet::from_specs(specs).unwrap();

        assert_eq!(rules.len(), 3);
        let names: Vec<_> = rules
            .postprocessors()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["exclusive", "refine", "implies"]);
    }

    #[test]
    fn test_invalid_rules_are_rejected() {
        let bad_pattern = RuleSpec::Refine {
            general: "Парковки".to_string(),
            templates: vec![TemplateSpec {
                pattern: "(".to_string(),
                label: "x".to_string(),
            }],
            fallback: None,
            forbid: vec![],
            drop_general: DropGeneral::OnMatch,
        };
        assert!(matches!(Rule::compile(bad_pattern), Err(AnketaError::Regex(_))));

        let no_options = RuleSpec::Conflict {
            general: "Торговля".to_string(),
            options: vec![],
        };
        assert!(Rule::compile(no_options).is_err());
        assert!(RuleSet::load("/nonexistent/rules.json").is_err());
    }
}
