use std::fs;
use std::path::Path;

use anketa::config::PipelineConfig;
use anketa::output::{OutputPaths, OutputWriter, Route, RouteCounts, Router};
use anketa::pipeline::{Classifier, Status};
use anketa::reader::read_columns;
use tempfile::{TempDir, tempdir};

const LEXICON: &str = "\
# form,lemma,grammar
нет,нет,PRAEDIC=
но,но,CONJ=
и,и,CONJ=
больше,больше,ADV=сравн
машины,машина,\"S,жен,неод=им,мн\"
скамейки,скамейка,\"S,жен,неод=им,мн\"
скамеек,скамейка,\"S,жен,неод=род,мн\"
урны,урна,\"S,жен,неод=им,мн\"
парковка,парковка,\"S,жен,неод=им,ед\"
грязно,грязно,ADV=
хорошо,хорошо,ADV=
";

const SYNONYMS: &str = "\
Скамейки,скамейка,лавочка
Машины,машина
Парковки,парковка
Урны,урна
";

const READY_ANSWERS: &str = "\
Убрать скамейки,нет скамейки
Скамейки
Парковки
Чистота,грязно
Много машин,машины
";

const RULES: &str = r#"[
    {"kind": "implies", "category": "Чистота", "adds": ["Благоустройство"]}
]"#;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

/// A survey directory with every dictionary and a config using relative
/// paths.
fn survey(extra_config: &str) -> (TempDir, PipelineConfig) {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "lexicon.csv", LEXICON);
    write(root, "negations.csv", "нет,род\nбольше,род\n");
    write(root, "ignorables.csv", "но\n");
    write(root, "synonyms.csv", SYNONYMS);
    write(root, "ready.csv", READY_ANSWERS);
    write(root, "stop.txt", "хорошо\n");
    write(root, "words.txt", "грязно\nскамеек\n");
    write(root, "rules.json", RULES);

    let config = format!(
        r#"{{
            "negations": ["negations.csv"],
            "ignorables": ["ignorables.csv"],
            "synonyms": ["synonyms.csv"],
            "ready_answers": ["ready.csv"],
            "stop_words": "stop.txt",
            "rules": "rules.json",
            "questioned": ["Парковки"],
            "lexicon": "lexicon.csv"
            {extra_config}
        }}"#
    );
    write(root, "anketa.json", &config);

    let config = PipelineConfig::load(root.join("anketa.json")).unwrap();
    (dir, config)
}

fn categories(outcome: &anketa::pipeline::Outcome) -> Vec<&str> {
    outcome.categories.iter().map(String::as_str).collect()
}

#[test]
fn test_config_paths_are_relative_to_config_file() {
    let (dir, config) = survey("");
    assert_eq!(config.synonyms, vec![dir.path().join("synonyms.csv")]);
    assert_eq!(config.lexicon, Some(dir.path().join("lexicon.csv")));
}

#[test]
fn test_exact_hypothesis_resolves_negated_answer() {
    let (_dir, config) = survey("");
    let classifier = Classifier::from_config(&config).unwrap();

    let outcome = classifier.classify(Some(2), "нет скамейки").unwrap();
    assert_eq!(outcome.status, Status::Resolved);
    assert_eq!(categories(&outcome), vec!["Убрать скамейки"]);
}

#[test]
fn test_two_topics_resolve_independently() {
    let (_dir, config) = survey(r#", "strategies": ["clauses"]"#);
    let classifier = Classifier::from_config(&config).unwrap();

    let outcome = classifier.classify(None, "машины, но больше скамеек").unwrap();
    assert_eq!(categories(&outcome), vec!["Много машин", "Убрать скамейки"]);
}

#[test]
fn test_rules_and_stop_words_apply() {
    let (_dir, config) = survey("");
    let classifier = Classifier::from_config(&config).unwrap();

    let outcome = classifier.classify(None, "грязно").unwrap();
    assert_eq!(categories(&outcome), vec!["Благоустройство", "Чистота"]);

    let outcome = classifier.classify(None, "хорошо").unwrap();
    assert!(matches!(outcome.status, Status::Stopped { .. }));
}

#[test]
fn test_spelling_retry_from_config() {
    let (_dir, config) = survey(r#", "spelling_words": "words.txt""#);
    let classifier = Classifier::from_config(&config).unwrap();

    let outcome = classifier.classify(None, "гряздно").unwrap();
    assert!(outcome.spellchecked);
    assert_eq!(categories(&outcome), vec!["Благоустройство", "Чистота"]);

    let (_dir, config) = survey(r#", "spelling_words": "words.txt", "spellcheck_retry": false"#);
    let classifier = Classifier::from_config(&config).unwrap();
    assert_eq!(
        classifier.classify(None, "гряздно").unwrap().status,
        Status::Unresolved
    );
}

#[test]
fn test_batch_is_routed_into_three_tables() {
    let (dir, config) = survey("");
    write(
        dir.path(),
        "survey.csv",
        "id,like,dislike\n\
         1,нет скамеек,грязно\n\
         2,парковка,\n\
         3,кек,\n\
         4,нет скамеек,грязно\n\
         5,хорошо,\n",
    );

    let classifier = Classifier::from_config(&config).unwrap();
    let answers = read_columns(dir.path().join("survey.csv"), &[2, 3], b',').unwrap();
    assert_eq!(answers.len(), 5);

    let outcomes = classifier.classify_batch(&answers, 2).unwrap();
    let lines: Vec<_> = outcomes.iter().filter_map(|o| o.line).collect();
    assert_eq!(lines, vec![2, 2, 3, 4, 6]);

    let router = Router::new(config.questioned.iter().cloned(), &config.unsure_marker);
    let routes: Vec<_> = outcomes.iter().map(|o| router.route(o)).collect();
    assert_eq!(
        routes,
        vec![
            Route::Clear,
            Route::Clear,
            Route::Questioned,
            Route::Unprocessed,
            Route::Unprocessed
        ]
    );

    let out = tempdir().unwrap();
    let paths = OutputPaths::generate(out.path());
    let report = OutputWriter::new(router).write(&outcomes, &paths).unwrap();

    assert_eq!(
        report.routes,
        RouteCounts {
            clear: 2,
            questioned: 1,
            unprocessed: 2
        }
    );
    assert_eq!(report.categories.len(), 4);

    let clear = fs::read_to_string(&paths.clear).unwrap();
    assert_eq!(
        clear,
        "2\tнет скамеек\tУбрать скамейки\t\t\t\n\
         2\tгрязно\tБлагоустройство\tЧистота\t\t\n"
    );
    let trash = fs::read_to_string(&paths.trash).unwrap();
    assert_eq!(trash, "4\tкек\t\t\t\t\n6\tхорошо\t\t\t\t\n");
}

#[test]
fn test_missing_dictionary_is_fatal() {
    let (dir, mut config) = survey("");
    config.synonyms = vec![dir.path().join("missing.csv")];
    assert!(Classifier::from_config(&config).is_err());
}
