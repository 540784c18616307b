//! Readers for the CSV tables and word lists the classifier is configured
//! with.
//!
//! Category tables have one category per row followed by its keywords:
//!
//! ```csv
//! Скамейки,скамейка,лавочка,лавка
//! Озеленение,зелень,дерево,газон
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;
use csv::ReaderBuilder;

use crate::error::Result;

/// Keyword → categories, in order of first appearance. Categories of one
/// keyword are deduplicated and kept in the order they were declared.
pub type OrderedMultiMap = Vec<(String, Vec<String>)>;

fn csv_reader(path: &Path, delimiter: u8) -> Result<csv::Reader<File>> {
    Ok(ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

/// Read category tables into a keyword → categories multimap.
///
/// With `ignore_first_column` the first cell of a row is only the category;
/// otherwise it is also treated as one of the row's keywords.
pub fn read_csv_dictionaries<P: AsRef<Path>>(
    paths: &[P],
    ignore_first_column: bool,
    delimiter: u8,
) -> Result<OrderedMultiMap> {
    let mut matches: OrderedMultiMap = Vec::new();
    let mut index: AHashMap<String, usize> = AHashMap::new();

    for path in paths {
        let mut reader = csv_reader(path.as_ref(), delimiter)?;
        for record in reader.records() {
            let record = record?;
            let Some(headline) = record.get(0).filter(|h| !h.is_empty()) else {
                continue;
            };
            let keywords = record
                .iter()
                .skip(usize::from(ignore_first_column))
                .filter(|kw| !kw.is_empty());

            for keyword in keywords {
                let slot = *index.entry(keyword.to_string()).or_insert_with(|| {
                    matches.push((keyword.to_string(), Vec::new()));
                    matches.len() - 1
                });
                let categories = &mut matches[slot].1;
                if !categories.iter().any(|c| c == headline) {
                    categories.push(headline.to_string());
                }
            }
        }
    }

    Ok(matches)
}

/// Read word lists into one ordered, deduplicated list.
///
/// With `as_csv` every table cell is a word; otherwise every non-blank line
/// is one entry (which may contain spaces or commas).
pub fn read_wordlists<P: AsRef<Path>>(paths: &[P], as_csv: bool) -> Result<Vec<String>> {
    let mut seen = ahash::AHashSet::new();
    let mut words = Vec::new();
    let mut push = |word: &str| {
        if !word.is_empty() && seen.insert(word.to_string()) {
            words.push(word.to_string());
        }
    };

    for path in paths {
        let path = path.as_ref();
        if as_csv {
            let mut reader = csv_reader(path, b',')?;
            for record in reader.records() {
                for cell in record?.iter() {
                    push(cell);
                }
            }
        } else {
            for line in BufReader::new(File::open(path)?).lines() {
                push(line?.trim());
            }
        }
    }

    Ok(words)
}
