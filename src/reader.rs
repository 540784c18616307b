//! Survey table ingestion.
//!
//! Survey exports are CSV tables with a header row, a respondent identifier
//! in the first column and answers in the others. Respondents who submitted
//! the same form twice show up as rows identical except for the identifier;
//! those repeats are skipped.

use std::path::Path;

use ahash::AHashSet;
use csv::ReaderBuilder;
use log::warn;

use crate::error::{AnketaError, Result};

/// One answer cell and the file line it was read from (1-based, header is
/// line 1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableAnswer {
    pub line: usize,
    pub text: String,
}

impl TableAnswer {
    pub fn new<S: Into<String>>(line: usize, text: S) -> Self {
        TableAnswer {
            line,
            text: text.into(),
        }
    }
}

/// Read the answers of the given 1-based columns.
///
/// Rows repeating an earlier row (first column ignored) are skipped, blank
/// cells are skipped and identical cells of one row yield one answer.
pub fn read_columns<P: AsRef<Path>>(
    path: P,
    columns: &[usize],
    delimiter: u8,
) -> Result<Vec<TableAnswer>> {
    if columns.contains(&0) {
        return Err(AnketaError::config("column numbers start from 1"));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path.as_ref())?;

    let mut seen_rows: AHashSet<Vec<String>> = AHashSet::new();
    let mut answers = Vec::new();

    for record in reader.records() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(answers.len() + 2);

        let snapshot: Vec<String> = record.iter().skip(1).map(|c| c.trim().to_string()).collect();
        if !seen_rows.insert(snapshot) {
            warn!("Line {line} is a duplicate of an earlier row, skipped");
            continue;
        }

        let mut cells: Vec<&str> = Vec::new();
        for (index, cell) in record.iter().enumerate() {
            let cell = cell.trim();
            if !cell.is_empty() && columns.contains(&(index + 1)) && !cells.contains(&cell) {
                cells.push(cell);
            }
        }
        answers.extend(cells.into_iter().map(|cell| TableAnswer::new(line, cell)));
    }

    Ok(answers)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn table(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_read_selected_columns() {
        let file = table(
            "id,like,dislike,age\n\
             1,скамейки,нет урн,30\n\
             2,,грязно,41\n",
        );
        let answers = read_columns(file.path(), &[2, 3], b',').unwrap();

        assert_eq!(
            answers,
            vec![
                TableAnswer::new(2, "скамейки"),
                TableAnswer::new(2, "нет урн"),
                TableAnswer::new(3, "грязно"),
            ]
        );
    }

    #[test]
    fn test_duplicate_rows_are_skipped() {
        let file = table(
            "id,answer\n\
             1,скамейки\n\
             2, скамейки \n\
             3,урны\n",
        );
        let answers = read_columns(file.path(), &[2], b',').unwrap();
        assert_eq!(
            answers,
            vec![TableAnswer::new(2, "скамейки"), TableAnswer::new(4, "урны")]
        );
    }

    #[test]
    fn test_identical_cells_yield_one_answer() {
        let file = table("id,a,b\n1,урны,урны\n");
        let answers = read_columns(file.path(), &[2, 3], b',').unwrap();
        assert_eq!(answers, vec![TableAnswer::new(2, "урны")]);
    }

    #[test]
    fn test_zero_column_is_rejected() {
        let file = table("id,a\n1,урны\n");
        assert!(read_columns(file.path(), &[0], b',').is_err());
    }
}
