//! Routing and writing of classified answers.
//!
//! Outcomes go to one of three tables: clear answers, answers touching a
//! category that needs manual review, and answers the classifier could not
//! handle.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ahash::AHashSet;
use chrono::Local;
use csv::WriterBuilder;
use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::pipeline::Outcome;

/// Destination table of an outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Clear,
    Questioned,
    Unprocessed,
}

/// Decides where outcomes go.
#[derive(Clone, Debug)]
pub struct Router {
    questioned: AHashSet<String>,
    unsure_marker: String,
}

impl Router {
    pub fn new<I, S>(questioned: I, unsure_marker: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Router {
            questioned: questioned.into_iter().map(Into::into).collect(),
            unsure_marker: unsure_marker.to_string(),
        }
    }

    pub fn route(&self, outcome: &Outcome) -> Route {
        let categories = &outcome.categories;
        let only_unsure = categories.iter().all(|c| *c == self.unsure_marker);
        if categories.is_empty() || only_unsure {
            Route::Unprocessed
        } else if categories.iter().any(|c| self.questioned.contains(c)) {
            Route::Questioned
        } else {
            Route::Clear
        }
    }
}

/// The three output files of one run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutputPaths {
    pub clear: PathBuf,
    pub questioned: PathBuf,
    pub trash: PathBuf,
}

impl OutputPaths {
    /// Paths stamped with the current local time.
    pub fn generate<P: AsRef<Path>>(dir: P) -> Self {
        let timestamp = Local::now().format("%Y_%m_%d_%H_%M").to_string();
        Self::with_timestamp(dir, &timestamp)
    }

    pub fn with_timestamp<P: AsRef<Path>>(dir: P, timestamp: &str) -> Self {
        let dir = dir.as_ref();
        OutputPaths {
            clear: dir.join(format!("output_clear_{timestamp}.csv")),
            questioned: dir.join(format!("output_questioned_{timestamp}.csv")),
            trash: dir.join(format!("output_trash_{timestamp}.csv")),
        }
    }

    pub fn path(&self, route: Route) -> &Path {
        match route {
            Route::Clear => &self.clear,
            Route::Questioned => &self.questioned,
            Route::Unprocessed => &self.trash,
        }
    }
}

/// Number of outcomes written to each table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RouteCounts {
    pub clear: usize,
    pub questioned: usize,
    pub unprocessed: usize,
}

/// Summary of a written batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// How many answers carry each category.
    pub categories: BTreeMap<String, usize>,
    pub routes: RouteCounts,
}

/// Writes outcomes as delimited tables.
#[derive(Clone, Debug)]
pub struct OutputWriter {
    router: Router,
    delimiter: u8,
}

impl OutputWriter {
    pub fn new(router: Router) -> Self {
        OutputWriter {
            router,
            delimiter: b'\t',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Summarize outcomes without writing anything.
    pub fn report(&self, outcomes: &[Outcome]) -> Report {
        let mut report = Report::default();
        for outcome in outcomes {
            for category in &outcome.categories {
                *report.categories.entry(category.clone()).or_default() += 1;
            }
            match self.router.route(outcome) {
                Route::Clear => report.routes.clear += 1,
                Route::Questioned => report.routes.questioned += 1,
                Route::Unprocessed => report.routes.unprocessed += 1,
            }
        }
        report
    }

    /// Write every outcome to the table of its route.
    ///
    /// Rows are `line, answer, categories...`, padded with empty cells to the
    /// number of distinct categories of the batch. Outcomes without a line
    /// number are numbered by position as if the first one were on line 2.
    pub fn write(&self, outcomes: &[Outcome], paths: &OutputPaths) -> Result<Report> {
        let report = self.report(outcomes);
        let width = report.categories.len();

        let open = |path: &Path| {
            WriterBuilder::new()
                .delimiter(self.delimiter)
                .flexible(true)
                .from_path(path)
        };
        let mut clear = open(&paths.clear)?;
        let mut questioned = open(&paths.questioned)?;
        let mut trash = open(&paths.trash)?;

        for (index, outcome) in outcomes.iter().enumerate() {
            let line = outcome.line.unwrap_or(index + 2).to_string();
            let mut row = vec![line.as_str(), outcome.source.as_str()];
            row.extend(outcome.categories.iter().map(String::as_str));
            row.resize(width + 2, "");

            let writer = match self.router.route(outcome) {
                Route::Clear => &mut clear,
                Route::Questioned => &mut questioned,
                Route::Unprocessed => &mut trash,
            };
            writer.write_record(&row)?;
        }

        clear.flush()?;
        questioned.flush()?;
        trash.flush()?;

        info!(
            "Wrote {} clear, {} questioned and {} unprocessed answers",
            report.routes.clear, report.routes.questioned, report.routes.unprocessed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Status;
    use crate::resolver::CategorySet;

    fn outcome(line: Option<usize>, source: &str, categories: &[&str]) -> Outcome {
        Outcome {
            line,
            source: source.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect::<CategorySet>(),
            status: if categories.is_empty() {
                Status::Unresolved
            } else {
                Status::Resolved
            },
            strategy: None,
            spellchecked: false,
        }
    }

    fn router() -> Router {
        Router::new(["Парковки"], "?")
    }

    #[test]
    fn test_routing() {
        let router = router();
        assert_eq!(router.route(&outcome(None, "скамейки", &["Скамейки"])), Route::Clear);
        assert_eq!(
            router.route(&outcome(None, "парковки", &["Парковки", "Скамейки"])),
            Route::Questioned
        );
        assert_eq!(router.route(&outcome(None, "кек", &[])), Route::Unprocessed);
        assert_eq!(router.route(&outcome(None, "ну", &["?"])), Route::Unprocessed);
        assert_eq!(router.route(&outcome(None, "ну", &["?", "Урны"])), Route::Clear);
    }

    #[test]
    fn test_paths() {
        let paths = OutputPaths::with_timestamp("/out", "2024_05_01_10_30");
        assert_eq!(paths.clear, PathBuf::from("/out/output_clear_2024_05_01_10_30.csv"));
        assert_eq!(paths.path(Route::Unprocessed), Path::new("/out/output_trash_2024_05_01_10_30.csv"));
    }

    #[test]
    fn test_write_tables() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::with_timestamp(dir.path(), "test");
        let outcomes = vec![
            outcome(Some(2), "скамейки и урны", &["Скамейки", "Урны"]),
            outcome(Some(3), "парковка", &["Парковки"]),
            outcome(None, "кек", &[]),
        ];

        let report = OutputWriter::new(router())
            .with_delimiter(b';')
            .write(&outcomes, &paths)
            .unwrap();

        assert_eq!(report.categories.len(), 3);
        assert_eq!(report.categories["Урны"], 1);
        assert_eq!(
            report.routes,
            RouteCounts {
                clear: 1,
                questioned: 1,
                unprocessed: 1
            }
        );

        let clear = std::fs::read_to_string(&paths.clear).unwrap();
        assert_eq!(clear, "2;скамейки и урны;Скамейки;Урны;\n");
        let questioned = std::fs::read_to_string(&paths.questioned).unwrap();
        assert_eq!(questioned, "3;парковка;Парковки;;\n");
        let trash = std::fs::read_to_string(&paths.trash).unwrap();
        assert_eq!(trash, "4;кек;;;\n");
    }
}
