//! Output formatting for CLI commands.

use serde::Serialize;

use crate::cli::args::{AnketaArgs, OutputFormat};
use crate::error::Result;
use crate::matcher::Hypothesis;
use crate::output::{OutputPaths, Report};
use crate::pipeline::{Inspection, Outcome, Status};
use crate::resolver::Resolution;

/// Result structure for a classified table.
#[derive(Debug, Serialize)]
pub struct ClassificationResult {
    pub answers: usize,
    pub duration_ms: u64,
    pub files: OutputPaths,
    pub report: Report,
}

/// Results that know how to print themselves for people.
pub trait HumanOutput {
    fn print_human(&self);
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + HumanOutput>(
    message: &str,
    result: &T,
    args: &AnketaArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{message}");
                println!();
            }
            result.print_human();
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &AnketaArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

impl HumanOutput for ClassificationResult {
    fn print_human(&self) {
        println!("Answers: {} ({}ms)", self.answers, self.duration_ms);
        println!("Clear:        {} -> {}", self.report.routes.clear, self.files.clear.display());
        println!(
            "Questioned:   {} -> {}",
            self.report.routes.questioned,
            self.files.questioned.display()
        );
        println!(
            "Unprocessed:  {} -> {}",
            self.report.routes.unprocessed,
            self.files.trash.display()
        );

        if self.report.categories.is_empty() {
            return;
        }
        println!();
        println!("Categories:");
        println!("───────────");
        for (category, count) in sorted_counts(&self.report) {
            println!("{count:>6}  {category}");
        }
    }
}

impl HumanOutput for Inspection {
    fn print_human(&self) {
        println!("Lemmas: {}", self.lemmas.join(" "));
        for trace in &self.traces {
            println!();
            println!("[{}] {}", trace.strategy, format_resolution(&trace.resolution));
            for (index, clause) in trace.clauses.iter().enumerate() {
                let sign = if clause.polarity { '+' } else { '-' };
                println!("  {sign} {:?}", clause.text);
                for hypothesis in trace.hypotheses.iter().filter(|h| h.clause == index) {
                    println!("      {}", format_hypothesis(hypothesis));
                }
            }
        }
        println!();
        println!("{}", format_outcome(&self.outcome));
    }
}

/// Category counts, most frequent first.
fn sorted_counts(report: &Report) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = report
        .categories
        .iter()
        .map(|(category, count)| (category.as_str(), *count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    counts
}

fn format_hypothesis(hypothesis: &Hypothesis) -> String {
    format!("{:?} ({:?})", hypothesis.text, hypothesis.match_kind)
}

fn format_resolution(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Resolved { categories, .. } => {
            let categories: Vec<&str> = categories.iter().map(String::as_str).collect();
            format!("resolved: {}", categories.join(", "))
        }
        Resolution::Stopped { marker, .. } => format!("stopped by {marker:?}"),
        Resolution::Unresolved => "unresolved".to_string(),
    }
}

fn format_outcome(outcome: &Outcome) -> String {
    let categories: Vec<&str> = outcome.categories.iter().map(String::as_str).collect();
    let mut line = match &outcome.status {
        Status::Resolved => format!("Categories: {}", categories.join(", ")),
        Status::Stopped { marker } => format!("Stopped by {marker:?}"),
        Status::Unresolved => "Unresolved".to_string(),
        Status::Failed { reason } => format!("Failed: {reason}"),
    };
    if let Some(strategy) = outcome.strategy {
        line.push_str(&format!(" [{strategy}]"));
    }
    if outcome.spellchecked {
        line.push_str(" (after spelling correction)");
    }
    line
}
