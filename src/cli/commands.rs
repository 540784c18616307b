//! Command implementations for the anketa CLI.

use std::fs;
use std::time::Instant;

use log::info;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::output::{OutputPaths, OutputWriter, Router};
use crate::pipeline::Classifier;
use crate::reader::read_columns;

/// Execute a CLI command.
pub fn execute_command(args: AnketaArgs) -> Result<()> {
    match &args.command {
        Command::Classify(classify_args) => classify(classify_args, &args),
        Command::Inspect(inspect_args) => inspect(inspect_args, &args),
    }
}

/// Classify the answer columns of a table into the three output files.
fn classify(args: &ClassifyArgs, cli_args: &AnketaArgs) -> Result<()> {
    let config = PipelineConfig::load(&args.config)?;
    let classifier = Classifier::from_config(&config)?;
    info!("Loaded configuration from {}", args.config.display());

    let answers = read_columns(&args.table, &args.columns, args.delimiter)?;
    info!("Read {} answers from {}", answers.len(), args.table.display());

    let start = Instant::now();
    let outcomes = classifier.classify_batch(&answers, args.jobs)?;

    fs::create_dir_all(&args.output)?;
    let files = OutputPaths::generate(&args.output);
    let router = Router::new(config.questioned.iter().cloned(), &config.unsure_marker);
    let report = OutputWriter::new(router)
        .with_delimiter(args.output_delimiter)
        .write(&outcomes, &files)?;

    let result = ClassificationResult {
        answers: outcomes.len(),
        duration_ms: start.elapsed().as_millis() as u64,
        files,
        report,
    };
    output_result("Classification finished", &result, cli_args)
}

/// Print every stage of one answer.
fn inspect(args: &InspectArgs, cli_args: &AnketaArgs) -> Result<()> {
    let config = PipelineConfig::load(&args.config)?;
    let classifier = Classifier::from_config(&config)?;
    let inspection = classifier.inspect(&args.text)?;
    output_result(&format!("Inspecting {:?}", args.text), &inspection, cli_args)
}
