//! Command-line interface for the scoring engine
//!
//! Reads one subject (or, with `--batch`, an array of subjects) as JSON and
//! writes the verdicts as JSON. Everything here is plumbing: the scoring
//! itself lives in `domain_scoring`.

pub mod config;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use domain_scoring::{
    AssessmentMode, BatchOutcome, BatchSummary, FactorRegistry, RiskEngine,
};

use crate::config::CliConfig;

/// Risk and fraud assessment
#[derive(Parser, Debug, Clone)]
#[command(name = "assess")]
#[command(about = "Score policy applications and claims against a factor table")]
pub struct Args {
    /// Product line key (AUTO, HEALTH, HOME, LIFE, GENERAL)
    #[arg(long, short = 'p')]
    pub product_line: String,

    /// What to assess: risk (underwriting) or fraud (claims)
    #[arg(long, short = 'm', default_value = "risk")]
    pub mode: AssessmentMode,

    /// JSON input file; stdin when omitted
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Treat the input as an array of subjects
    #[arg(long)]
    pub batch: bool,

    /// Factor table overriding SCORING_FACTOR_TABLE and the built-in table
    #[arg(long)]
    pub factor_table: Option<PathBuf>,
}

/// Output of a batch run
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub results: Vec<BatchOutcome>,
}

/// Loads the factor table named by the arguments or configuration
pub fn load_registry(args: &Args, config: &CliConfig) -> anyhow::Result<FactorRegistry> {
    let path = args
        .factor_table
        .clone()
        .or_else(|| config.factor_table.as_ref().map(PathBuf::from));

    match path {
        Some(path) => FactorRegistry::from_file(&path)
            .with_context(|| format!("Failed to load factor table {}", path.display())),
        None => FactorRegistry::builtin().context("Failed to load built-in factor table"),
    }
}

/// Builds the engine described by the arguments and configuration
pub fn build_engine(args: &Args, config: &CliConfig) -> anyhow::Result<RiskEngine> {
    let registry = load_registry(args, config)?;
    RiskEngine::new(Arc::new(registry), config.engine_settings())
        .context("Invalid engine settings")
}

/// Runs one invocation, reading from the input file or stdin
pub fn run(args: &Args, config: &CliConfig) -> anyhow::Result<()> {
    let engine = build_engine(args, config)?;
    let stdout = io::stdout();

    match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            execute(&engine, args, BufReader::new(file), stdout.lock())
        }
        None => execute(&engine, args, io::stdin().lock(), stdout.lock()),
    }
}

/// Assesses the JSON read from `input` and writes the result to `output`
pub fn execute<R: Read, W: Write>(
    engine: &RiskEngine,
    args: &Args,
    input: R,
    mut output: W,
) -> anyhow::Result<()> {
    let subject: Value = serde_json::from_reader(input).context("Input is not valid JSON")?;

    if args.batch {
        let Value::Array(subjects) = subject else {
            bail!("Batch input must be a JSON array of subjects");
        };
        let results = engine.assess_batch(&args.product_line, &subjects, args.mode)?;
        let report = BatchReport {
            summary: BatchSummary::from_outcomes(&results),
            results,
        };
        tracing::info!(
            total = report.summary.total,
            failures = report.summary.failures,
            "Batch written"
        );
        serde_json::to_writer_pretty(&mut output, &report)?;
    } else {
        let verdict = engine.assess(&args.product_line, &subject, args.mode)?;
        serde_json::to_writer_pretty(&mut output, &verdict)?;
    }

    writeln!(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["assess", "--product-line", "AUTO"]).unwrap();
        assert_eq!(args.mode, AssessmentMode::Risk);
        assert!(!args.batch);
        assert!(args.input.is_none());
    }

    #[test]
    fn test_args_accept_mode_aliases() {
        let args =
            Args::try_parse_from(["assess", "-p", "HOME", "--mode", "claims", "--batch"]).unwrap();
        assert_eq!(args.mode, AssessmentMode::Fraud);
        assert!(args.batch);
    }

    #[test]
    fn test_args_reject_unknown_mode() {
        assert!(Args::try_parse_from(["assess", "-p", "AUTO", "--mode", "vibes"]).is_err());
    }

    #[test]
    fn test_args_require_product_line() {
        assert!(Args::try_parse_from(["assess"]).is_err());
    }

    #[test]
    fn test_missing_factor_table_fails() {
        let args = Args::try_parse_from([
            "assess",
            "-p",
            "AUTO",
            "--factor-table",
            "/nonexistent/table.json",
        ])
        .unwrap();
        assert!(load_registry(&args, &CliConfig::default()).is_err());
    }
}
