//! Command line interface for SchemaDrift

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use schema_drift::config::OutputFormat;
use schema_drift::{DriftAnalyzer, DriftReport};

#[derive(Parser, Debug)]
#[command(name = "schema_drift", version, about = "Detect structural drift between two schema versions")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare two schema files (SQL DDL or JSON)
    Diff {
        old: PathBuf,
        new: PathBuf,

        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,

        /// Exit with status 1 when drift is found
        #[arg(long)]
        exit_code: bool,
    },
    /// Print the canonical model of one schema file
    Parse {
        file: PathBuf,

        #[arg(short, long, value_enum)]
        format: Option<Format>,

        #[arg(long)]
        compact: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Json,
    Yaml,
    Summary,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Yaml => OutputFormat::Yaml,
            Format::Summary => OutputFormat::Summary,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let analyzer = match &cli.config {
        Some(path) => schema_drift::init(path)
            .with_context(|| format!("initializing from configuration {}", path.display()))?,
        None => DriftAnalyzer::default(),
    };
    let output = analyzer.config().output.clone();

    match cli.command {
        Command::Diff {
            old,
            new,
            format,
            compact,
            exit_code,
        } => {
            let report = analyzer.compare(&read_source(&old)?, &read_source(&new)?);
            let format = format.map(OutputFormat::from).unwrap_or(output.format);
            let rendered = match format {
                OutputFormat::Summary => report.to_string(),
                other => render(&report, other, output.pretty && !compact)?,
            };
            println!("{}", rendered);

            Ok(ExitCode::from(drift_status(&report, exit_code)))
        }
        Command::Parse {
            file,
            format,
            compact,
        } => {
            let schema = analyzer.parse(&read_source(&file)?);
            let format = match format.map(OutputFormat::from).unwrap_or(output.format) {
                OutputFormat::Summary => OutputFormat::Json,
                other => other,
            };
            println!("{}", render(&schema, format, output.pretty && !compact)?);

            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Process status for a finished comparison: 1 when drift was found and the
/// caller asked for it, 0 otherwise
fn drift_status(report: &DriftReport, exit_code: bool) -> u8 {
    u8::from(exit_code && report.has_drift())
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading schema file {}", path.display()))
}

fn render<T: Serialize>(value: &T, format: OutputFormat, pretty: bool) -> schema_drift::Result<String> {
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        _ if pretty => serde_json::to_string_pretty(value)?,
        _ => serde_json::to_string(value)?,
    };
    Ok(rendered)
}
