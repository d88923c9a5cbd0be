//! Command-line interface.
//!
//! `classify` runs one scheduled classify-and-publish, `aggregate` answers a
//! miles-paved query, `config` inspects configuration.

use crate::aggregate::MileAggregator;
use crate::exit_codes::ExitCode;
use crate::logging::LogFormat;
use crate::pipeline::classify_and_publish;
use crate::source::CsvExtract;
use chrono::NaiveDateTime;
use clap::{ArgAction, Args, Parser, Subcommand};
use pave_common::time::parse_timestamp;
use pave_common::{Error, Mode, PavType, Result};
use pave_config::{resolve_config, validate, ConfigPaths, PipelineConfig, ResolvedConfig};
use serde::Serialize;
use std::path::PathBuf;

/// Street paving record classifier and mile aggregator.
#[derive(Parser, Debug)]
#[command(name = "pave", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Configuration file (.toml or .json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the production data directory
    #[arg(long, global = true, env = "PAVE_PROD_DATA_DIR", value_name = "DIR")]
    pub prod_dir: Option<PathBuf>,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// More log output (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a raw extract and replace the mode's production file
    Classify(ClassifyArgs),
    /// Miles paved since a date, from the mode's production file
    Aggregate(AggregateArgs),
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Output mode (sdif, imcat)
    #[arg(long)]
    pub mode: String,

    /// Raw work-order extract (CSV with source column names)
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    /// Logical execution timestamp; defaults to now (UTC)
    #[arg(long, value_name = "TIMESTAMP")]
    pub reference_date: Option<String>,
}

#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Output mode (sdif, imcat)
    #[arg(long)]
    pub mode: String,

    /// total, overlay, slurry, or all
    #[arg(long, default_value = "total")]
    pub pav_type: String,

    /// Window start; moratorium dates on or after this count
    #[arg(long, value_name = "DATE")]
    pub range_start: String,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the resolved configuration and where it came from
    Show,
    /// Validate a configuration file (defaults to the resolved one)
    Validate {
        #[arg(long, value_name = "PATH")]
        path: Option<PathBuf>,
    },
}

/// Dispatch a parsed command line.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    match &cli.command {
        Commands::Classify(args) => run_classify(&cli.global, args),
        Commands::Aggregate(args) => run_aggregate(&cli.global, args),
        Commands::Config { command } => run_config(&cli.global, command),
    }
}

fn load_config(global: &GlobalOpts) -> Result<ResolvedConfig> {
    let paths = ConfigPaths::discover(global.config.as_deref());
    Ok(resolve_config(&paths, global.prod_dir.as_deref())?)
}

fn parse_date_arg(name: &str, value: &str) -> Result<NaiveDateTime> {
    parse_timestamp(value).ok_or_else(|| {
        Error::InvalidArgument(format!("{name}: not a date or timestamp: {value}"))
    })
}

/// Machine-readable form of a failed command.
pub fn error_report(err: &Error) -> serde_json::Value {
    serde_json::json!({
        "error": err.to_string(),
        "code": err.code(),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_classify(global: &GlobalOpts, args: &ClassifyArgs) -> Result<ExitCode> {
    let mode: Mode = args.mode.parse()?;
    let reference = match &args.reference_date {
        Some(v) => parse_date_arg("--reference-date", v)?,
        None => chrono::Utc::now().naive_utc(),
    };
    let resolved = load_config(global)?;
    let mut source = CsvExtract::new(&args.input);
    let summary = classify_and_publish(&resolved.config, mode, &mut source, reference)?;
    print_json(&summary)?;
    Ok(ExitCode::Clean)
}

fn run_aggregate(global: &GlobalOpts, args: &AggregateArgs) -> Result<ExitCode> {
    let mode: Mode = args.mode.parse()?;
    let range_start = parse_date_arg("--range-start", &args.range_start)?;
    let resolved = load_config(global)?;
    let aggregator = MileAggregator::new(&resolved.config);

    if args.pav_type == "all" {
        print_json(&aggregator.breakdown(mode, range_start)?)?;
    } else {
        let pav_type: PavType = args.pav_type.parse()?;
        print_json(&aggregator.aggregate(mode, pav_type, range_start)?)?;
    }
    Ok(ExitCode::Clean)
}

#[derive(Serialize)]
struct ValidationReport {
    valid: bool,
    errors: Vec<String>,
}

fn run_config(global: &GlobalOpts, command: &ConfigCommands) -> Result<ExitCode> {
    match command {
        ConfigCommands::Show => {
            print_json(&load_config(global)?)?;
            Ok(ExitCode::Clean)
        }
        ConfigCommands::Validate { path } => {
            let config = match path.as_ref().or(global.config.as_ref()) {
                Some(p) => PipelineConfig::load(p)?,
                None => load_config(global)?.config,
            };
            let errors: Vec<String> = match validate(&config) {
                Ok(()) => Vec::new(),
                Err(errors) => errors.iter().map(ToString::to_string).collect(),
            };
            let valid = errors.is_empty();
            print_json(&ValidationReport { valid, errors })?;
            Ok(if valid {
                ExitCode::Clean
            } else {
                ExitCode::ConfigError
            })
        }
    }
}
