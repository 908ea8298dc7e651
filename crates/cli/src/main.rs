//! Resource Policy Oracle CLI
//!
//! A command-line tool for generating scenario catalogs, validating
//! scenario files, classifying requests against bounds, and printing the
//! policy mode contract.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{classify, generate, modes, validate};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Resource Policy Oracle CLI
#[derive(Parser)]
#[command(name = "rpo")]
#[command(author, version, about = "CLI for the Resource Policy Oracle", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every generator and validate the resulting catalog
    Generate {
        /// Seed for randomized generators (can also be set via RPO_SEED)
        #[arg(long)]
        seed: Option<u64>,

        /// Samples drawn from each randomized generator (can also be set via RPO_RANDOM_COUNT)
        #[arg(long)]
        random_count: Option<usize>,

        /// Write accepted scenarios as JSON to this file
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Include the Prometheus counters for the run
        #[arg(long)]
        metrics: bool,
    },

    /// Validate a JSON file holding an array of scenarios
    Validate {
        /// Scenario file path
        file: PathBuf,
    },

    /// Classify a request against a bound and show the clamped value
    Classify {
        /// Resource dimension
        #[arg(long, short, value_enum)]
        dimension: classify::DimensionArg,

        /// Bound minimum (e.g. 200m, 256Mi)
        #[arg(long)]
        min: String,

        /// Bound maximum (e.g. 1000m, 1Gi)
        #[arg(long)]
        max: String,

        /// Requested quantity
        #[arg(long)]
        request: String,
    },

    /// Show the policy mode contract
    Modes,
}

fn init_tracing(format: output::OutputFormat, verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let json = matches!(format, output::OutputFormat::Json);

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.format, cli.verbose);

    let settings = config::CliConfig::load()?;

    match cli.command {
        Commands::Generate {
            seed,
            random_count,
            output,
            metrics,
        } => {
            let catalog_config = settings.catalog_config(seed, random_count);
            generate::run(catalog_config, output.as_deref(), metrics, cli.format)?;
        }
        Commands::Validate { file } => {
            validate::run(&file, settings.validator_config(), cli.format)?;
        }
        Commands::Classify {
            dimension,
            min,
            max,
            request,
        } => {
            classify::run(dimension, &min, &max, &request, cli.format)?;
        }
        Commands::Modes => {
            modes::run(cli.format)?;
        }
    }

    Ok(())
}
