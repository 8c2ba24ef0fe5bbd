use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Gaia monthly indicator cleaning and seasonal-anomaly detection.
#[derive(Parser)]
#[command(
    name = "gaia",
    version,
    about = "Monthly environmental indicator repair and DTW anomaly detection"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Filter, grid-complete, and impute raw observations.
    Clean(CleanArgs),
    /// Score cleaned series against seasonal baselines and flag anomalies.
    Detect(DetectArgs),
}

/// Arguments for the `clean` subcommand.
#[derive(clap::Args)]
pub struct CleanArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "gaia.toml")]
    pub config: PathBuf,

    /// Override raw observation Parquet path from config.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override cleaned output directory from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `detect` subcommand.
#[derive(clap::Args)]
pub struct DetectArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "gaia.toml")]
    pub config: PathBuf,

    /// Override cleaned input directory from config.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override anomaly output directory from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
