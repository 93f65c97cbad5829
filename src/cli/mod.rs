//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SportMonks API endpoint availability tester
#[derive(Parser, Debug)]
#[command(name = "sportmonks-probe")]
#[command(version)]
#[command(about = "Sweep the SportMonks football API and report which endpoints your plan can reach")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the endpoint sweep
    Run(RunArgs),

    /// List catalog endpoints
    List(ListArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// List saved reports
    Reports(ReportsArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// API token
    #[arg(short, long, env = "SPORTMONKS_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Only run these categories (comma-separated: predictions, odds, fixtures, bookmakers, teams)
    #[arg(short, long, value_delimiter = ',')]
    pub category: Vec<String>,

    /// Report format (json, csv, markdown, text)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Write the report to this path instead of the report directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Minimum milliseconds between requests
    #[arg(long)]
    pub rate_limit_ms: Option<u64>,

    /// Timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show a single endpoint by name
    pub endpoint: Option<String>,

    /// Show paths and query parameters
    #[arg(short, long)]
    pub detailed: bool,

    /// Only show these categories (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub category: Vec<String>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(default_value = "sportmonks-probe.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show environment variables
    Env,
}

/// Arguments for reports command
#[derive(Parser, Debug)]
pub struct ReportsArgs {
    /// Report directory
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}
