//! SportMonks Probe - API endpoint availability tester
//!
//! Sweeps a fixed catalog of SportMonks football API endpoints one request at
//! a time under a client-side rate limit, shows live progress, and writes a
//! report of which endpoints the current subscription can reach.
//!
//! ## Usage
//!
//! ```bash
//! # Sweep the whole catalog
//! SPORTMONKS_API_TOKEN=... sportmonks-probe run
//!
//! # Only odds and predictions, markdown report
//! sportmonks-probe run --token ... --category odds,predictions --format markdown
//!
//! # Show the catalog
//! sportmonks-probe list --detailed
//!
//! # Saved reports
//! sportmonks-probe reports
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{info, warn};

mod catalog;
mod cli;
mod config;
mod error;
mod executor;
mod http;
mod models;
mod output;
mod results;
mod utils;

use cli::Args;
use config::{AppConfig, EnvConfig};
use executor::{CancelHandle, RateLimitedRequester, TestRunner};
use http::HttpClient;
use models::Category;
use output::ResultFormatter;
use results::{generate_run_id, write_report, ReportBuilder, ReportFormat, ReportStorage};
use utils::logger::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(LogLevel::from_flags(args.verbose, args.quiet));

    match args.command {
        cli::Command::Run(run_args) => {
            run_sweep(run_args).await?;
        }
        cli::Command::List(list_args) => {
            list_endpoints(list_args)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args)?;
        }
        cli::Command::Reports(reports_args) => {
            show_reports(reports_args)?;
        }
    }

    Ok(())
}

async fn run_sweep(args: cli::RunArgs) -> Result<()> {
    let env = EnvConfig::load();
    let (mut config, config_path) = config::load_layered(args.config.as_deref(), &env)?;
    if let Some(path) = &config_path {
        info!("Using configuration from {}", path.display());
    }
    apply_run_args(&mut config, &args)?;

    let categories = parse_categories(&args.category)?;
    let endpoints = catalog::by_category(&categories);
    let token = args.token.clone().or(env.token).unwrap_or_default();

    let client = HttpClient::with_timeout(config.timeout_secs, &config.user_agent)?;
    info!(
        "Target {} (timeout {}s, {:?} auth)",
        config.base_url,
        client.timeout_secs(),
        config.auth
    );
    let requester = RateLimitedRequester::from_config(Arc::new(client), &config);

    let cancel = CancelHandle::new();
    let runner = TestRunner::new(endpoints, requester, generate_run_id())
        .with_cancel_handle(cancel.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current request");
            cancel.cancel();
        }
    });

    let no_color = args.no_color;
    let mut observer = runner.subscribe();
    let progress = tokio::spawn(async move {
        let formatter = formatter(no_color);
        while observer.changed().await.is_ok() {
            let line = formatter.format_progress(&observer.borrow_and_update());
            eprintln!("{line}");
        }
    });

    let snapshots = runner.run(&token).context("Cannot start run")?;
    let last = snapshots
        .fold(None, |_, snapshot| async move { Some(snapshot) })
        .await;
    // Sender is gone once the stream is dropped, which ends the observer
    if let Err(e) = progress.await {
        warn!("Progress observer failed: {}", e);
    }

    let state = last.context("Run ended without a final snapshot")?;
    println!("{}", formatter(no_color).format_summary(&state));

    let failed = state.failed_count();
    if failed > 0 {
        println!("{failed} endpoint(s) failed");
    }

    if !state.report_available() {
        println!("No outcomes recorded, skipping report.");
        return Ok(());
    }

    let bytes = ReportBuilder::new(config.report_format).build(&state)?;
    let path = match &args.output {
        Some(path) => {
            write_report(path, &bytes)?;
            path.clone()
        }
        None => ReportStorage::at(config.output_dir.as_deref()).save(
            &state.run_id,
            config.report_format,
            &bytes,
        )?,
    };
    println!("✓ Report written: {}", path.display());

    Ok(())
}

/// Command-line flags take precedence over file and environment settings
fn apply_run_args(config: &mut AppConfig, args: &cli::RunArgs) -> Result<()> {
    if let Some(format) = &args.format {
        config.report_format = ReportFormat::from_str(format).ok_or_else(|| {
            let valid: Vec<_> = ReportFormat::all().iter().map(|f| f.to_string()).collect();
            anyhow::anyhow!("Unknown report format: {format} (expected one of {})", valid.join(", "))
        })?;
    }
    if let Some(ms) = args.rate_limit_ms {
        config.rate_limit_interval_ms = ms;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    config.validate()
}

fn parse_categories(names: &[String]) -> Result<Vec<Category>> {
    names
        .iter()
        .map(|name| {
            Category::from_str(name.trim()).ok_or_else(|| {
                let valid: Vec<_> = Category::all()
                    .iter()
                    .map(|c| c.name().to_lowercase())
                    .collect();
                anyhow::anyhow!("Unknown category: {name} (expected one of {})", valid.join(", "))
            })
        })
        .collect()
}

fn formatter(no_color: bool) -> ResultFormatter {
    if no_color {
        ResultFormatter::new().no_color()
    } else {
        ResultFormatter::new()
    }
}

fn list_endpoints(args: cli::ListArgs) -> Result<()> {
    let formatter = ResultFormatter::new();

    if let Some(name) = &args.endpoint {
        let endpoint = catalog::find(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown endpoint: {name}"))?;
        print!("{}", formatter.format_catalog(std::slice::from_ref(endpoint), true));
        return Ok(());
    }

    let categories = parse_categories(&args.category)?;
    let endpoints = catalog::by_category(&categories);
    print!("{}", formatter.format_catalog(&endpoints, args.detailed));
    println!();
    Ok(())
}

fn manage_config(args: cli::ConfigArgs) -> Result<()> {
    match args.action {
        cli::ConfigAction::Show { config: file, json } => {
            let (app_config, path) = config::load_layered(file.as_deref(), &EnvConfig::load())?;
            match path {
                Some(path) => println!("# Source: {}", path.display()),
                None => println!("# Source: built-in defaults"),
            }
            let output = if json {
                serde_json::to_string_pretty(&app_config)?
            } else {
                serde_yaml::to_string(&app_config)?
            };
            println!("{output}");
        }

        cli::ConfigAction::Init { output, force } => {
            if output.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    output.display()
                );
            }
            AppConfig::example().save(&output)?;
            println!("✓ Configuration file created: {}", output.display());
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Env => {
            config::print_env_help();
            println!();
            let env = EnvConfig::load();
            if env.has_any() {
                env.print_summary();
            } else {
                println!("No {} variables set.", config::ENV_PREFIX);
            }
        }
    }

    Ok(())
}

fn show_reports(args: cli::ReportsArgs) -> Result<()> {
    let dir = match args.dir {
        Some(dir) => Some(dir),
        None => config::load_layered(None, &EnvConfig::load())?.0.output_dir,
    };
    let storage = ReportStorage::at(dir.as_deref());
    let reports = storage.list()?;

    if reports.is_empty() {
        println!("\n📭 No saved reports in {}", storage.base_dir().display());
        println!("   Run a sweep with: sportmonks-probe run --token <token>");
        return Ok(());
    }

    println!("\nSaved reports in {}:\n", storage.base_dir().display());
    println!("{:<22} {:<9} {:<20} {:>9}", "Run ID", "Format", "Started", "Size");
    println!("{:-<63}", "");
    for report in &reports {
        let started = report
            .started_at()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<22} {:<9} {:<20} {:>8}B",
            report.run_id,
            report.format.to_string(),
            started,
            report.size_bytes
        );
    }
    println!();

    Ok(())
}
