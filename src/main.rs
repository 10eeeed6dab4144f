//! Comptoir - business-management backend.
//!
//! Main entry point for the Comptoir CLI and job dispatcher.

mod adapters;
mod cli;
mod register;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use comptoir_scheduler::{CancellationToken, Config, Dispatcher, ScheduledJob};

use crate::adapters::{ProcessExecutor, comptoir_dir};
use crate::cli::{Cli, Commands};
use crate::register::build_registry;

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.comptoir/debug/ with daily rotation.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    // Create log directory
    let log_dir = comptoir_dir().join("debug");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("comptoir")
        .filename_suffix("log")
        .max_log_files(30) // Keep 30 days of logs
        .build(&log_dir)?;

    // Create a non-blocking writer for file output
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Store the guard in a static to keep it alive for the program duration
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console layer (human-readable text format with colors)
        .with(fmt::layer().with_target(true).with_ansi(true))
        // File layer (text format without colors)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        info!(path = %cli.config.display(), "no configuration file, using defaults");
        Config::default()
    };

    match cli.command {
        None | Some(Commands::Run) => run_dispatcher(&config).await,
        Some(Commands::Jobs { format }) => list_jobs(&config, &format),
        Some(Commands::Tick { at, format }) => dry_run_tick(&config, at.as_deref(), &format),
        Some(Commands::Check) => check_config(&config),
    }
}

/// Run the dispatcher in foreground until Ctrl-C.
async fn run_dispatcher(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Comptoir v{}", env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(build_registry(config)?);
    let executor = Arc::new(ProcessExecutor::new(&config.executor));
    let dispatcher = Dispatcher::new(registry.clone(), executor);

    for job in registry.jobs() {
        info!(
            job = %job.name(),
            trigger = %job.trigger(),
            zone = %job.timezone(),
            overlap = job.prevent_overlap(),
            "scheduled"
        );
    }

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            signal_token.cancel();
        }
    });

    dispatcher.run_until(shutdown).await;

    info!("Shutting down...");
    Ok(())
}

/// List registered jobs.
fn list_jobs(config: &Config, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let registry = build_registry(config)?;
    let now = Utc::now();

    match format {
        "json" => {
            let listing: Vec<serde_json::Value> = registry
                .jobs()
                .iter()
                .map(|job| {
                    serde_json::json!({
                        "name": job.name(),
                        "trigger": job.trigger().to_string(),
                        "cron": job.cron_expression(),
                        "timezone": job.timezone().to_string(),
                        "prevent_overlap": job.prevent_overlap(),
                        "output": job.output_sink().path(),
                        "next_run": job.next_occurrence(now).map(|t| t.to_rfc3339()),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        _ => {
            println!(
                "{:<40} {:<24} {:<16} {:<8} {}",
                "NAME", "TRIGGER", "TIMEZONE", "OVERLAP", "NEXT RUN (UTC)"
            );
            println!("{}", "-".repeat(104));
            for job in registry.jobs() {
                let next = job
                    .next_occurrence(now)
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                let overlap = if job.prevent_overlap() { "guard" } else { "-" };
                println!(
                    "{:<40} {:<24} {:<16} {:<8} {}",
                    job.name(),
                    job.trigger().to_string(),
                    job.timezone().to_string(),
                    overlap,
                    next
                );
            }
        }
    }

    Ok(())
}

/// Show the jobs due at a given instant without dispatching them.
fn dry_run_tick(
    config: &Config,
    at: Option<&str>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = build_registry(config)?;
    let now = match at {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|e| format!("invalid --at instant '{}': {}", raw, e))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let due: Vec<&ScheduledJob> = registry.due_jobs(now).collect();

    match format {
        "json" => {
            let listing: Vec<serde_json::Value> = due
                .iter()
                .map(|job| {
                    serde_json::json!({
                        "name": job.name(),
                        "trigger": job.trigger().to_string(),
                        "timezone": job.timezone().to_string(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        _ => {
            if due.is_empty() {
                println!("No jobs due at {}", now.to_rfc3339());
            } else {
                println!("Jobs due at {}:", now.to_rfc3339());
                for job in due {
                    println!("  {} ({})", job.name(), job.trigger());
                }
            }
        }
    }

    Ok(())
}

/// Validate the configuration and the resulting job table.
fn check_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let registry = build_registry(config)?;
    println!("Configuration OK: {} jobs registered", registry.len());
    for job in registry.jobs() {
        println!("  {:<40} {}", job.name(), job.trigger());
    }
    Ok(())
}
