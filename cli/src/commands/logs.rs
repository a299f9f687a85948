//! # Pilothouse Logs Handler
//!
//! File: cli/src/commands/logs.rs
//!
//! ## Overview
//!
//! Implements `pilothouse logs [container]`, showing `docker compose logs` for
//! one service or the whole stack. Logs are followed by default; `--no-follow`
//! prints the tail and exits.
//!
//! ## Usage
//!
//! ```bash
//! # Follow every service
//! pilothouse logs
//!
//! # Last 500 lines of php, then exit
//! pilothouse logs php -n 500 --no-follow
//!
//! # Whole history of nginx
//! pilothouse logs nginx --lines all
//! ```
//!
use crate::common::compose::Compose;
use crate::core::{config::Config, error::Result};
use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, warn};

const DEFAULT_TAIL: &str = "100";

/// Arguments for `pilothouse logs`.
#[derive(Parser, Debug)]
#[command(about = "Show logs from the stack or a single service")]
pub struct LogsArgs {
    /// Compose service whose logs to show. Shows every service if omitted.
    container: Option<String>,

    /// Number of lines to show from the end of the logs, or "all".
    /// Invalid values fall back to 100.
    #[arg(long, short = 'n', default_value = DEFAULT_TAIL)]
    lines: String,

    /// Print the current logs and exit instead of streaming new output.
    #[arg(long)]
    no_follow: bool,
}

/// Validates `--lines`: "all" (any case) or a number; anything else becomes the default.
fn tail_value(lines: &str) -> String {
    let trimmed = lines.trim();
    if trimmed.eq_ignore_ascii_case("all") {
        "all".to_string()
    } else if trimmed.parse::<u32>().is_ok() {
        trimmed.to_string()
    } else {
        warn!(
            "Invalid value for --lines: '{}'. Using default '{}'.",
            lines, DEFAULT_TAIL
        );
        DEFAULT_TAIL.to_string()
    }
}

fn compose_logs_args(args: &LogsArgs) -> Vec<String> {
    let mut compose_args = vec!["logs".to_string(), "--tail".to_string(), tail_value(&args.lines)];
    if !args.no_follow {
        compose_args.push("--follow".to_string());
    }
    if let Some(service) = &args.container {
        compose_args.push(service.clone());
    }
    compose_args
}

pub async fn handle_logs(args: LogsArgs, cfg: &Config) -> Result<()> {
    info!("Handling logs command...");
    debug!("Logs args: {:?}", args);

    let compose = Compose::prepare(cfg)?;
    compose
        .run(compose_logs_args(&args))
        .await
        .with_context(|| match &args.container {
            Some(service) => format!("Failed to get logs for '{}'", service),
            None => "Failed to get logs".to_string(),
        })?;
    Ok(())
}
