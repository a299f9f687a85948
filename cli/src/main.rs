//! # Pilothouse Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point for the `pilothouse` CLI, which runs a Docker Compose stack
//! (nginx, PHP-FPM, MariaDB, memcached, a mail catcher) hosting any number of
//! local WordPress sites. This file handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Loading the configuration once and routing to the command handlers
//!
//! ## Examples
//!
//! ```bash
//! # Start the stack and create a site
//! pilothouse up
//! pilothouse create blog
//!
//! # Run WP-CLI with debug logging
//! pilothouse -vv wp plugin list
//! ```
//!
//! Command processing flow:
//! 1. Parse command-line args via Clap (passthrough verbs keep their argv)
//! 2. Configure logging based on verbosity level
//! 3. Load configuration (`--config`, user file, environment)
//! 4. Route to the command handler
//! 5. Print any error as `Error: ...` and exit with status 1
//!
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // One module per verb
mod common; // Process, compose, docker, hosts, ssl, fs helpers
mod core; // Errors, config, sites, stack files, templating

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "pilothouse",
    about = "⚓ Pilothouse: local WordPress sites on Docker Compose",
    long_about = "Runs an nginx + PHP-FPM + MariaDB + memcached + mail-catcher stack\n\
                  and creates, deletes and manages WordPress sites on it.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Configuration file to use instead of the user config file.
    #[arg(long, global = true, env = "PILOTHOUSE_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,
}

/// All top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    Up(commands::up::UpArgs),
    Down(commands::down::DownArgs),
    Restart(commands::restart::RestartArgs),
    Create(commands::create::CreateArgs),
    Delete(commands::delete::DeleteArgs),
    GenerateSsl(commands::generate_ssl::GenerateSslArgs),
    Mysql(commands::mysql::MysqlArgs),
    #[command(alias = "wp")]
    WpCli(commands::wp_cli::WpCliArgs),
    Compose(commands::compose::ComposeArgs),
    Logs(commands::logs::LogsArgs),
    #[command(alias = "ls")]
    List(commands::list::ListArgs),
}

/// Verbs whose arguments belong to another program.
const PASSTHROUGH_VERBS: &[&str] = &["wp-cli", "wp", "compose", "mysql"];

/// Inserts `--` after a passthrough verb so that clap hands everything after
/// it to the verb untouched, `--help`, `--version`, `-v` and `--config` included.
fn passthrough_argv<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    let mut i = 1;
    while i < argv.len() {
        let token = argv[i].to_string_lossy();
        if token == "--config" {
            i += 2;
        } else if token.starts_with('-') {
            i += 1;
        } else {
            if PASSTHROUGH_VERBS.contains(&token.as_ref()) {
                argv.insert(i + 1, OsString::from("--"));
            }
            break;
        }
    }
    argv
}

fn parse_cli<I, T>(argv: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    Cli::try_parse_from(passthrough_argv(argv))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = crate::core::config::load_config(cli.config.as_deref())?;
    tracing::debug!("Loaded configuration: {:?}", cfg);

    match cli.command {
        Commands::Up(args) => commands::up::handle_up(args, &cfg).await,
        Commands::Down(args) => commands::down::handle_down(args, &cfg).await,
        Commands::Restart(args) => commands::restart::handle_restart(args, &cfg).await,
        Commands::Create(args) => commands::create::handle_create(args, &cfg).await,
        Commands::Delete(args) => commands::delete::handle_delete(args, &cfg).await,
        Commands::GenerateSsl(args) => {
            commands::generate_ssl::handle_generate_ssl(args, &cfg).await
        }
        Commands::Mysql(args) => commands::mysql::handle_mysql(args, &cfg).await,
        Commands::WpCli(args) => commands::wp_cli::handle_wp_cli(args, &cfg).await,
        Commands::Compose(args) => commands::compose::handle_compose(args, &cfg).await,
        Commands::Logs(args) => commands::logs::handle_logs(args, &cfg).await,
        Commands::List(args) => commands::list::handle_list(args, &cfg).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = parse_cli(std::env::args_os()).unwrap_or_else(|e| e.exit());

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
