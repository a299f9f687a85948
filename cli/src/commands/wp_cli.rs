//! # Pilothouse WP-CLI Handler
//!
//! File: cli/src/commands/wp_cli.rs
//!
//! ## Overview
//!
//! Implements `pilothouse wp-cli [args...]` (alias `wp`), running WP-CLI in a
//! one-off `wp-cli` container. Every argument, including ones starting with
//! `-`, is forwarded untouched.
//!
//! The container starts in the directory matching the host's current
//! directory when that lies inside the sites root, so running
//! `pilothouse wp plugin list` from `<sites>/blog/wordpress` targets that site.
//! Anywhere else it starts in `/var/www/html`.
//!
use crate::common::compose::Compose;
use crate::common::process;
use crate::core::{
    config::Config,
    error::Result,
    site::{container_path_for, CONTAINER_SITES_ROOT},
};
use clap::Parser;
use std::io::IsTerminal;
use std::path::Path;
use tracing::{debug, info};

/// Arguments for `pilothouse wp-cli`.
#[derive(Parser, Debug)]
#[command(
    about = "Run WP-CLI inside the stack",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct WpCliArgs {
    /// Arguments passed to `wp`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Container working directory for a host directory.
fn container_workdir(sites_root: &Path, cwd: &Path) -> String {
    // Canonicalize both sides so symlinked homes still match.
    let root = sites_root
        .canonicalize()
        .unwrap_or_else(|_| sites_root.to_path_buf());
    let cwd = cwd.canonicalize().unwrap_or_else(|_| cwd.to_path_buf());
    container_path_for(&root, &cwd).unwrap_or_else(|| CONTAINER_SITES_ROOT.to_string())
}

pub async fn handle_wp_cli(args: WpCliArgs, cfg: &Config) -> Result<()> {
    info!("Handling wp-cli command...");
    debug!("WP-CLI args: {:?}", args);

    let compose = Compose::prepare(cfg)?;
    let cwd = std::env::current_dir()?;
    let workdir = container_workdir(&cfg.sites_dir(), &cwd);
    debug!("WP-CLI working directory: {}", workdir);

    let tty = std::io::stdin().is_terminal();
    process::run_streamed(&compose.wp_spec(&workdir, &args.args, tty)).await
}
