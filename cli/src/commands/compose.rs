//! # Pilothouse Compose Passthrough
//!
//! File: cli/src/commands/compose.rs
//!
//! Implements `pilothouse compose [args...]`: runs `docker compose` against the
//! stack's project name, compose file and environment, so any compose verb
//! (`ps`, `pull`, `exec php bash`, ...) works without repeating them.
//!
use crate::common::compose::Compose;
use crate::core::{config::Config, error::Result};
use clap::Parser;
use tracing::{debug, info};

/// Arguments for `pilothouse compose`.
#[derive(Parser, Debug)]
#[command(
    about = "Run docker compose against the Pilothouse stack",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct ComposeArgs {
    /// Arguments passed to `docker compose`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

pub async fn handle_compose(args: ComposeArgs, cfg: &Config) -> Result<()> {
    info!("Handling compose command...");
    debug!("Compose args: {:?}", args.args);
    let compose = Compose::prepare(cfg)?;
    compose.run(args.args).await
}
