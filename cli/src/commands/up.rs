//! # Pilothouse Up Handler
//!
//! File: cli/src/commands/up.rs
//!
//! ## Overview
//!
//! Implements `pilothouse up`: refresh the stack files in the stack home,
//! start every service with `docker compose up -d`, then wait until MariaDB
//! accepts connections so that commands run right afterwards (`create`,
//! `mysql`) do not race the database startup.
//!
//! ## Usage
//!
//! ```bash
//! pilothouse up
//! pilothouse up --no-wait
//! ```
//!
use crate::common::compose::Compose;
use crate::core::{config::Config, error::Result};
use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

/// Arguments for `pilothouse up`.
#[derive(Parser, Debug)]
#[command(about = "Start the Pilothouse stack")]
pub struct UpArgs {
    /// Return as soon as the containers are started, without waiting for the database.
    #[arg(long)]
    no_wait: bool,
}

pub async fn handle_up(args: UpArgs, cfg: &Config) -> Result<()> {
    info!("Handling up command...");
    debug!("Up args: {:?}", args);

    let compose = Compose::prepare(cfg)?;
    println!("Starting Pilothouse stack '{}'...", compose.project());
    compose
        .run(["up", "-d", "--remove-orphans"])
        .await
        .context("Failed to start the stack")?;

    if !args.no_wait {
        println!("Waiting for the database to accept connections...");
        compose.wait_for_database(&cfg.database).await?;
    }

    println!("✅ Pilothouse is up.");
    println!("   Sites:     {}", cfg.sites_dir().display());
    println!("   Mail UI:   http://localhost:8025");
    Ok(())
}
