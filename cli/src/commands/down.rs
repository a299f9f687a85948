//! # Pilothouse Down Handler
//!
//! File: cli/src/commands/down.rs
//!
//! Implements `pilothouse down`: stops and removes the stack's containers.
//! The database volume is kept unless `--volumes` is given.
//!
use crate::common::compose::Compose;
use crate::core::{config::Config, error::Result};
use anyhow::Context;
use clap::Parser;
use tracing::info;

/// Arguments for `pilothouse down`.
#[derive(Parser, Debug)]
#[command(about = "Stop the Pilothouse stack")]
pub struct DownArgs {
    /// Also remove the database volume. Every site database is lost.
    #[arg(long)]
    volumes: bool,
}

pub async fn handle_down(args: DownArgs, cfg: &Config) -> Result<()> {
    info!("Handling down command (volumes: {})", args.volumes);
    let compose = Compose::prepare(cfg)?;
    let mut compose_args = vec!["down", "--remove-orphans"];
    if args.volumes {
        compose_args.push("--volumes");
    }
    println!("Stopping Pilothouse stack '{}'...", compose.project());
    compose
        .run(compose_args)
        .await
        .context("Failed to stop the stack")?;
    println!("✅ Pilothouse is down.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_down_args_parsing() {
        assert!(!DownArgs::try_parse_from(["down"]).unwrap().volumes);
        assert!(DownArgs::try_parse_from(["down", "--volumes"]).unwrap().volumes);
    }
}
