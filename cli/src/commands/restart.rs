//! # Pilothouse Restart Handler
//!
//! File: cli/src/commands/restart.rs
//!
//! Implements `pilothouse restart [container]`. Without an argument every
//! service of the stack is restarted; otherwise only the named compose
//! service (`nginx`, `php`, `mysql`, `memcached`, `mailcatcher`).
//!
use crate::common::compose::Compose;
use crate::core::{config::Config, error::Result};
use anyhow::Context;
use clap::Parser;
use tracing::info;

/// Arguments for `pilothouse restart`.
#[derive(Parser, Debug)]
#[command(about = "Restart the stack or a single service")]
pub struct RestartArgs {
    /// Compose service to restart (e.g. nginx, php, mysql). Restarts everything if omitted.
    container: Option<String>,
}

pub async fn handle_restart(args: RestartArgs, cfg: &Config) -> Result<()> {
    info!("Handling restart command for {:?}", args.container);
    let compose = Compose::prepare(cfg)?;

    let mut compose_args = vec!["restart".to_string()];
    match &args.container {
        Some(service) => {
            println!("Restarting '{}'...", service);
            compose_args.push(service.clone());
        }
        None => println!("Restarting all services..."),
    }
    compose
        .run(compose_args)
        .await
        .context("Failed to restart")?;
    println!("✅ Restarted.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_args_parsing() {
        let all = RestartArgs::try_parse_from(["restart"]).unwrap();
        assert_eq!(all.container, None);
        let one = RestartArgs::try_parse_from(["restart", "nginx"]).unwrap();
        assert_eq!(one.container.as_deref(), Some("nginx"));
    }
}
