//! # Pilothouse Delete Handler
//!
//! File: cli/src/commands/delete.rs
//!
//! Implements `pilothouse delete <site>`. The domain is read back from the
//! site's `nginx.conf`; if it cannot be found the default domain derived from
//! the directory name is used instead, with a warning. Dropping the database
//! needs the stack, so it is skipped with a warning when the stack is down.
//! The hosts entry and the directory are always removed (the directory is
//! kept with `--keep-files`).
//!
use crate::common::compose::{self, Compose};
use crate::common::docker::state;
use crate::common::fs::io;
use crate::common::hosts;
use crate::core::{
    config::Config,
    error::{PilothouseError, Result},
    site::Site,
};
use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::{debug, info, warn};

const USAGE: &str = "pilothouse delete <site>";

/// Arguments for `pilothouse delete`.
#[derive(Parser, Debug)]
#[command(about = "Delete a site, its database and its hosts entry")]
pub struct DeleteArgs {
    /// Name of the site directory to delete.
    site: Option<String>,

    /// Leave the site directory on disk.
    #[arg(long)]
    keep_files: bool,
}

/// Domain recorded for the site, or the default domain when none is recorded.
fn resolve_domain(site: &Site, cfg: &Config) -> Result<String> {
    match site.read_config_info()?.domain {
        Some(domain) => Ok(domain),
        None => {
            let fallback = site.default_domain(&cfg.sites.domain_suffix);
            warn!(
                "No server_name in {}; assuming domain {}",
                site.nginx_config_path().display(),
                fallback
            );
            println!(
                "⚠️ Could not read the domain for '{}'; assuming {}.",
                site.name, fallback
            );
            Ok(fallback)
        }
    }
}

pub async fn handle_delete(args: DeleteArgs, cfg: &Config) -> Result<()> {
    info!("Handling delete command...");
    debug!("Delete args: {:?}", args);

    let name = args.site.as_deref().ok_or_else(|| {
        anyhow!(PilothouseError::MissingArgument {
            what: "site name".into(),
            usage: USAGE.into(),
        })
    })?;
    let site = Site::existing(&cfg.sites_dir(), name)?;
    let domain = resolve_domain(&site, cfg)?;

    let compose = Compose::prepare(cfg)?;
    let running = match state::stack_running(compose.project()).await {
        Ok(running) => running,
        Err(e) => {
            warn!("Could not query the stack state; treating it as down: {:#}", e);
            false
        }
    };
    if running {
        println!("Dropping database '{}'...", site.database_name());
        compose
            .run_sql(&compose::drop_database_sql(&site.database_name()))
            .await
            .with_context(|| format!("Failed to drop database for '{}'", site.name))?;
    } else {
        warn!("Stack is not running; database {} left in place", site.database_name());
        println!(
            "⚠️ The stack is not running; database '{}' was not dropped.",
            site.database_name()
        );
    }

    if hosts::remove_entry(&cfg.hosts_file(), &domain).await? {
        println!("Removed hosts entry for {}.", domain);
    }

    if args.keep_files {
        info!("--keep-files given; leaving {}", site.dir.display());
    } else {
        io::remove_dir_if_exists(&site.dir)?;
        println!("Removed {}.", site.dir.display());
    }

    if running {
        if let Err(e) = compose.reload_nginx_if_running().await {
            warn!("Failed to reload nginx: {:#}", e);
        }
    }

    println!("✅ Site '{}' deleted.", site.name);
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_delete_args_parsing() {
        let args = DeleteArgs::try_parse_from(["delete", "blog", "--keep-files"]).unwrap();
        assert_eq!(args.site.as_deref(), Some("blog"));
        assert!(args.keep_files);
        assert_eq!(DeleteArgs::try_parse_from(["delete"]).unwrap().site, None);
    }

    #[test]
    fn test_resolve_domain() -> Result<()> {
        let dir = tempdir()?;
        let mut cfg = Config::default();
        cfg.paths.sites = Some(dir.path().display().to_string());

        fs::create_dir(dir.path().join("blog"))?;
        let site = Site::existing(&cfg.sites_dir(), "blog")?;
        assert_eq!(resolve_domain(&site, &cfg)?, "blog.test");

        fs::write(
            site.nginx_config_path(),
            "server {\n    server_name news.local;\n}\n",
        )?;
        assert_eq!(resolve_domain(&site, &cfg)?, "news.local");
        Ok(())
    }
}
