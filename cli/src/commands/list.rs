//! # Pilothouse List Handler
//!
//! File: cli/src/commands/list.rs
//!
//! Implements `pilothouse list` (alias `ls`). There is no site registry: the
//! sites root is scanned and each site's `nginx.conf` is read back for its
//! domain, TLS flag and image proxy.
//!
use crate::core::{
    config::Config,
    error::Result,
    site::{list_sites, Site, SiteConfigInfo},
};
use clap::Parser;
use tracing::{info, warn};

/// Arguments for `pilothouse list`.
#[derive(Parser, Debug)]
#[command(about = "List the sites in the sites directory")]
pub struct ListArgs {}

fn format_row(site: &Site, info: &SiteConfigInfo) -> String {
    format!(
        "{:<24} {:<32} {:<5} {}",
        site.name,
        info.domain.as_deref().unwrap_or("(no domain)"),
        if info.ssl { "yes" } else { "no" },
        info.proxy_url.as_deref().unwrap_or("-")
    )
}

pub async fn handle_list(_args: ListArgs, cfg: &Config) -> Result<()> {
    info!("Handling list command...");
    let sites_dir = cfg.sites_dir();
    let sites = list_sites(&sites_dir)?;
    if sites.is_empty() {
        println!("No sites found in {}.", sites_dir.display());
        return Ok(());
    }

    println!("{:<24} {:<32} {:<5} {}", "SITE", "DOMAIN", "TLS", "PROXY");
    for site in &sites {
        let info = site.read_config_info().unwrap_or_else(|e| {
            warn!("Could not read config for '{}': {:#}", site.name, e);
            SiteConfigInfo::default()
        });
        println!("{}", format_row(site, &info));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_format_row() {
        let site = Site::new(Path::new("/srv/sites"), "blog").unwrap();
        let info = SiteConfigInfo {
            domain: Some("blog.test".into()),
            proxy_url: Some("https://blog.example.com".into()),
            ssl: true,
        };
        let row = format_row(&site, &info);
        assert!(row.starts_with("blog "));
        assert!(row.contains("blog.test"));
        assert!(row.contains("yes"));
        assert!(row.ends_with("https://blog.example.com"));

        let empty = format_row(&site, &SiteConfigInfo::default());
        assert!(empty.contains("(no domain)"));
        assert!(empty.ends_with('-'));
    }
}
