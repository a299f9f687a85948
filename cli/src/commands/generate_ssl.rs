//! # Pilothouse Generate-SSL Handler
//!
//! File: cli/src/commands/generate_ssl.rs
//!
//! Implements `pilothouse generate-ssl <site>`: (re)generates the self-signed
//! certificate pair for the domain recorded in the site's `nginx.conf`. A site
//! created with `--no-ssl` gets its server block re-rendered with TLS enabled,
//! keeping its domain and image proxy.
//!
use crate::common::compose::Compose;
use crate::common::fs::io;
use crate::common::{hosts, ssl};
use crate::core::{
    config::Config,
    error::{PilothouseError, Result},
    site::Site,
    templating::{render_site_config, SiteTemplateContext},
};
use anyhow::anyhow;
use clap::Parser;
use tracing::{debug, info, warn};

const USAGE: &str = "pilothouse generate-ssl <site>";

/// Arguments for `pilothouse generate-ssl`.
#[derive(Parser, Debug)]
#[command(about = "Generate (or regenerate) the TLS certificate for a site")]
pub struct GenerateSslArgs {
    /// Name of the site directory.
    site: Option<String>,
}

pub async fn handle_generate_ssl(args: GenerateSslArgs, cfg: &Config) -> Result<()> {
    info!("Handling generate-ssl command...");
    debug!("Generate-ssl args: {:?}", args);

    let name = args.site.as_deref().ok_or_else(|| {
        anyhow!(PilothouseError::MissingArgument {
            what: "site name".into(),
            usage: USAGE.into(),
        })
    })?;
    let site = Site::existing(&cfg.sites_dir(), name)?;
    let info = site.read_config_info()?;
    let domain = site.require_domain(&info)?;
    hosts::validate_domain(&domain)?;

    println!("Generating certificate for {}...", domain);
    let paths = ssl::generate_certificate(&cfg.ssl, &site.ssl_dir(), &domain).await?;

    if !info.ssl {
        info!("Enabling TLS in {}", site.nginx_config_path().display());
        let context = SiteTemplateContext::new(&site, &domain, info.proxy_url.as_deref(), true);
        io::write_string_to_file(&site.nginx_config_path(), &render_site_config(&context)?)?;
        println!("Enabled HTTPS in {}.", site.nginx_config_path().display());
    }

    let compose = Compose::new(cfg);
    if let Err(e) = compose.reload_nginx_if_running().await {
        warn!("Failed to reload nginx: {:#}", e);
    }

    println!("✅ Certificate written to {}.", paths.certificate.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ssl_args_parsing() {
        let args = GenerateSslArgs::try_parse_from(["generate-ssl", "blog"]).unwrap();
        assert_eq!(args.site.as_deref(), Some("blog"));
        assert_eq!(
            GenerateSslArgs::try_parse_from(["generate-ssl"]).unwrap().site,
            None
        );
    }
}
