//! # Pilothouse Create Handler
//!
//! File: cli/src/commands/create.rs
//!
//! ## Overview
//!
//! Implements `pilothouse create <site>`, which provisions a new WordPress site
//! on the running stack:
//!
//! 1. Validate the site name and refuse an existing directory.
//! 2. Require the stack to be running.
//! 3. Create `<sites>/<site>/wordpress` and generate the TLS pair (unless `--no-ssl`).
//! 4. Render `<sites>/<site>/nginx.conf`.
//! 5. Create the site database.
//! 6. Download, configure and install WordPress through WP-CLI (unless `--empty`).
//! 7. Add the `#pilothouse` hosts entry and reload nginx.
//!
//! ## Usage
//!
//! ```bash
//! pilothouse create blog
//! pilothouse create shop --domain shop.local --proxy https://shop.example.com
//! pilothouse create scratch --no-ssl --empty
//! ```
//!
use crate::common::compose::{self, Compose};
use crate::common::docker::state;
use crate::common::fs::io;
use crate::common::{hosts, ssl};
use crate::core::{
    config::{Config, SitesConfig},
    error::{PilothouseError, Result},
    site::{normalize_proxy_url, Site, CONTAINER_SITES_ROOT},
    templating::{render_site_config, SiteTemplateContext},
};
use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::{debug, info};

const USAGE: &str = "pilothouse create <site>";

/// Arguments for `pilothouse create`.
#[derive(Parser, Debug)]
#[command(about = "Create a new WordPress site")]
pub struct CreateArgs {
    /// Name of the site directory (letters, digits, '-' and '_').
    site: Option<String>,

    /// Domain to serve the site at. Defaults to `<site><domain_suffix>`.
    #[arg(long)]
    domain: Option<String>,

    /// Upstream URL that missing images are fetched from.
    #[arg(long, value_name = "URL", value_parser = parse_proxy_url)]
    proxy: Option<String>,

    /// Serve the site over plain HTTP only.
    #[arg(long)]
    no_ssl: bool,

    /// Skip the WordPress download and install; only the directory, database and vhost are created.
    #[arg(long)]
    empty: bool,
}

fn parse_proxy_url(value: &str) -> std::result::Result<String, String> {
    normalize_proxy_url(value).map_err(|e| e.to_string())
}

/// WP-CLI invocations that install WordPress into `site`'s document root.
fn wordpress_install_steps(
    site: &Site,
    domain: &str,
    ssl: bool,
    sites: &SitesConfig,
    root_password: &str,
) -> Vec<Vec<String>> {
    let path = format!("--path={}", site.container_document_root());
    let scheme = if ssl { "https" } else { "http" };
    vec![
        vec!["core".into(), "download".into(), path.clone()],
        vec![
            "config".into(),
            "create".into(),
            path.clone(),
            format!("--dbname={}", site.database_name()),
            "--dbuser=root".into(),
            format!("--dbpass={}", root_password),
            "--dbhost=mysql".into(),
            "--skip-check".into(),
        ],
        vec![
            "core".into(),
            "install".into(),
            path,
            format!("--url={}://{}", scheme, domain),
            format!("--title={}", site.name),
            format!("--admin_user={}", sites.admin_user),
            format!("--admin_password={}", sites.admin_password),
            format!("--admin_email={}", sites.admin_email),
            "--skip-email".into(),
        ],
    ]
}

/// Points at `delete` once files or the database may already exist.
fn partly_created(err: anyhow::Error, site: &Site) -> anyhow::Error {
    err.context(format!(
        "Site '{name}' was only partly created; run `pilothouse delete {name}` before retrying",
        name = site.name
    ))
}

pub async fn handle_create(args: CreateArgs, cfg: &Config) -> Result<()> {
    info!("Handling create command...");
    debug!("Create args: {:?}", args);

    let name = args.site.as_deref().ok_or_else(|| {
        anyhow!(PilothouseError::MissingArgument {
            what: "site name".into(),
            usage: USAGE.into(),
        })
    })?;
    let site = Site::new(&cfg.sites_dir(), name)?;
    if site.dir.exists() {
        return Err(anyhow!(PilothouseError::SiteExists {
            name: site.name.clone(),
            path: site.dir.display().to_string(),
        }));
    }

    let domain = args
        .domain
        .clone()
        .unwrap_or_else(|| site.default_domain(&cfg.sites.domain_suffix))
        .to_ascii_lowercase();
    hosts::validate_domain(&domain)?;
    let proxy = args.proxy.clone().or_else(|| cfg.sites.default_proxy.clone());
    let use_ssl = !args.no_ssl;
    let scheme = if use_ssl { "https" } else { "http" };

    let compose = Compose::prepare(cfg)?;
    state::require_stack_running(compose.project()).await?;

    println!("Creating site '{}' at {}://{}...", site.name, scheme, domain);
    io::ensure_dir_exists(&site.document_root())?;

    let provisioned: Result<()> = async {
        if use_ssl {
            println!("Generating certificate for {}...", domain);
            ssl::generate_certificate(&cfg.ssl, &site.ssl_dir(), &domain).await?;
        }

        let context = SiteTemplateContext::new(&site, &domain, proxy.as_deref(), use_ssl);
        let rendered = render_site_config(&context)?;
        io::write_string_to_file(&site.nginx_config_path(), &rendered)?;
        info!("Wrote {}", site.nginx_config_path().display());

        println!("Creating database '{}'...", site.database_name());
        compose
            .run_sql(&compose::create_database_sql(&site.database_name()))
            .await
            .with_context(|| format!("Failed to create database for '{}'", site.name))?;

        if args.empty {
            info!("--empty given; skipping WordPress install");
        } else {
            println!("Installing WordPress...");
            let steps = wordpress_install_steps(
                &site,
                &domain,
                use_ssl,
                &cfg.sites,
                &cfg.database.root_password,
            );
            for step in &steps {
                compose
                    .wp_checked(CONTAINER_SITES_ROOT, step)
                    .await
                    .with_context(|| format!("WP-CLI step `wp {} {}` failed", step[0], step[1]))?;
            }
        }

        hosts::add_entry(&cfg.hosts_file(), &domain).await?;
        compose.reload_nginx_if_running().await?;
        Ok(())
    }
    .await;
    provisioned.map_err(|e| partly_created(e, &site))?;

    println!("✅ Site '{}' created.", site.name);
    println!("   URL:       {}://{}", scheme, domain);
    println!("   Files:     {}", site.document_root().display());
    println!("   Database:  {}", site.database_name());
    if !args.empty {
        println!(
            "   Admin:     {}://{}/wp-admin ({} / {})",
            scheme, domain, cfg.sites.admin_user, cfg.sites.admin_password
        );
    }
    Ok(())
}
