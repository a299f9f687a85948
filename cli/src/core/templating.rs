//! # Pilothouse Template System
//!
//! File: cli/src/core/templating.rs
//!
//! ## Overview
//!
//! Renders the per-site Nginx server block from the Tera template embedded in
//! the binary (`assets/templates/site.conf.tera`). The rendered file carries
//! everything Pilothouse later needs to know about a site, and
//! `core::site::parse_site_config` reads it back.
//!
//! ## Examples
//!
//! ```rust
//! let context = SiteTemplateContext::new(&site, "blog.test", Some("https://blog.example.com"), true);
//! let rendered = templating::render_site_config(&context)?;
//! io::write_string_to_file(&site.nginx_config_path(), &rendered)?;
//! ```
//!
use crate::core::error::{PilothouseError, Result};
use crate::core::site::Site;
use anyhow::anyhow;
use serde::Serialize;
use tera::Tera;
use tracing::debug;

const SITE_TEMPLATE: &str = include_str!("../../assets/templates/site.conf.tera");

/// Values substituted into the server block template.
#[derive(Serialize, Debug, Clone)]
pub struct SiteTemplateContext {
    pub site: String,
    pub domain: String,
    pub root: String,
    pub proxy_url: Option<String>,
    pub ssl: bool,
    pub ssl_certificate: String,
    pub ssl_certificate_key: String,
    pub generated_at: String,
}

impl SiteTemplateContext {
    pub fn new(site: &Site, domain: &str, proxy_url: Option<&str>, ssl: bool) -> Self {
        let ssl_dir = site.container_ssl_dir();
        Self {
            site: site.name.clone(),
            domain: domain.to_string(),
            root: site.container_document_root(),
            proxy_url: proxy_url
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            ssl,
            ssl_certificate: format!("{}/{}.crt", ssl_dir, domain),
            ssl_certificate_key: format!("{}/{}.key", ssl_dir, domain),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Renders the server block for one site.
pub fn render_site_config(context: &SiteTemplateContext) -> Result<String> {
    let tera_context = tera::Context::from_serialize(context).map_err(|e| {
        anyhow!(PilothouseError::Template { source: e })
            .context("Failed to create Tera context for site config")
    })?;
    // Autoescaping is for HTML; it would mangle the paths in an nginx config.
    let rendered = Tera::one_off(SITE_TEMPLATE, &tera_context, false).map_err(|e| {
        anyhow!(PilothouseError::Template { source: e }).context(format!(
            "Tera rendering failed for site config of '{}'",
            context.site
        ))
    })?;
    debug!("Rendered nginx config for {}", context.site);
    Ok(rendered)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::site::parse_site_config;
    use std::path::Path;

    fn site() -> Site {
        Site::new(Path::new("/srv/sites"), "blog").unwrap()
    }

    #[test]
    fn test_render_with_ssl_and_proxy() -> Result<()> {
        let context =
            SiteTemplateContext::new(&site(), "blog.test", Some("https://blog.example.com/"), true);
        let rendered = render_site_config(&context)?;

        assert!(rendered.contains("server_name blog.test;"));
        assert!(rendered.contains("root /var/www/html/blog/wordpress;"));
        assert!(rendered.contains("listen 443 ssl;"));
        assert!(rendered.contains("ssl_certificate /var/www/html/blog/ssl/blog.test.crt;"));
        assert!(rendered.contains("ssl_certificate_key /var/www/html/blog/ssl/blog.test.key;"));
        assert!(rendered.contains("proxy_pass https://blog.example.com;"));
        assert!(rendered.contains("include /etc/nginx/partials/wordpress.conf;"));
        // The proxy block must precede the shared partial so it wins the regex match.
        assert!(
            rendered.find("@image_proxy").unwrap()
                < rendered.find("include /etc/nginx/partials").unwrap()
        );
        Ok(())
    }

    #[test]
    fn test_render_plain() -> Result<()> {
        let context = SiteTemplateContext::new(&site(), "blog.test", None, false);
        let rendered = render_site_config(&context)?;
        assert!(rendered.contains("listen 80;"));
        assert!(!rendered.contains("listen 443"));
        assert!(!rendered.contains("ssl_certificate"));
        assert!(!rendered.contains("proxy_pass"));
        Ok(())
    }

    #[test]
    fn test_empty_proxy_is_dropped() {
        let context = SiteTemplateContext::new(&site(), "blog.test", Some(""), false);
        assert_eq!(context.proxy_url, None);
    }

    #[test]
    fn test_rendered_config_parses_back() -> Result<()> {
        let context =
            SiteTemplateContext::new(&site(), "shop.test", Some("https://shop.example.com"), true);
        let info = parse_site_config(&render_site_config(&context)?);
        assert_eq!(info.domain.as_deref(), Some("shop.test"));
        assert_eq!(info.proxy_url.as_deref(), Some("https://shop.example.com"));
        assert!(info.ssl);
        Ok(())
    }
}
