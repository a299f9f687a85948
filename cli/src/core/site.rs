//! # Pilothouse Sites
//!
//! File: cli/src/core/site.rs
//!
//! ## Overview
//!
//! A site is a directory under the sites root. Pilothouse keeps no registry of
//! sites: everything it knows about one (domain, image proxy, TLS) is written
//! into the site's generated `nginx.conf` and read back from there by pattern
//! matching. This module owns the naming rules, the on-disk layout and that
//! parser.
//!
//! ## Layout
//!
//! ```text
//! <sites>/<name>/
//!   nginx.conf            generated server block
//!   wordpress/            document root
//!   ssl/<domain>.crt|key  certificate pair
//! ```
//!
//! Inside the containers the sites root is mounted at `/var/www/html`.
//!
use crate::core::error::{PilothouseError, Result};
use anyhow::{anyhow, Context};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Mount point of the sites root inside the nginx, php and wp-cli containers.
pub const CONTAINER_SITES_ROOT: &str = "/var/www/html";

const NGINX_CONFIG_FILE: &str = "nginx.conf";
const DOCUMENT_ROOT_DIR: &str = "wordpress";
const SSL_DIR: &str = "ssl";
const MAX_NAME_LEN: usize = 64;

/// One site directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub name: String,
    pub dir: PathBuf,
}

/// Attributes recovered from a site's `nginx.conf`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteConfigInfo {
    pub domain: Option<String>,
    pub proxy_url: Option<String>,
    pub ssl: bool,
}

impl Site {
    /// Builds a site handle for a name that may not exist on disk yet.
    pub fn new(sites_root: &Path, name: &str) -> Result<Self> {
        validate_site_name(name)?;
        Ok(Self {
            name: name.to_string(),
            dir: sites_root.join(name),
        })
    }

    /// Builds a site handle and requires its directory to exist.
    pub fn existing(sites_root: &Path, name: &str) -> Result<Self> {
        let site = Self::new(sites_root, name)?;
        if !site.dir.is_dir() {
            return Err(anyhow!(PilothouseError::SiteNotFound {
                name: site.name,
                path: site.dir.display().to_string(),
            }));
        }
        Ok(site)
    }

    pub fn nginx_config_path(&self) -> PathBuf {
        self.dir.join(NGINX_CONFIG_FILE)
    }

    pub fn document_root(&self) -> PathBuf {
        self.dir.join(DOCUMENT_ROOT_DIR)
    }

    pub fn ssl_dir(&self) -> PathBuf {
        self.dir.join(SSL_DIR)
    }

    /// Document root as seen from inside the containers.
    pub fn container_document_root(&self) -> String {
        format!("{}/{}/{}", CONTAINER_SITES_ROOT, self.name, DOCUMENT_ROOT_DIR)
    }

    /// Directory holding the certificate pair, as seen from inside the containers.
    pub fn container_ssl_dir(&self) -> String {
        format!("{}/{}/{}", CONTAINER_SITES_ROOT, self.name, SSL_DIR)
    }

    /// MariaDB database name for the site.
    pub fn database_name(&self) -> String {
        self.name.to_ascii_lowercase().replace('-', "_")
    }

    /// Default domain, used at creation and as the deletion fallback.
    pub fn default_domain(&self, suffix: &str) -> String {
        format!("{}{}", self.name.to_ascii_lowercase(), suffix)
    }

    /// Reads back the attributes stored in the site's `nginx.conf`.
    /// A missing file yields empty info.
    pub fn read_config_info(&self) -> Result<SiteConfigInfo> {
        let path = self.nginx_config_path();
        if !path.is_file() {
            debug!("No nginx config at {}", path.display());
            return Ok(SiteConfigInfo::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read site config {}", path.display()))?;
        Ok(parse_site_config(&content))
    }

    /// Domain from already-read config info, or `MissingDomain`.
    pub fn require_domain(&self, info: &SiteConfigInfo) -> Result<String> {
        info.domain.clone().ok_or_else(|| {
            anyhow!(PilothouseError::MissingDomain {
                site: self.name.clone(),
                config: self.nginx_config_path().display().to_string(),
            })
        })
    }
}

/// Checks the naming rules: 1..=64 chars of `[A-Za-z0-9_-]`, not starting with `-` or `_`.
pub fn validate_site_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.len() > MAX_NAME_LEN {
        Some("name is longer than 64 characters")
    } else if name.starts_with(['-', '_']) {
        Some("name must start with a letter or digit")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Some("only letters, digits, '-' and '_' are allowed")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(anyhow!(PilothouseError::InvalidSiteName {
            name: name.to_string(),
            reason: reason.to_string(),
        })),
        None => Ok(()),
    }
}

/// Checks an image proxy upstream and returns it without a trailing `/`.
///
/// The value lands verbatim in a `proxy_pass` inside a named location, so only
/// `http(s)://host[:port]` with an optional bare `/` path is accepted.
pub fn normalize_proxy_url(url: &str) -> Result<String> {
    let reject = |reason: &str| {
        Err(anyhow!(PilothouseError::InvalidProxyUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }))
    };
    let Some(rest) = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
    else {
        return reject("must start with http:// or https://");
    };
    let authority = match rest.split_once('/') {
        Some((authority, "")) => authority,
        Some(_) => return reject("only a bare host is allowed, without a path"),
        None => rest,
    };
    if authority.is_empty() {
        return reject("host is empty");
    }
    if !authority
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '[' | ']'))
    {
        return reject("host contains characters not allowed in an nginx proxy_pass");
    }
    Ok(url.trim_end_matches('/').to_string())
}

/// Pattern-matches the directives Pilothouse writes into a server block.
pub fn parse_site_config(content: &str) -> SiteConfigInfo {
    let mut info = SiteConfigInfo::default();
    for line in content.lines().map(str::trim) {
        if line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("server_name") if info.domain.is_none() => {
                info.domain = tokens
                    .next()
                    .map(|t| t.trim_end_matches(';'))
                    .filter(|t| !t.is_empty())
                    .map(str::to_string);
            }
            Some("proxy_pass") if info.proxy_url.is_none() => {
                info.proxy_url = tokens
                    .next()
                    .map(|t| t.trim_end_matches(';'))
                    .filter(|t| !t.is_empty())
                    .map(str::to_string);
            }
            Some("listen") => {
                if tokens.any(|t| t.trim_end_matches(';') == "ssl") {
                    info.ssl = true;
                }
            }
            _ => {}
        }
    }
    info
}

/// Lists site directories directly under `sites_root`, sorted by name.
/// Hidden directories and names that fail validation are skipped.
pub fn list_sites(sites_root: &Path) -> Result<Vec<Site>> {
    if !sites_root.is_dir() {
        debug!("Sites root {} does not exist yet", sites_root.display());
        return Ok(Vec::new());
    }
    let mut sites = Vec::new();
    for entry in WalkDir::new(sites_root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to read entry in '{}': {}", sites_root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || validate_site_name(&name).is_err() {
            debug!("Skipping non-site directory {}", entry.path().display());
            continue;
        }
        sites.push(Site {
            name: name.to_string(),
            dir: entry.path().to_path_buf(),
        });
    }
    Ok(sites)
}

/// Maps a host directory inside the sites root to its path in the containers.
/// Returns `None` when `cwd` lies outside the sites root.
pub fn container_path_for(sites_root: &Path, cwd: &Path) -> Option<String> {
    let relative = cwd.strip_prefix(sites_root).ok()?;
    let mut path = CONTAINER_SITES_ROOT.to_string();
    for component in relative.components() {
        path.push('/');
        path.push_str(&component.as_os_str().to_string_lossy());
    }
    Some(path)
}
