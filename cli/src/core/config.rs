//! # Pilothouse Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, expands and validates the Pilothouse configuration. The
//! configuration says where the stack lives on disk, where sites are kept, which
//! hosts file to edit, how to reach the database and how to call Docker Compose.
//!
//! ## Architecture
//!
//! Configuration is layered, later layers winning:
//! 1. Default values defined in the code
//! 2. A TOML file: the `--config` path (or `PILOTHOUSE_CONFIG`) when given,
//!    otherwise the user file `config.toml` in the platform config directory
//! 3. Environment overrides: `PILOTHOUSE_HOME`, `PILOTHOUSE_SITES_DIR`,
//!    `PILOTHOUSE_HOSTS_FILE`
//!
//! Paths are then `~`-expanded and the result validated before use.
//!
//! ## Examples
//!
//! ```rust
//! let cfg = config::load_config(None)?;
//! let sites_root = cfg.sites_dir();
//! let suffix = &cfg.sites.domain_suffix;
//! ```
//!
use crate::core::error::{PilothouseError, Result};
use crate::core::site::normalize_proxy_url;
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Environment variable overriding the stack home directory.
pub const ENV_HOME: &str = "PILOTHOUSE_HOME";
/// Environment variable overriding the sites directory.
pub const ENV_SITES_DIR: &str = "PILOTHOUSE_SITES_DIR";
/// Environment variable overriding the hosts file path.
pub const ENV_HOSTS_FILE: &str = "PILOTHOUSE_HOSTS_FILE";

/// Upper bound for `database.ready_timeout_secs`.
pub const MAX_READY_TIMEOUT_SECS: u64 = 3600;

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub sites: SitesConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub compose: ComposeConfig,
    #[serde(default)]
    pub ssl: SslConfig,
}

/// Filesystem locations used by the stack.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Stack home: holds `docker-compose.yml`, `config/` and `custom-config/`.
    #[serde(default = "default_home")]
    pub home: String,
    /// Directory holding one subdirectory per site. Defaults to `<home>/sites`.
    #[serde(default)]
    pub sites: Option<String>,
    /// Hosts file receiving `#pilothouse` entries.
    #[serde(default = "default_hosts_file")]
    pub hosts_file: String,
}

/// Defaults applied when creating sites.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SitesConfig {
    /// Appended to the site name to form its default domain.
    #[serde(default = "default_domain_suffix")]
    pub domain_suffix: String,
    #[serde(default = "default_admin_user")]
    pub admin_user: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    /// Upstream used for missing images when `create` is not given `--proxy`.
    #[serde(default)]
    pub default_proxy: Option<String>,
}

/// MariaDB access and readiness polling.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default = "default_root_password")]
    pub root_password: String,
    /// Upper bound on how long `up` waits for the database.
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// How Docker Compose is invoked.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ComposeConfig {
    /// Program and leading arguments, e.g. `["docker", "compose"]` or `["docker-compose"]`.
    #[serde(default = "default_compose_command")]
    pub command: Vec<String>,
    #[serde(default = "default_project_name")]
    pub project_name: String,
}

/// Certificate generation settings.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SslConfig {
    #[serde(default = "default_openssl")]
    pub openssl: String,
    #[serde(default = "default_ssl_days")]
    pub days: u32,
}

fn default_home() -> String {
    "~/pilothouse".to_string()
}
fn default_hosts_file() -> String {
    "/etc/hosts".to_string()
}
fn default_domain_suffix() -> String {
    ".test".to_string()
}
fn default_admin_user() -> String {
    "admin".to_string()
}
fn default_admin_password() -> String {
    "password".to_string()
}
fn default_admin_email() -> String {
    "admin@example.test".to_string()
}
fn default_root_password() -> String {
    "root".to_string()
}
fn default_ready_timeout_secs() -> u64 {
    60
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_compose_command() -> Vec<String> {
    vec!["docker".to_string(), "compose".to_string()]
}
fn default_project_name() -> String {
    "pilothouse".to_string()
}
fn default_openssl() -> String {
    "openssl".to_string()
}
fn default_ssl_days() -> u32 {
    825
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            home: default_home(),
            sites: None,
            hosts_file: default_hosts_file(),
        }
    }
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            domain_suffix: default_domain_suffix(),
            admin_user: default_admin_user(),
            admin_password: default_admin_password(),
            admin_email: default_admin_email(),
            default_proxy: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            root_password: default_root_password(),
            ready_timeout_secs: default_ready_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            command: default_compose_command(),
            project_name: default_project_name(),
        }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self {
            openssl: default_openssl(),
            days: default_ssl_days(),
        }
    }
}

impl Config {
    /// Stack home directory.
    pub fn home_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.home)
    }

    /// Sites root; `<home>/sites` unless configured.
    pub fn sites_dir(&self) -> PathBuf {
        match &self.paths.sites {
            Some(dir) => PathBuf::from(dir),
            None => self.home_dir().join("sites"),
        }
    }

    pub fn hosts_file(&self) -> PathBuf {
        PathBuf::from(&self.paths.hosts_file)
    }
}

/// Loads the configuration. `explicit` is the `--config` path, which must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(anyhow!(PilothouseError::Config(format!(
                    "Configuration file '{}' does not exist.",
                    path.display()
                ))));
            }
            info!("Loading configuration from: {}", path.display());
            load_config_from_path(path)?
        }
        None => load_user_config()?.unwrap_or_default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    expand_config_paths(&mut config);
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "Pilothouse", "pilothouse") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Applies environment overrides. `lookup` is `std::env::var` outside of tests.
fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    if let Some(home) = non_empty(ENV_HOME) {
        debug!("{} overrides home: {}", ENV_HOME, home);
        config.paths.home = home;
    }
    if let Some(sites) = non_empty(ENV_SITES_DIR) {
        debug!("{} overrides sites dir: {}", ENV_SITES_DIR, sites);
        config.paths.sites = Some(sites);
    }
    if let Some(hosts) = non_empty(ENV_HOSTS_FILE) {
        debug!("{} overrides hosts file: {}", ENV_HOSTS_FILE, hosts);
        config.paths.hosts_file = hosts;
    }
}

fn expand_config_paths(config: &mut Config) {
    config.paths.home = shellexpand::tilde(&config.paths.home).into_owned();
    if let Some(sites) = config.paths.sites.as_mut() {
        *sites = shellexpand::tilde(sites.as_str()).into_owned();
    }
    config.paths.hosts_file = shellexpand::tilde(&config.paths.hosts_file).into_owned();
    debug!(
        "Expanded paths: home={}, sites={}, hosts={}",
        config.paths.home,
        config.sites_dir().display(),
        config.paths.hosts_file
    );
}

fn validate_config(config: &Config) -> Result<()> {
    let invalid = |msg: String| Err(anyhow!(PilothouseError::Config(msg)));

    let suffix = &config.sites.domain_suffix;
    let tail = suffix.strip_prefix('.').unwrap_or_default();
    if !suffix.starts_with('.')
        || tail.is_empty()
        || tail.starts_with(['.', '-'])
        || tail.ends_with(['.', '-'])
        || !tail
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return invalid(format!(
            "Invalid domain_suffix '{}'. Expected something like '.test'.",
            suffix
        ));
    }
    if config.compose.command.is_empty() || config.compose.command[0].trim().is_empty() {
        return invalid("compose.command must name a program.".to_string());
    }
    if config.compose.project_name.trim().is_empty() {
        return invalid("compose.project_name cannot be empty.".to_string());
    }
    if config.database.ready_timeout_secs == 0 || config.database.poll_interval_ms == 0 {
        return invalid(
            "database.ready_timeout_secs and database.poll_interval_ms must be positive."
                .to_string(),
        );
    }
    if config.database.ready_timeout_secs > MAX_READY_TIMEOUT_SECS {
        return invalid(format!(
            "database.ready_timeout_secs cannot exceed {}.",
            MAX_READY_TIMEOUT_SECS
        ));
    }
    if config.database.poll_interval_ms > config.database.ready_timeout_secs.saturating_mul(1000) {
        return invalid(
            "database.poll_interval_ms cannot exceed database.ready_timeout_secs.".to_string(),
        );
    }
    if let Some(proxy) = &config.sites.default_proxy {
        normalize_proxy_url(proxy).context("Invalid sites.default_proxy")?;
    }
    if config.ssl.days == 0 {
        return invalid("ssl.days must be positive.".to_string());
    }
    let sites = config.sites_dir();
    if sites.exists() && !sites.is_dir() {
        return invalid(format!(
            "Configured sites path '{}' exists but is not a directory.",
            sites.display()
        ));
    }
    Ok(())
}
