//! # Pilothouse Stack Files
//!
//! File: cli/src/core/stack.rs
//!
//! ## Overview
//!
//! The compose file and the default configuration for every container ship
//! inside the binary. Before talking to Docker Compose, Pilothouse writes them
//! into the stack home:
//!
//! ```text
//! <home>/
//!   docker-compose.yml
//!   config/          shipped defaults, refreshed when the binary's copy differs
//!   custom-config/   user overrides, never written by Pilothouse
//! ```
//!
//! Each subsystem config resolves to `custom-config/<file>` when the user has
//! placed one there, otherwise to `config/<file>`. The resolved paths reach the
//! compose file as environment variables used in its bind mounts.
//!
use crate::common::fs::io;
use crate::core::config::Config;
use crate::core::error::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const COMPOSE_FILE: &str = "docker-compose.yml";
pub const DEFAULT_CONFIG_DIR: &str = "config";
pub const CUSTOM_CONFIG_DIR: &str = "custom-config";
const NGINX_PARTIAL_FILE: &str = "nginx-wordpress.conf";

const COMPOSE_TEMPLATE: &str = include_str!("../../assets/docker-compose.yml");
const NGINX_PARTIAL: &str = include_str!("../../assets/config/nginx-wordpress.conf");

/// A container configuration that users may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFile {
    Mysql,
    Nginx,
    PhpFpm,
    WpCli,
    MailRelay,
}

impl ConfigFile {
    pub const ALL: [ConfigFile; 5] = [
        ConfigFile::Mysql,
        ConfigFile::Nginx,
        ConfigFile::PhpFpm,
        ConfigFile::WpCli,
        ConfigFile::MailRelay,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ConfigFile::Mysql => "mysql.cnf",
            ConfigFile::Nginx => "nginx.conf",
            ConfigFile::PhpFpm => "php.ini",
            ConfigFile::WpCli => "wp-cli.yml",
            ConfigFile::MailRelay => "mail.ini",
        }
    }

    /// Variable referenced by the compose file's bind mount.
    pub fn env_var(self) -> &'static str {
        match self {
            ConfigFile::Mysql => "PILOTHOUSE_MYSQL_CONFIG",
            ConfigFile::Nginx => "PILOTHOUSE_NGINX_CONFIG",
            ConfigFile::PhpFpm => "PILOTHOUSE_PHP_CONFIG",
            ConfigFile::WpCli => "PILOTHOUSE_WPCLI_CONFIG",
            ConfigFile::MailRelay => "PILOTHOUSE_MAIL_CONFIG",
        }
    }

    fn default_content(self) -> &'static str {
        match self {
            ConfigFile::Mysql => include_str!("../../assets/config/mysql.cnf"),
            ConfigFile::Nginx => include_str!("../../assets/config/nginx.conf"),
            ConfigFile::PhpFpm => include_str!("../../assets/config/php.ini"),
            ConfigFile::WpCli => include_str!("../../assets/config/wp-cli.yml"),
            ConfigFile::MailRelay => include_str!("../../assets/config/mail.ini"),
        }
    }
}

pub fn compose_file(home: &Path) -> PathBuf {
    home.join(COMPOSE_FILE)
}

/// Custom override if present, else the shipped default.
pub fn resolve_config(home: &Path, file: ConfigFile) -> PathBuf {
    let custom = home.join(CUSTOM_CONFIG_DIR).join(file.file_name());
    if custom.is_file() {
        debug!("Using custom {} from {}", file.file_name(), custom.display());
        custom
    } else {
        home.join(DEFAULT_CONFIG_DIR).join(file.file_name())
    }
}

/// Writes the compose file and default configs into the stack home and makes
/// sure the custom-config and sites directories exist.
pub fn ensure_scaffold(config: &Config) -> Result<()> {
    let home = config.home_dir();
    let defaults = home.join(DEFAULT_CONFIG_DIR);
    io::ensure_dir_exists(&home)?;
    io::ensure_dir_exists(&defaults)?;
    io::ensure_dir_exists(&home.join(CUSTOM_CONFIG_DIR))?;
    io::ensure_dir_exists(&config.sites_dir())?;

    let mut written = 0;
    if io::write_if_changed(&compose_file(&home), COMPOSE_TEMPLATE)? {
        written += 1;
    }
    if io::write_if_changed(&defaults.join(NGINX_PARTIAL_FILE), NGINX_PARTIAL)? {
        written += 1;
    }
    for file in ConfigFile::ALL {
        if io::write_if_changed(&defaults.join(file.file_name()), file.default_content())? {
            written += 1;
        }
    }
    if written > 0 {
        info!("Refreshed {} stack file(s) in {}", written, home.display());
    }
    Ok(())
}

/// Environment passed to every compose invocation.
pub fn compose_env(config: &Config) -> Vec<(String, String)> {
    let home = config.home_dir();
    let mut env = vec![
        (
            "PILOTHOUSE_SITES_DIR".to_string(),
            config.sites_dir().display().to_string(),
        ),
        (
            "PILOTHOUSE_NGINX_PARTIAL".to_string(),
            home.join(DEFAULT_CONFIG_DIR)
                .join(NGINX_PARTIAL_FILE)
                .display()
                .to_string(),
        ),
        (
            "PILOTHOUSE_MYSQL_ROOT_PASSWORD".to_string(),
            config.database.root_password.clone(),
        ),
    ];
    for file in ConfigFile::ALL {
        env.push((
            file.env_var().to_string(),
            resolve_config(&home, file).display().to_string(),
        ));
    }
    env
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn config_in(home: &Path) -> Config {
        let mut config = Config::default();
        config.paths.home = home.to_string_lossy().to_string();
        config
    }

    #[test]
    fn test_ensure_scaffold_writes_defaults() -> Result<()> {
        let home = tempdir()?;
        let config = config_in(home.path());
        ensure_scaffold(&config)?;

        assert!(home.path().join(COMPOSE_FILE).is_file());
        assert!(home.path().join("custom-config").is_dir());
        assert!(home.path().join("sites").is_dir());
        for file in ConfigFile::ALL {
            assert!(home
                .path()
                .join("config")
                .join(file.file_name())
                .is_file());
        }
        let compose = fs::read_to_string(home.path().join(COMPOSE_FILE))?;
        for file in ConfigFile::ALL {
            assert!(
                compose.contains(file.env_var()),
                "compose file should mount {}",
                file.env_var()
            );
        }
        Ok(())
    }

    #[test]
    fn test_ensure_scaffold_never_touches_custom_config() -> Result<()> {
        let home = tempdir()?;
        let config = config_in(home.path());
        let custom = home.path().join("custom-config").join("php.ini");
        fs::create_dir_all(custom.parent().unwrap())?;
        fs::write(&custom, "memory_limit = 1G\n")?;

        ensure_scaffold(&config)?;
        assert_eq!(fs::read_to_string(&custom)?, "memory_limit = 1G\n");
        Ok(())
    }

    #[test]
    fn test_ensure_scaffold_restores_edited_default() -> Result<()> {
        let home = tempdir()?;
        let config = config_in(home.path());
        ensure_scaffold(&config)?;
        let default = home.path().join("config").join("mysql.cnf");
        fs::write(&default, "edited")?;
        ensure_scaffold(&config)?;
        assert_ne!(fs::read_to_string(&default)?, "edited");
        Ok(())
    }

    #[test]
    fn test_resolve_config_prefers_custom() -> Result<()> {
        let home = tempdir()?;
        assert_eq!(
            resolve_config(home.path(), ConfigFile::Mysql),
            home.path().join("config").join("mysql.cnf")
        );
        let custom_dir = home.path().join("custom-config");
        fs::create_dir_all(&custom_dir)?;
        fs::write(custom_dir.join("mysql.cnf"), "[mysqld]\n")?;
        assert_eq!(
            resolve_config(home.path(), ConfigFile::Mysql),
            custom_dir.join("mysql.cnf")
        );
        // Other subsystems keep their defaults.
        assert_eq!(
            resolve_config(home.path(), ConfigFile::Nginx),
            home.path().join("config").join("nginx.conf")
        );
        Ok(())
    }

    #[test]
    fn test_compose_env() {
        let home = tempdir().unwrap();
        let mut config = config_in(home.path());
        config.database.root_password = "hunter2".into();
        let env = compose_env(&config);
        let lookup = |key: &str| {
            env.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(lookup("PILOTHOUSE_MYSQL_ROOT_PASSWORD"), "hunter2");
        assert_eq!(
            lookup("PILOTHOUSE_SITES_DIR"),
            home.path().join("sites").display().to_string()
        );
        assert!(lookup("PILOTHOUSE_WPCLI_CONFIG").ends_with("wp-cli.yml"));
        assert_eq!(env.len(), 3 + ConfigFile::ALL.len());
    }
}
