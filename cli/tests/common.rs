//! # Pilothouse CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test gets a
//! `TestEnv`: a temporary stack home, sites directory and hosts file, plus a
//! `config.toml` pointing at them, so no test touches the real `/etc/hosts`
//! or the user's configuration.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Command for the compiled `pilothouse` binary with Pilothouse env vars cleared.
pub fn pilothouse_cmd() -> Command {
    let mut cmd =
        Command::cargo_bin("pilothouse").expect("Failed to find pilothouse binary for testing");
    for var in [
        "PILOTHOUSE_CONFIG",
        "PILOTHOUSE_HOME",
        "PILOTHOUSE_SITES_DIR",
        "PILOTHOUSE_HOSTS_FILE",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Temporary stack layout with its own config file.
pub struct TestEnv {
    pub dir: TempDir,
    pub config: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let home = dir.path().join("home");
        let sites = dir.path().join("sites");
        let hosts = dir.path().join("hosts");
        fs::create_dir_all(&sites).expect("Failed to create sites dir");
        fs::write(&hosts, "127.0.0.1 localhost\n").expect("Failed to write hosts file");

        let config = dir.path().join("config.toml");
        fs::write(
            &config,
            format!(
                "[paths]\nhome = {:?}\nsites = {:?}\nhosts_file = {:?}\n\n[compose]\nproject_name = \"pilothouse-test\"\n",
                home.display().to_string(),
                sites.display().to_string(),
                hosts.display().to_string(),
            ),
        )
        .expect("Failed to write config.toml");
        Self { dir, config }
    }

    pub fn sites_dir(&self) -> PathBuf {
        self.dir.path().join("sites")
    }

    pub fn hosts_file(&self) -> PathBuf {
        self.dir.path().join("hosts")
    }

    /// Creates `<sites>/<name>`, optionally with an `nginx.conf`.
    pub fn add_site(&self, name: &str, nginx_conf: Option<&str>) -> PathBuf {
        let site = self.sites_dir().join(name);
        fs::create_dir_all(site.join("wordpress")).expect("Failed to create site dir");
        if let Some(conf) = nginx_conf {
            fs::write(site.join("nginx.conf"), conf).expect("Failed to write nginx.conf");
        }
        site
    }

    /// `pilothouse --config <this env's config> <args...>`.
    pub fn cmd(&self, args: &[&str]) -> Command {
        let mut cmd = pilothouse_cmd();
        cmd.arg("--config").arg(&self.config).args(args);
        cmd
    }

    pub fn config_path(&self) -> &Path {
        &self.config
    }
}
