//! # Pilothouse Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout Pilothouse. Failures
//! fall into two groups:
//! - Domain errors (`PilothouseError`), raised when a site, domain or the stack
//!   itself is not in the state a command needs. These print a message and stop.
//! - I/O and process errors, which are wrapped in `anyhow::Error` with context
//!   describing the step that failed.
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if !site_dir.is_dir() {
//!     anyhow::bail!(PilothouseError::SiteNotFound { name: name.into(), path: site_dir.display().to_string() });
//! }
//!
//! // Recognise a domain error further up
//! if e.downcast_ref::<PilothouseError>().is_some_and(|pe| matches!(pe, PilothouseError::StackNotRunning)) {
//!     println!("Run `pilothouse up` first.");
//! }
//! ```
//!
use thiserror::Error;

/// Custom error type for Pilothouse.
#[derive(Error, Debug)]
pub enum PilothouseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Docker API interaction failed: {source}")]
    DockerApi {
        #[from]
        source: bollard::errors::Error,
    },

    #[error("Template rendering error: {source}")]
    Template {
        #[from]
        source: tera::Error,
    },

    #[error("External command failed: {cmd}, Status: {status}, Output:\n{output}")]
    ExternalCommand {
        cmd: String,
        status: String,
        output: String,
    },

    #[error("Missing {what}. Usage: {usage}")]
    MissingArgument { what: String, usage: String },

    #[error("Invalid site name '{name}': {reason}")]
    InvalidSiteName { name: String, reason: String },

    #[error("Site '{name}' already exists at {path}.")]
    SiteExists { name: String, path: String },

    #[error("Site '{name}' not found: {path} is not a site directory.")]
    SiteNotFound { name: String, path: String },

    #[error("Could not determine the domain for site '{site}' from {config}.")]
    MissingDomain { site: String, config: String },

    #[error("Invalid domain '{domain}': only letters, digits, '.' and '-' are allowed in the hosts file.")]
    InvalidDomain { domain: String },

    #[error("Invalid proxy URL '{url}': {reason}")]
    InvalidProxyUrl { url: String, reason: String },

    #[error("The Pilothouse stack is not running. Start it with `pilothouse up`.")]
    StackNotRunning,

    #[error("Database did not accept connections within {secs} seconds.")]
    DatabaseTimeout { secs: u64 },
}

/// Type alias for Result using anyhow::Error.
pub type Result<T> = anyhow::Result<T>;

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_err = PilothouseError::Config("Missing setting 'foo'".to_string());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: Missing setting 'foo'"
        );

        let missing = PilothouseError::MissingArgument {
            what: "site name".into(),
            usage: "pilothouse create <site>".into(),
        };
        assert_eq!(
            missing.to_string(),
            "Missing site name. Usage: pilothouse create <site>"
        );

        let exists = PilothouseError::SiteExists {
            name: "blog".into(),
            path: "/tmp/sites/blog".into(),
        };
        assert_eq!(
            exists.to_string(),
            "Site 'blog' already exists at /tmp/sites/blog."
        );

        assert!(PilothouseError::StackNotRunning
            .to_string()
            .contains("pilothouse up"));
    }

    #[test]
    fn test_error_downcast_through_anyhow() {
        let err: anyhow::Error = anyhow::anyhow!(PilothouseError::DatabaseTimeout { secs: 5 })
            .context("Waiting for the database");
        assert!(err
            .downcast_ref::<PilothouseError>()
            .is_some_and(|e| matches!(e, PilothouseError::DatabaseTimeout { secs: 5 })));
    }
}
