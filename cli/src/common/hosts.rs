//! # Pilothouse Hosts File Entries (`common::hosts`)
//!
//! File: cli/src/common/hosts.rs
//!
//! ## Overview
//!
//! Each site gets one line in the hosts file:
//!
//! ```text
//! 127.0.0.1 blog.test #pilothouse
//! ```
//!
//! The marker lets entries be added and removed by whole-line matching without
//! touching anything else in the file. Adding a present line and removing an
//! absent one are both no-ops.
//!
//! The hosts file is normally root-owned. A direct write is tried first; if
//! that is refused the new content is piped through `sudo tee`.
//!
use crate::common::fs::io;
use crate::common::process::{self, CommandSpec};
use crate::core::error::{PilothouseError, Result};
use anyhow::{anyhow, Context};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

pub const HOSTS_MARKER: &str = "#pilothouse";
const LOOPBACK: &str = "127.0.0.1";

/// Rejects anything that could corrupt the hosts file.
pub fn validate_domain(domain: &str) -> Result<()> {
    let valid = !domain.is_empty()
        && domain.len() <= 253
        && !domain.starts_with(['.', '-'])
        && !domain.ends_with(['.', '-'])
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(anyhow!(PilothouseError::InvalidDomain {
            domain: domain.to_string(),
        }))
    }
}

/// The tagged line for a domain.
pub fn entry_line(domain: &str) -> String {
    format!("{} {} {}", LOOPBACK, domain, HOSTS_MARKER)
}

fn is_entry(line: &str, entry: &str) -> bool {
    line.trim() == entry
}

/// Returns the content with the entry appended, or `None` if it is already present.
pub fn with_entry(content: &str, domain: &str) -> Option<String> {
    let entry = entry_line(domain);
    if content.lines().any(|line| is_entry(line, &entry)) {
        return None;
    }
    let mut updated = content.to_string();
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&entry);
    updated.push('\n');
    Some(updated)
}

/// Returns the content without any matching entry, or `None` if there was none.
pub fn without_entry(content: &str, domain: &str) -> Option<String> {
    let entry = entry_line(domain);
    if !content.lines().any(|line| is_entry(line, &entry)) {
        return None;
    }
    let mut updated: String = content
        .lines()
        .filter(|line| !is_entry(line, &entry))
        .flat_map(|line| [line, "\n"])
        .collect();
    if !content.ends_with('\n') && updated.ends_with('\n') {
        updated.pop();
    }
    Some(updated)
}

fn read_hosts(path: &Path) -> Result<String> {
    if !path.exists() {
        warn!("Hosts file {} does not exist; starting empty", path.display());
        return Ok(String::new());
    }
    io::read_file_to_string(path)
}

async fn write_hosts(path: &Path, content: &str) -> Result<()> {
    match std::fs::write(path, content) {
        Ok(()) => {
            debug!("Wrote hosts file {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            info!(
                "No write permission on {}; retrying through sudo",
                path.display()
            );
            println!("Updating {} requires administrator rights.", path.display());
            let spec = CommandSpec::new("sudo")
                .arg("tee")
                .arg(path.display().to_string());
            process::run_with_stdin(&spec, content)
                .await
                .with_context(|| format!("Failed to update {} via sudo", path.display()))
        }
        Err(e) => Err(anyhow!(e).context(format!("Failed to write {}", path.display()))),
    }
}

/// Adds the entry for `domain`. Returns `false` if it was already there.
pub async fn add_entry(path: &Path, domain: &str) -> Result<bool> {
    validate_domain(domain)?;
    let content = read_hosts(path)?;
    match with_entry(&content, domain) {
        Some(updated) => {
            write_hosts(path, &updated).await?;
            info!("Added hosts entry for {}", domain);
            Ok(true)
        }
        None => {
            debug!("Hosts entry for {} already present", domain);
            Ok(false)
        }
    }
}

/// Removes the entry for `domain`. Returns `false` if there was none.
pub async fn remove_entry(path: &Path, domain: &str) -> Result<bool> {
    validate_domain(domain)?;
    let content = read_hosts(path)?;
    match without_entry(&content, domain) {
        Some(updated) => {
            write_hosts(path, &updated).await?;
            info!("Removed hosts entry for {}", domain);
            Ok(true)
        }
        None => {
            debug!("No hosts entry for {}", domain);
            Ok(false)
        }
    }
}
