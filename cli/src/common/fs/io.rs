//! # Pilothouse Filesystem I/O Utilities
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! Small wrappers around `std::fs` that add error context and logging. They
//! back the stack scaffolding (`core::stack`), site creation and removal, and
//! hosts-file edits.
//!
use crate::core::error::{PilothouseError, Result};
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Ensures that a directory exists at the specified path.
///
/// Creates the directory and any missing parents (like `mkdir -p`). If the
/// path exists but is not a directory, `PilothouseError::FileSystem` is returned.
///
/// # Errors
///
/// Returns an `Err` if:
/// - The path exists but is not a directory.
/// - Creating the directory fails (e.g., due to permissions).
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        info!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(PilothouseError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Reads the entire content of a file into a string, with the path in the error.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Writes string content to a file, overwriting it and creating parent directories.
///
/// # Errors
///
/// Returns an `Err` if the parent directory cannot be created or the write fails.
pub fn write_string_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write to file {:?}", path))?;
    info!("Wrote content to file: {:?}", path);
    Ok(())
}

/// Writes `content` only when the file is missing or differs.
///
/// # Returns
///
/// * `Result<bool>` - `Ok(true)` if the file was written, `Ok(false)` if it already matched.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    if path.is_file() && read_file_to_string(path)? == content {
        debug!("Up to date: {:?}", path);
        return Ok(false);
    }
    write_string_to_file(path, content)?;
    Ok(true)
}

/// Removes a directory tree. A missing directory is not an error.
///
/// # Returns
///
/// * `Result<bool>` - `Ok(true)` if something was removed.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        debug!("Nothing to remove at {:?}", path);
        return Ok(false);
    }
    if !path.is_dir() {
        anyhow::bail!(PilothouseError::FileSystem(format!(
            "Refusing to remove {:?}: not a directory",
            path
        )));
    }
    fs::remove_dir_all(path).with_context(|| format!("Failed to remove directory {:?}", path))?;
    info!("Removed directory: {:?}", path);
    Ok(true)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Test `ensure_dir_exists` when the directory needs to be created, including parents.
    #[test]
    fn test_ensure_dir_exists_creates_new() -> Result<()> {
        let base_dir = tempdir()?;
        let new_dir = base_dir.path().join("new/subdir");
        assert!(!new_dir.exists());
        ensure_dir_exists(&new_dir)?;
        assert!(new_dir.is_dir());
        // Second call is a no-op.
        ensure_dir_exists(&new_dir)?;
        Ok(())
    }

    /// Test `ensure_dir_exists` when the target path exists but is a file.
    #[test]
    fn test_ensure_dir_exists_path_is_file() -> Result<()> {
        let base_dir = tempdir()?;
        let file_path = base_dir.path().join("a_file.txt");
        fs::write(&file_path, "hello")?;
        let result = ensure_dir_exists(&file_path);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Path exists but is not a directory"));
        Ok(())
    }

    #[test]
    fn test_read_write_string_to_file() -> Result<()> {
        let base_dir = tempdir()?;
        let file_path = base_dir.path().join("nested/test_rw.txt");
        write_string_to_file(&file_path, "server_name blog.test;")?;
        assert_eq!(read_file_to_string(&file_path)?, "server_name blog.test;");
        assert!(read_file_to_string(&base_dir.path().join("missing")).is_err());
        Ok(())
    }

    #[test]
    fn test_write_if_changed() -> Result<()> {
        let base_dir = tempdir()?;
        let file_path = base_dir.path().join("mysql.cnf");
        assert!(write_if_changed(&file_path, "a")?);
        assert!(!write_if_changed(&file_path, "a")?);
        assert!(write_if_changed(&file_path, "b")?);
        assert_eq!(read_file_to_string(&file_path)?, "b");
        Ok(())
    }

    #[test]
    fn test_remove_dir_if_exists() -> Result<()> {
        let base_dir = tempdir()?;
        let site = base_dir.path().join("blog");
        fs::create_dir_all(site.join("wordpress"))?;
        fs::write(site.join("nginx.conf"), "")?;

        assert!(remove_dir_if_exists(&site)?);
        assert!(!site.exists());
        assert!(!remove_dir_if_exists(&site)?);

        let file = base_dir.path().join("file");
        fs::write(&file, "")?;
        assert!(remove_dir_if_exists(&file).is_err());
        Ok(())
    }
}
