//! # Pilothouse Filesystem Utilities
//!
//! File: cli/src/common/fs/mod.rs
//!
//! Filesystem helpers used by the stack scaffolding, site commands and the
//! hosts-file editor.

/// Basic file I/O (e.g., `ensure_dir_exists`, `write_if_changed`, `remove_dir_if_exists`).
pub mod io;
