//! # Pilothouse Common Utilities
//!
//! File: cli/src/common/mod.rs
//!
//! Shared building blocks used by the command handlers. Everything that
//! reaches outside the process (Docker, openssl, sudo, the hosts file) lives
//! here.

/// Docker Compose invocations, database SQL helpers and readiness polling.
pub mod compose;
/// Docker daemon access through bollard (service state).
pub mod docker;
/// Utilities for filesystem operations.
pub mod fs;
/// Tagged hosts-file entry management.
pub mod hosts;
/// Executing external processes (streamed, captured, piped stdin).
pub mod process;
/// Self-signed certificate generation.
pub mod ssl;
