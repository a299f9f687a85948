//! # Pilothouse Docker Utilities
//!
//! File: cli/src/common/docker/mod.rs
//!
//! Direct Docker daemon access through bollard. Container lifecycle itself is
//! left to Docker Compose (`common::compose`); this module only asks the
//! daemon what is running.

/// Handles establishing a connection to the local Docker daemon.
pub mod connect;
/// Queries which compose services are running.
pub mod state;
