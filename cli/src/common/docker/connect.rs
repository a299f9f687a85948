//! # Pilothouse Docker Connection (`common::docker::connect`)
//!
//! File: cli/src/common/docker/connect.rs
//!
//! Establishes the bollard client used to ask the Docker daemon which compose
//! services are up.
//!
use crate::core::error::{PilothouseError, Result};
use anyhow::{anyhow, Context};
use bollard::Docker;
use tracing::instrument;

/// Connects to the local Docker daemon (`/var/run/docker.sock`, `DOCKER_HOST`, ...).
///
/// # Errors
///
/// Returns an `Err` wrapping `PilothouseError::DockerApi` if the client cannot be created.
#[instrument]
pub async fn connect_docker() -> Result<Docker> {
    Docker::connect_with_local_defaults()
        .map_err(|e| anyhow!(PilothouseError::DockerApi { source: e }))
        .context("Failed to connect to Docker daemon. Is it running and accessible?")
}
