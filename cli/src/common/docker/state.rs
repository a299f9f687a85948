//! # Pilothouse Compose Service State (`common::docker::state`)
//!
//! File: cli/src/common/docker/state.rs
//!
//! ## Overview
//!
//! Docker Compose labels every container it starts with
//! `com.docker.compose.project` and `com.docker.compose.service`. Listing
//! running containers filtered on the project label tells Pilothouse which
//! services of the stack are up without shelling out to `docker compose ps`.
//!
//! Commands use this to refuse work that needs the stack (`create`), to skip
//! best-effort steps when it is down (`delete`), and to decide whether nginx
//! needs a reload.
//!
use crate::core::error::{PilothouseError, Result};
use anyhow::anyhow;
use bollard::container::ListContainersOptions;
use bollard::models::ContainerSummary;
use std::collections::HashMap;
use tracing::{debug, error, instrument};

use super::connect::connect_docker;

pub const PROJECT_LABEL: &str = "com.docker.compose.project";
pub const SERVICE_LABEL: &str = "com.docker.compose.service";

/// Services that must be up for sites to be served and databases managed.
pub const CORE_SERVICES: [&str; 3] = ["nginx", "php", "mysql"];

/// Extracts sorted, de-duplicated service names from container summaries.
pub fn service_names(containers: &[ContainerSummary]) -> Vec<String> {
    let mut names: Vec<String> = containers
        .iter()
        .filter_map(|c| c.labels.as_ref()?.get(SERVICE_LABEL).cloned())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Names of the running services of a compose project.
#[instrument(fields(project = %project))]
pub async fn running_services(project: &str) -> Result<Vec<String>> {
    let docker = connect_docker().await?;
    let mut filters = HashMap::new();
    filters.insert(
        "label".to_string(),
        vec![format!("{}={}", PROJECT_LABEL, project)],
    );
    let options = Some(ListContainersOptions {
        all: false,
        filters,
        ..Default::default()
    });

    let containers = docker.list_containers(options).await.map_err(|e| {
        error!("Failed to list containers: {:?}", e);
        anyhow!(PilothouseError::DockerApi { source: e })
            .context("Failed to list containers. Is the Docker daemon running?")
    })?;
    let services = service_names(&containers);
    debug!("Running services for '{}': {:?}", project, services);
    Ok(services)
}

/// Whether one service of the project is running.
pub async fn service_running(project: &str, service: &str) -> Result<bool> {
    Ok(running_services(project)
        .await?
        .iter()
        .any(|s| s == service))
}

/// Whether every core service is running.
pub async fn stack_running(project: &str) -> Result<bool> {
    let services = running_services(project).await?;
    Ok(CORE_SERVICES
        .iter()
        .all(|core| services.iter().any(|s| s == core)))
}

/// Fails with `StackNotRunning` unless every core service is up.
pub async fn require_stack_running(project: &str) -> Result<()> {
    if stack_running(project).await? {
        Ok(())
    } else {
        Err(anyhow!(PilothouseError::StackNotRunning))
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn container(service: Option<&str>) -> ContainerSummary {
        ContainerSummary {
            labels: service.map(|s| {
                HashMap::from([
                    (PROJECT_LABEL.to_string(), "pilothouse".to_string()),
                    (SERVICE_LABEL.to_string(), s.to_string()),
                ])
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_service_names() {
        let containers = vec![
            container(Some("php")),
            container(Some("nginx")),
            container(None),
            container(Some("php")),
        ];
        assert_eq!(service_names(&containers), vec!["nginx", "php"]);
        assert!(service_names(&[]).is_empty());
    }

    /// Requires a running Docker daemon.
    #[tokio::test]
    #[ignore]
    async fn test_running_services_unknown_project() {
        let services = running_services("pilothouse-test-no-such-project")
            .await
            .unwrap();
        assert!(services.is_empty());
    }
}
