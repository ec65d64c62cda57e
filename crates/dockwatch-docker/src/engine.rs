//! Docker directory queries and connection management.

use bollard::Docker;
use bollard::container::ListContainersOptions;
use dockwatch_core::{ContainerInfo, Error, FilterConfig, Result};

/// Read-only gateway to the Docker engine.
///
/// Safe to share across sessions without locking: every query is
/// independent and nothing here mutates engine state.
#[derive(Clone)]
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    /// Connect using platform defaults (`/var/run/docker.sock`, or the
    /// `docker_engine` named pipe on Windows).
    pub fn new() -> Result<Self> {
        let docker =
            Docker::connect_with_local_defaults().map_err(|e| Error::Docker(e.to_string()))?;
        Ok(Self { docker })
    }

    /// Connect to a specific socket path.
    pub fn with_socket(socket_path: &str) -> Result<Self> {
        let docker = Docker::connect_with_socket(socket_path, 120, bollard::API_DEFAULT_VERSION)
            .map_err(|e| Error::Docker(e.to_string()))?;
        Ok(Self { docker })
    }

    /// Connect using an optional socket override.
    pub fn connect(socket_override: Option<&str>) -> Result<Self> {
        match socket_override {
            Some(path) => Self::with_socket(path),
            None => Self::new(),
        }
    }

    /// Get a reference to the underlying Docker client.
    pub fn docker(&self) -> &Docker {
        &self.docker
    }

    /// Probe engine reachability.
    pub async fn ping(&self) -> Result<()> {
        self.docker
            .ping()
            .await
            .map_err(|e| Error::Unavailable(e.to_string()))?;
        Ok(())
    }

    /// List containers and apply the monitoring allow-lists.
    pub async fn list(
        &self,
        include_all: bool,
        filter: &FilterConfig,
    ) -> Result<Vec<ContainerInfo>> {
        let containers = self.list_unfiltered(include_all).await?;
        Ok(containers
            .into_iter()
            .filter(|container| filter.matches(container))
            .collect())
    }

    /// List every container the engine reports, unfiltered.
    pub async fn list_unfiltered(&self, include_all: bool) -> Result<Vec<ContainerInfo>> {
        let options = ListContainersOptions::<String> {
            all: include_all,
            ..Default::default()
        };

        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| Error::Docker(e.to_string()))?;

        Ok(containers.into_iter().map(summarize).collect())
    }

    /// Resolve a container for attachment by exact (stripped) name.
    ///
    /// Listing tolerates loose substring filters, but attaching requires
    /// exact equality over the running set; the first engine-reported match
    /// wins.
    pub async fn resolve(&self, name: &str) -> Result<ContainerInfo> {
        let containers = self.list_unfiltered(false).await?;
        find_by_name(containers, name).ok_or_else(|| Error::NotFound(name.to_string()))
    }
}

/// First container whose stripped name equals `name` exactly.
fn find_by_name(containers: Vec<ContainerInfo>, name: &str) -> Option<ContainerInfo> {
    containers.into_iter().find(|container| container.name == name)
}

/// Convert an engine snapshot into the shared [`ContainerInfo`] shape.
fn summarize(summary: bollard::models::ContainerSummary) -> ContainerInfo {
    let name = summary
        .names
        .as_ref()
        .and_then(|names| names.first())
        .map(|name| name.trim_start_matches('/').to_string())
        .unwrap_or_default();

    ContainerInfo {
        id: summary.id.unwrap_or_default(),
        name,
        image: summary.image.unwrap_or_default(),
        status: summary.status.unwrap_or_default(),
        state: summary.state.unwrap_or_default(),
        created: summary.created.unwrap_or_default(),
    }
}
