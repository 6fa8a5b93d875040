use crate::domain::{ContainerRuntime, ContainerSummary, SuiteService};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

pub struct ContainerService {
    runtime: Arc<dyn ContainerRuntime>,
}

impl ContainerService {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    pub fn is_engine_available(&self) -> bool {
        self.runtime.is_available()
    }

    /// Creates and starts the container of one service, returning its id
    pub fn run(&self, service: &SuiteService, network: &str) -> Result<String> {
        let id = self
            .runtime
            .create_container(&service.to_spec(network))
            .with_context(|| format!("creating {}", service.container_name))?;
        debug!("{} created as {id}", service.container_name);

        self.runtime
            .start_container(&id)
            .with_context(|| format!("starting {}", service.container_name))?;

        Ok(id)
    }

    pub fn list_all(&self) -> Result<Vec<ContainerSummary>> {
        self.runtime.list_containers()
    }

    pub fn stop(&self, id: &str) -> Result<()> {
        self.runtime.stop_container(id)
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        self.runtime.remove_container(id)
    }

    /// Looks up the current container of each service by name
    pub fn status<'a>(
        &self,
        services: &'a [SuiteService],
    ) -> Result<Vec<(&'a SuiteService, Option<ContainerSummary>)>> {
        let containers = self.list_all()?;

        Ok(services
            .iter()
            .map(|svc| {
                let found = containers
                    .iter()
                    .find(|c| c.name == svc.container_name)
                    .cloned();
                (svc, found)
            })
            .collect())
    }
}
