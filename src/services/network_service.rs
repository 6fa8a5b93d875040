use crate::domain::{ContainerRuntime, SuiteNetwork};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

pub struct NetworkService {
    runtime: Arc<dyn ContainerRuntime>,
}

impl NetworkService {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    /// Creates the network unless one with the same name already exists.
    /// Returns whether a network was created.
    pub fn ensure(&self, network: &SuiteNetwork) -> Result<bool> {
        let existing = self.runtime.list_networks().context("listing networks")?;

        if existing.iter().any(|name| *name == network.name) {
            info!("Network {} already exists, skipping", network.name);
            return Ok(false);
        }

        info!("Creating network {} ({})", network.name, network.subnet);
        self.runtime
            .create_network(&network.to_spec())
            .with_context(|| format!("creating network {}", network.name))?;

        Ok(true)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        self.runtime.remove_network(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockRuntime;

    fn network() -> SuiteNetwork {
        SuiteNetwork {
            name: "nlp-suite-network".into(),
            driver: "bridge".into(),
            subnet: "172.16.0.0/16".into(),
        }
    }

    #[test]
    fn test_ensure_creates_missing_network() {
        let mock = Arc::new(MockRuntime::new());
        let service = NetworkService::new(mock.clone());

        assert!(service.ensure(&network()).unwrap());
        assert!(mock.network_names().contains(&"nlp-suite-network".to_string()));
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let mock = Arc::new(MockRuntime::new());
        let service = NetworkService::new(mock.clone());

        assert!(service.ensure(&network()).unwrap());
        assert!(!service.ensure(&network()).unwrap());
        assert!(!service.ensure(&network()).unwrap());

        assert_eq!(mock.count_commands("create_network:"), 1);
        let count = mock
            .network_names()
            .iter()
            .filter(|n| *n == "nlp-suite-network")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_ensure_skips_preexisting_network() {
        let mock = Arc::new(MockRuntime::new());
        mock.add_network("nlp-suite-network");
        let service = NetworkService::new(mock.clone());

        assert!(!service.ensure(&network()).unwrap());
        assert_eq!(mock.count_commands("create_network:"), 0);
    }

    #[test]
    fn test_ensure_propagates_list_failure() {
        let mock = Arc::new(MockRuntime::new());
        mock.set_fail_on("list_networks");
        let service = NetworkService::new(mock.clone());

        assert!(service.ensure(&network()).is_err());
        assert_eq!(mock.count_commands("create_network:"), 0);
    }
}
