use super::{ContainerSpec, ContainerSummary, NetworkSpec};
use anyhow::Result;
use std::fmt::Debug;

/// Trait for container engine operations
pub trait ContainerRuntime: Send + Sync + Debug {
    /// Check that the engine answers at all
    fn is_available(&self) -> bool;

    /// Pull an image, streaming progress to stdout
    fn pull_image(&self, image: &str) -> Result<()>;

    /// Names of every network known to the engine
    fn list_networks(&self) -> Result<Vec<String>>;

    /// Create a network
    fn create_network(&self, spec: &NetworkSpec) -> Result<()>;

    /// Remove a network by name
    fn remove_network(&self, name: &str) -> Result<()>;

    /// Create a container from a spec, returning its id
    fn create_container(&self, spec: &ContainerSpec) -> Result<String>;

    /// Start a container by id or name
    fn start_container(&self, id: &str) -> Result<()>;

    /// Stop a container by id or name
    fn stop_container(&self, id: &str) -> Result<()>;

    /// Force-remove a container by id or name
    fn remove_container(&self, id: &str) -> Result<()>;

    /// Every container, running or not
    fn list_containers(&self) -> Result<Vec<ContainerSummary>>;
}
