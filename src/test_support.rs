use crate::domain::{BindMount, ContainerRuntime, ContainerSpec, ContainerSummary, NetworkSpec};
use anyhow::{Result, bail};
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockContainer {
    pub name: String,
    pub image: String,
    pub state: String,
    pub network: Option<String>,
    pub ip: Option<Ipv4Addr>,
    pub ports: Vec<u16>,
    pub mounts: Vec<BindMount>,
}

/// In-memory engine. Container ids are the container names.
#[derive(Debug)]
pub struct MockRuntime {
    available: RwLock<bool>,
    containers: RwLock<Vec<MockContainer>>,
    networks: RwLock<Vec<String>>,
    commands: RwLock<Vec<String>>,
    fail_on: RwLock<HashSet<String>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            available: RwLock::new(true),
            containers: RwLock::new(Vec::new()),
            networks: RwLock::new(vec!["bridge".to_string(), "host".to_string()]),
            commands: RwLock::new(Vec::new()),
            fail_on: RwLock::new(HashSet::new()),
        }
    }

    pub fn set_available(&self, available: bool) {
        *self.available.write().unwrap() = available;
    }

    pub fn add_container(&self, name: &str, image: &str, state: &str) {
        self.containers.write().unwrap().push(MockContainer {
            name: name.to_string(),
            image: image.to_string(),
            state: state.to_string(),
            network: None,
            ip: None,
            ports: Vec::new(),
            mounts: Vec::new(),
        });
    }

    pub fn add_network(&self, name: &str) {
        self.networks.write().unwrap().push(name.to_string());
    }

    /// Fails every call of `operation`, or only the one aimed at a target
    /// when given as `operation:target`
    pub fn set_fail_on(&self, operation: &str) {
        self.fail_on.write().unwrap().insert(operation.to_string());
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    pub fn count_commands(&self, prefix: &str) -> usize {
        self.commands
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn get_container(&self, name: &str) -> Option<MockContainer> {
        self.containers
            .read()
            .unwrap()
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }

    pub fn get_state(&self, name: &str) -> Option<String> {
        self.get_container(name).map(|c| c.state)
    }

    pub fn container_names(&self) -> Vec<String> {
        self.containers
            .read()
            .unwrap()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn network_names(&self) -> Vec<String> {
        self.networks.read().unwrap().clone()
    }

    fn record_command(&self, cmd: String) {
        self.commands.write().unwrap().push(cmd);
    }

    fn check_fail(&self, operation: &str, target: &str) -> Result<()> {
        let fail_on = self.fail_on.read().unwrap();
        if fail_on.contains(operation) || fail_on.contains(&format!("{operation}:{target}")) {
            bail!("Mock failure on: {operation}:{target}");
        }
        Ok(())
    }

    fn set_state(&self, id: &str, state: &str) -> Result<()> {
        let mut containers = self.containers.write().unwrap();
        match containers.iter_mut().find(|c| c.name == id) {
            Some(container) => {
                container.state = state.to_string();
                Ok(())
            }
            None => bail!("No such container: {id}"),
        }
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerRuntime for MockRuntime {
    fn is_available(&self) -> bool {
        self.record_command("is_available".to_string());
        *self.available.read().unwrap()
    }

    fn pull_image(&self, image: &str) -> Result<()> {
        self.record_command(format!("pull:{image}"));
        self.check_fail("pull", image)
    }

    fn list_networks(&self) -> Result<Vec<String>> {
        self.record_command("list_networks".to_string());
        self.check_fail("list_networks", "")?;
        Ok(self.network_names())
    }

    fn create_network(&self, spec: &NetworkSpec) -> Result<()> {
        self.record_command(format!("create_network:{}", spec.name));
        self.check_fail("create_network", spec.name)?;

        let mut networks = self.networks.write().unwrap();
        if networks.iter().any(|n| n == spec.name) {
            bail!("network with name {} already exists", spec.name);
        }
        networks.push(spec.name.to_string());
        Ok(())
    }

    fn remove_network(&self, name: &str) -> Result<()> {
        self.record_command(format!("remove_network:{name}"));
        self.check_fail("remove_network", name)?;

        let mut networks = self.networks.write().unwrap();
        let before = networks.len();
        networks.retain(|n| n != name);
        if networks.len() == before {
            bail!("network {name} not found");
        }
        Ok(())
    }

    fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        self.record_command(format!("create:{}", spec.name));
        self.check_fail("create", spec.name)?;

        if !self.networks.read().unwrap().iter().any(|n| n == spec.network) {
            bail!("network {} not found", spec.network);
        }

        let mut containers = self.containers.write().unwrap();
        if containers.iter().any(|c| c.name == spec.name) {
            bail!("the container name \"{}\" is already in use", spec.name);
        }

        containers.push(MockContainer {
            name: spec.name.to_string(),
            image: spec.image.to_string(),
            state: "created".to_string(),
            network: Some(spec.network.to_string()),
            ip: Some(spec.ip),
            ports: spec.ports.to_vec(),
            mounts: spec.mounts.to_vec(),
        });
        Ok(spec.name.to_string())
    }

    fn start_container(&self, id: &str) -> Result<()> {
        self.record_command(format!("start:{id}"));
        self.check_fail("start", id)?;
        self.set_state(id, "running")
    }

    fn stop_container(&self, id: &str) -> Result<()> {
        self.record_command(format!("stop:{id}"));
        self.check_fail("stop", id)?;
        self.set_state(id, "exited")
    }

    fn remove_container(&self, id: &str) -> Result<()> {
        self.record_command(format!("remove:{id}"));
        self.check_fail("remove", id)?;

        let mut containers = self.containers.write().unwrap();
        let before = containers.len();
        containers.retain(|c| c.name != id);
        if containers.len() == before {
            bail!("No such container: {id}");
        }
        Ok(())
    }

    fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
        self.record_command("list_containers".to_string());
        self.check_fail("list_containers", "")?;

        Ok(self
            .containers
            .read()
            .unwrap()
            .iter()
            .map(|c| ContainerSummary {
                id: c.name.clone(),
                name: c.name.clone(),
                image: c.image.clone(),
                state: c.state.clone(),
            })
            .collect())
    }
}
