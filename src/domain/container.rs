use std::net::Ipv4Addr;
use std::path::PathBuf;

/// A host directory mapped into a container's filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    pub source: PathBuf,
    pub target: String,
}

/// Request handed to the engine to create one container
#[derive(Debug, Clone)]
pub struct ContainerSpec<'a> {
    pub name: &'a str,
    pub image: &'a str,
    pub network: &'a str,
    pub ip: Ipv4Addr,
    /// TCP ports published on `0.0.0.0` under the same number
    pub ports: &'a [u16],
    pub mounts: &'a [BindMount],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSpec<'a> {
    pub name: &'a str,
    pub driver: &'a str,
    pub subnet: &'a str,
    pub attachable: bool,
}

/// One row of the engine's container listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: String,
}

impl ContainerSummary {
    pub fn is_running(&self) -> bool {
        self.state.eq_ignore_ascii_case("running")
    }
}
