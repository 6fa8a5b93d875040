use super::{BindMount, ContainerSpec, NetworkSpec};
use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceRole {
    Ui,
    CoreNlp,
    Agent,
}

impl fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ui => write!(f, "NLP Suite UI"),
            Self::CoreNlp => write!(f, "Stanford CoreNLP"),
            Self::Agent => write!(f, "NLP Suite Agent"),
        }
    }
}

/// One container of the suite, fully resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteService {
    pub role: ServiceRole,
    pub container_name: String,
    pub image: String,
    pub ip: Ipv4Addr,
    pub port: u16,
    /// When false a failed start is logged and the launch goes on
    pub required: bool,
    pub mount: Option<BindMount>,
}

impl SuiteService {
    pub fn to_spec<'a>(&'a self, network: &'a str) -> ContainerSpec<'a> {
        ContainerSpec {
            name: &self.container_name,
            image: &self.image,
            network,
            ip: self.ip,
            ports: std::slice::from_ref(&self.port),
            mounts: self.mount.as_slice(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteNetwork {
    pub name: String,
    pub driver: String,
    pub subnet: String,
}

impl SuiteNetwork {
    pub fn to_spec(&self) -> NetworkSpec<'_> {
        NetworkSpec {
            name: &self.name,
            driver: &self.driver,
            subnet: &self.subnet,
            attachable: true,
        }
    }
}

/// Host folder shared with the agent plus the subfolders it expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountLayout {
    pub root: PathBuf,
    pub subfolders: Vec<String>,
}

impl MountLayout {
    /// Root first, then each subfolder in declaration order
    pub fn folders(&self) -> Vec<PathBuf> {
        let mut folders = Vec::with_capacity(self.subfolders.len() + 1);
        folders.push(self.root.clone());
        folders.extend(self.subfolders.iter().map(|sub| self.root.join(sub)));
        folders
    }
}

/// Everything a launch needs, in start order
#[derive(Debug, Clone)]
pub struct Suite {
    pub network: SuiteNetwork,
    pub services: Vec<SuiteService>,
    pub mounts: MountLayout,
}

impl Suite {
    pub fn service(&self, role: ServiceRole) -> Option<&SuiteService> {
        self.services.iter().find(|svc| svc.role == role)
    }

    pub fn container_names(&self) -> Vec<String> {
        self.services
            .iter()
            .map(|svc| svc.container_name.clone())
            .collect()
    }

    /// Address printed for the user once everything is up
    pub fn ui_url(&self) -> Option<String> {
        self.service(ServiceRole::Ui)
            .map(|ui| format!("http://127.0.0.1:{}", ui.port))
    }
}

/// Derives a container name from an image reference.
///
/// `ghcr.io/nlp-suite/nlp-suite-ui:main` becomes `nlp_suite_ui`.
pub fn container_name_from_image(image: &str) -> String {
    let last = image.rsplit('/').next().unwrap_or(image);
    let repo = last.split(':').next().unwrap_or(last);
    repo.replace('-', "_").trim_matches('/').to_string()
}
