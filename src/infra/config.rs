use crate::domain::{
    BindMount, MountLayout, ServiceRole, Suite, SuiteNetwork, SuiteService,
    container_name_from_image,
};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_NLPBOX_TOML_NAME: &str = "nlpbox.toml";
pub const DEFAULT_NLPBOX_TOML: &str = include_str!("../../config/nlpbox.toml");

pub fn default_config_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".config/nlpbox")
}

/// Home folder as the platform reports it (`HOME`, `USERPROFILE` on Windows)
pub fn home_dir() -> Result<PathBuf> {
    let expanded = shellexpand::tilde("~");
    if expanded == "~" {
        bail!("could not find the location of your home folder");
    }
    Ok(PathBuf::from(expanded.as_ref()))
}

pub fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    fs::create_dir_all(config_dir).with_context(|| format!("creating {:?}", config_dir))
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub binary: String,
    pub api_version: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            api_version: Some("1.42".to_string()),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkConfig {
    pub name: String,
    pub driver: String,
    pub subnet: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "nlp-suite-network".to_string(),
            driver: "bridge".to_string(),
            subnet: "172.16.0.0/16".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MountConfig {
    pub root: String,
    pub target: String,
    pub subfolders: Vec<String>,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            root: "~/nlp-suite".to_string(),
            target: "/root/nlp-suite".to_string(),
            subfolders: vec!["input".into(), "output".into(), "csvInput".into()],
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CleanupScope {
    /// Every container the engine knows about
    #[default]
    All,
    /// Only containers named after a suite service
    Suite,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CleanupConfig {
    pub scope: CleanupScope,
    pub pause_on_exit: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            scope: CleanupScope::All,
            pause_on_exit: true,
        }
    }
}

/// Per-service overrides; anything left out falls back to the role defaults
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    pub image: Option<String>,
    pub ip: Option<Ipv4Addr>,
    pub port: Option<u16>,
    pub required: Option<bool>,
    pub container_name: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ServicesConfig {
    #[serde(default)]
    pub ui: ServiceConfig,
    #[serde(default)]
    pub corenlp: ServiceConfig,
    #[serde(default)]
    pub agent: ServiceConfig,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub mount: MountConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub services: ServicesConfig,
}

struct RoleDefaults {
    image: &'static str,
    ip: Ipv4Addr,
    port: u16,
    required: bool,
}

fn role_defaults(role: ServiceRole) -> RoleDefaults {
    match role {
        ServiceRole::Ui => RoleDefaults {
            image: "ghcr.io/nlp-suite/nlp-suite-ui:main",
            ip: Ipv4Addr::new(172, 16, 0, 10),
            port: 8000,
            required: true,
        },
        ServiceRole::Agent => RoleDefaults {
            image: "ghcr.io/nlp-suite/nlp-suite-agent:main",
            ip: Ipv4Addr::new(172, 16, 0, 11),
            port: 3000,
            required: true,
        },
        ServiceRole::CoreNlp => RoleDefaults {
            image: "ghcr.io/nlp-suite/stanford-corenlp-docker:master",
            ip: Ipv4Addr::new(172, 16, 0, 12),
            port: 9000,
            required: false,
        },
    }
}

/// Start order of the suite
pub const START_ORDER: [ServiceRole; 3] = [ServiceRole::Ui, ServiceRole::CoreNlp, ServiceRole::Agent];

impl AppConfig {
    /// Applies environment overrides. `lookup` is `std::env::var` outside of tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(binary) = lookup("NLPBOX_ENGINE").filter(|b| !b.trim().is_empty()) {
            debug!("engine overridden by NLPBOX_ENGINE: {binary}");
            self.engine.binary = binary;
        }
    }

    fn service_config(&self, role: ServiceRole) -> &ServiceConfig {
        match role {
            ServiceRole::Ui => &self.services.ui,
            ServiceRole::CoreNlp => &self.services.corenlp,
            ServiceRole::Agent => &self.services.agent,
        }
    }

    /// Resolves the configuration into a launchable suite and validates it
    pub fn to_suite(&self, home: &Path) -> Result<Suite> {
        let (net_addr, prefix) = parse_subnet(&self.network.subnet)?;
        let mount_root = resolve_mount_root(&self.mount.root, home);

        if self.network.name.trim().is_empty() {
            bail!("network name is empty");
        }
        if self.mount.target.trim().is_empty() {
            bail!("mount target is empty");
        }

        let mut services = Vec::with_capacity(START_ORDER.len());
        let mut ips = HashSet::new();
        let mut ports = HashSet::new();
        let mut names = HashSet::new();

        for role in START_ORDER {
            let overrides = self.service_config(role);
            let defaults = role_defaults(role);

            let image = overrides
                .image
                .clone()
                .unwrap_or_else(|| defaults.image.to_string());
            if image.trim().is_empty() {
                bail!("{role} has an empty image");
            }

            let ip = overrides.ip.unwrap_or(defaults.ip);
            if !subnet_contains(net_addr, prefix, ip) {
                bail!("{role} address {ip} is outside subnet {}", self.network.subnet);
            }
            if !ips.insert(ip) {
                bail!("{role} reuses address {ip}");
            }

            let port = overrides.port.unwrap_or(defaults.port);
            if port == 0 {
                bail!("{role} has port 0");
            }
            if !ports.insert(port) {
                bail!("{role} reuses port {port}");
            }

            let container_name = overrides
                .container_name
                .clone()
                .unwrap_or_else(|| container_name_from_image(&image));
            if !names.insert(container_name.clone()) {
                bail!("{role} reuses container name '{container_name}'");
            }

            let mount = (role == ServiceRole::Agent).then(|| BindMount {
                source: mount_root.clone(),
                target: self.mount.target.clone(),
            });

            services.push(SuiteService {
                role,
                container_name,
                image,
                ip,
                port,
                required: overrides.required.unwrap_or(defaults.required),
                mount,
            });
        }

        Ok(Suite {
            network: SuiteNetwork {
                name: self.network.name.clone(),
                driver: self.network.driver.clone(),
                subnet: self.network.subnet.clone(),
            },
            services,
            mounts: MountLayout {
                root: mount_root,
                subfolders: self.mount.subfolders.clone(),
            },
        })
    }
}

/// Parses `a.b.c.d/n` into the network address and prefix length
pub fn parse_subnet(cidr: &str) -> Result<(Ipv4Addr, u8)> {
    let (addr, prefix) = cidr
        .trim()
        .split_once('/')
        .with_context(|| format!("subnet '{cidr}' is missing a prefix length"))?;

    let addr: Ipv4Addr = addr
        .parse()
        .with_context(|| format!("subnet '{cidr}' has an invalid address"))?;
    let prefix: u8 = prefix
        .parse()
        .with_context(|| format!("subnet '{cidr}' has an invalid prefix length"))?;

    if prefix > 32 {
        bail!("subnet '{cidr}' has a prefix length above 32");
    }

    Ok((addr, prefix))
}

fn subnet_contains(net: Ipv4Addr, prefix: u8, ip: Ipv4Addr) -> bool {
    let mask = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    };
    u32::from(net) & mask == u32::from(ip) & mask
}

/// Expands `~` and anchors relative paths at `home`
pub fn resolve_mount_root(root: &str, home: &Path) -> PathBuf {
    let home_str = home.to_string_lossy().into_owned();
    let expanded = shellexpand::tilde_with_context(root, || Some(home_str.clone()));
    let path = PathBuf::from(expanded.as_ref());

    if path.is_absolute() {
        path
    } else {
        home.join(path)
    }
}

pub fn load_app_config(config_dir: &Path) -> Result<AppConfig> {
    let config_path = config_dir.join(DEFAULT_NLPBOX_TOML_NAME);

    let mut app_config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("reading config at {:?}", config_path))?;
        toml::from_str(&content).with_context(|| format!("parsing config at {:?}", config_path))?
    } else {
        debug!("no config at {:?}, using defaults", config_path);
        AppConfig::default()
    };

    app_config.apply_env_overrides(|key| std::env::var(key).ok());

    Ok(app_config)
}

/// Writes the default config unless one is already there. Returns whether it wrote.
pub fn install_default_config(target_dir: &Path) -> Result<bool> {
    ensure_config_dir(target_dir)?;

    let target = target_dir.join(DEFAULT_NLPBOX_TOML_NAME);
    if target.exists() {
        return Ok(false);
    }

    fs::write(&target, DEFAULT_NLPBOX_TOML)
        .with_context(|| format!("writing template to {:?}", target))?;

    Ok(true)
}
