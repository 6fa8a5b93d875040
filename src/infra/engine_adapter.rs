use crate::domain::{ContainerRuntime, ContainerSpec, ContainerSummary, NetworkSpec};
use crate::infra::config::EngineConfig;
use anyhow::{Context, Result, bail};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

const LIST_FORMAT: &str = "{{.ID}}\t{{.Names}}\t{{.Image}}\t{{.State}}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFlavor {
    Docker,
    Podman,
}

impl EngineFlavor {
    fn detect(binary: &str) -> Self {
        let file_name = Path::new(binary)
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(binary);

        if file_name.starts_with("podman") {
            Self::Podman
        } else {
            Self::Docker
        }
    }
}

/// Drives a Docker-compatible engine through its command line
#[derive(Debug, Clone)]
pub struct EngineAdapter {
    binary: String,
    flavor: EngineFlavor,
    api_version: Option<String>,
}

impl EngineAdapter {
    pub fn new(binary: impl Into<String>, api_version: Option<String>) -> Self {
        let binary = binary.into();
        Self {
            flavor: EngineFlavor::detect(&binary),
            binary,
            api_version,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.binary.clone(), config.api_version.clone())
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        if let Some(version) = &self.api_version {
            cmd.env("DOCKER_API_VERSION", version);
        }
        cmd
    }

    fn run<I, S>(&self, args: I, context: &str) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let status = self.status(args, context)?;
        ensure_success(&self.binary, status, context)
    }

    fn status<I, S>(&self, args: I, context: &str) -> Result<ExitStatus>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.command()
            .args(args)
            .status()
            .with_context(|| format!("{context} (is `{}` installed and on PATH?)", self.binary))
    }

    fn output<I, S>(&self, args: I, context: &str) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self
            .command()
            .args(args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("{context} (is `{}` installed and on PATH?)", self.binary))?;

        if !output.status.success() {
            bail!(
                "{} returned {} ({context}): {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ContainerRuntime for EngineAdapter {
    fn is_available(&self) -> bool {
        self.command()
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn pull_image(&self, image: &str) -> Result<()> {
        self.run(["pull", image], &format!("pulling image {image}"))
    }

    fn list_networks(&self) -> Result<Vec<String>> {
        let out = self.output(
            ["network", "ls", "--format", "{{.Name}}"],
            "listing networks",
        )?;

        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    fn create_network(&self, spec: &NetworkSpec) -> Result<()> {
        self.output(
            network_create_args(spec, self.flavor),
            &format!("creating network {}", spec.name),
        )
        .map(|_| ())
    }

    fn remove_network(&self, name: &str) -> Result<()> {
        self.output(["network", "rm", name], &format!("removing network {name}"))
            .map(|_| ())
    }

    fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        let out = self.output(
            create_args(spec),
            &format!("creating container {}", spec.name),
        )?;

        let id = out.lines().last().map(str::trim).unwrap_or_default();
        if id.is_empty() {
            bail!("{} did not report an id for {}", self.binary, spec.name);
        }

        Ok(id.to_string())
    }

    fn start_container(&self, id: &str) -> Result<()> {
        self.output(["start", id], &format!("starting container {id}"))
            .map(|_| ())
    }

    fn stop_container(&self, id: &str) -> Result<()> {
        self.output(["stop", id], &format!("stopping container {id}"))
            .map(|_| ())
    }

    fn remove_container(&self, id: &str) -> Result<()> {
        self.output(["rm", "-f", id], &format!("removing container {id}"))
            .map(|_| ())
    }

    fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
        let out = self.output(
            ["ps", "-a", "--no-trunc", "--format", LIST_FORMAT],
            "listing containers",
        )?;
        Ok(parse_container_list(&out))
    }
}

pub fn network_create_args(spec: &NetworkSpec, flavor: EngineFlavor) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "network".into(),
        "create".into(),
        "--driver".into(),
        spec.driver.into(),
        "--subnet".into(),
        spec.subnet.into(),
    ];

    // podman has no notion of attachable networks
    if spec.attachable && flavor == EngineFlavor::Docker {
        args.push("--attachable".into());
    }

    args.push(spec.name.into());
    args
}

pub fn create_args(spec: &ContainerSpec) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "create".into(),
        "--name".into(),
        spec.name.into(),
        "--network".into(),
        spec.network.into(),
        "--ip".into(),
        spec.ip.to_string(),
    ];

    for port in spec.ports {
        args.push("-p".into());
        args.push(format!("0.0.0.0:{port}:{port}/tcp"));
    }

    for mount in spec.mounts {
        args.push("--mount".into());
        args.push(format!(
            "type=bind,source={},target={}",
            mount.source.display(),
            mount.target
        ));
    }

    args.push(spec.image.into());
    args
}

/// Parses `ps` output produced with the tab-separated list format
pub fn parse_container_list(out: &str) -> Vec<ContainerSummary> {
    out.lines()
        .filter_map(|line| {
            let mut fields = line.trim_end_matches('\r').split('\t');
            let id = fields.next()?.trim();
            if id.is_empty() {
                return None;
            }
            let names = fields.next().unwrap_or_default();
            let name = names.split(',').next().unwrap_or_default().trim();
            let image = fields.next().unwrap_or_default().trim();
            let state = fields.next().unwrap_or_default().trim();

            Some(ContainerSummary {
                id: id.to_string(),
                name: name.to_string(),
                image: image.to_string(),
                state: state.to_string(),
            })
        })
        .collect()
}

fn ensure_success(binary: &str, status: ExitStatus, context: &str) -> Result<()> {
    if status.success() {
        return Ok(());
    }

    bail!("{binary} returned {status} ({context})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BindMount;
    use std::net::Ipv4Addr;
    use std::path::PathBuf;

    #[test]
    fn test_create_args_with_mount_and_port() {
        let mounts = [BindMount {
            source: PathBuf::from("/home/u/nlp-suite"),
            target: "/root/nlp-suite".into(),
        }];
        let spec = ContainerSpec {
            name: "nlp_suite_agent",
            image: "ghcr.io/nlp-suite/nlp-suite-agent:main",
            network: "nlp-suite-network",
            ip: Ipv4Addr::new(172, 16, 0, 11),
            ports: &[3000],
            mounts: &mounts,
        };

        assert_eq!(
            create_args(&spec),
            vec![
                "create",
                "--name",
                "nlp_suite_agent",
                "--network",
                "nlp-suite-network",
                "--ip",
                "172.16.0.11",
                "-p",
                "0.0.0.0:3000:3000/tcp",
                "--mount",
                "type=bind,source=/home/u/nlp-suite,target=/root/nlp-suite",
                "ghcr.io/nlp-suite/nlp-suite-agent:main",
            ]
        );
    }

    #[test]
    fn test_create_args_image_is_last_without_mounts() {
        let spec = ContainerSpec {
            name: "ui",
            image: "ui:main",
            network: "net",
            ip: Ipv4Addr::new(10, 0, 0, 2),
            ports: &[8000],
            mounts: &[],
        };

        let args = create_args(&spec);
        assert!(!args.contains(&"--mount".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("ui:main"));
    }

    #[test]
    fn test_network_create_args_per_flavor() {
        let spec = NetworkSpec {
            name: "nlp-suite-network",
            driver: "bridge",
            subnet: "172.16.0.0/16",
            attachable: true,
        };

        let docker = network_create_args(&spec, EngineFlavor::Docker);
        assert!(docker.contains(&"--attachable".to_string()));
        assert_eq!(docker.last().map(String::as_str), Some("nlp-suite-network"));

        let podman = network_create_args(&spec, EngineFlavor::Podman);
        assert!(!podman.contains(&"--attachable".to_string()));
        assert_eq!(&podman[..6], &docker[..6]);
    }

    #[test]
    fn test_flavor_detection() {
        assert_eq!(EngineFlavor::detect("docker"), EngineFlavor::Docker);
        assert_eq!(EngineFlavor::detect("/usr/bin/podman"), EngineFlavor::Podman);
        assert_eq!(
            EngineAdapter::new("podman-remote", None).flavor,
            EngineFlavor::Podman
        );
    }

    #[test]
    fn test_parse_container_list() {
        let out = "abc123\tnlp_suite_ui\tghcr.io/nlp-suite/nlp-suite-ui:main\trunning\n\
                   def456\tother,alias\tredis:7\texited\n\
                   \n";

        let list = parse_container_list(out);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, "abc123");
        assert_eq!(list[0].name, "nlp_suite_ui");
        assert!(list[0].is_running());
        assert_eq!(list[1].name, "other");
        assert_eq!(list[1].image, "redis:7");
        assert!(!list[1].is_running());
    }

    #[test]
    fn test_parse_container_list_tolerates_missing_columns() {
        let list = parse_container_list("abc123\n");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "");
        assert_eq!(list[0].state, "");
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let adapter = EngineAdapter::new("nlpbox-no-such-engine", None);
        assert!(!adapter.is_available());
        assert!(adapter.list_containers().is_err());
    }
}
