use crate::domain::{ContainerSummary, MountLayout, ServiceRole, Suite};
use crate::infra::config::CleanupScope;
use crate::infra::mounts::ensure_mount_point;
use crate::services::{ContainerService, ImageService, NetworkService};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Orchestrates the suite lifecycle: install, prepare, start and tear down
pub struct Orchestrator {
    container_service: Arc<ContainerService>,
    image_service: Arc<ImageService>,
    network_service: Arc<NetworkService>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LaunchOptions {
    /// Use whatever images are already present
    pub skip_pull: bool,
    pub scope: CleanupScope,
}

/// What a cleanup pass managed to do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub stopped: usize,
    pub removed: usize,
    pub network_removed: bool,
    pub failures: Vec<String>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Orchestrator {
    pub fn new(
        container_service: Arc<ContainerService>,
        image_service: Arc<ImageService>,
        network_service: Arc<NetworkService>,
    ) -> Self {
        Self {
            container_service,
            image_service,
            network_service,
        }
    }

    /// Full setup sequence. Stops at the first fatal step; the caller owns cleanup.
    pub fn launch(&self, suite: &Suite, options: &LaunchOptions) -> Result<()> {
        if options.skip_pull {
            info!("Skipping image installation because dev mode is on...");
        } else {
            self.install_images(suite, options.scope)?;
        }

        self.prepare_folders(&suite.mounts)?;

        info!("Creating the NLP Suite network...");
        self.network_service.ensure(&suite.network)?;

        self.start_services(suite)
    }

    /// Pulls the UI image, clears leftovers of a previous run, then pulls the rest
    pub fn install_images(&self, suite: &Suite, scope: CleanupScope) -> Result<()> {
        let mut pulled_first = false;

        for role in [ServiceRole::Ui, ServiceRole::Agent, ServiceRole::CoreNlp] {
            let Some(service) = suite.service(role) else {
                continue;
            };

            info!("Installing the latest version of the {role}...");
            self.image_service.pull(&service.image)?;

            if !pulled_first {
                pulled_first = true;
                info!("Cleaning up any previous artifacts of the NLP Suite...");
                self.cleanup(suite, scope);
            }
        }

        Ok(())
    }

    pub fn prepare_folders(&self, mounts: &MountLayout) -> Result<()> {
        for folder in mounts.folders() {
            info!("Validating {}...", folder.display());
            ensure_mount_point(&folder)?;
        }
        Ok(())
    }

    /// Starts services in order; optional ones only warn on failure
    pub fn start_services(&self, suite: &Suite) -> Result<()> {
        for service in &suite.services {
            info!("Starting the {}...", service.role);

            match self.container_service.run(service, &suite.network.name) {
                Ok(id) => debug!("{} running as {id}", service.container_name),
                Err(e) if !service.required => {
                    warn!(
                        "Error running the {} container: {e:#}. The NLP Suite is continuing \
                         execution as some tools can be used without it.",
                        service.role
                    );
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("running the {}", service.role));
                }
            }
        }

        Ok(())
    }

    /// Stops then removes containers, then removes the suite network.
    /// Each failure is logged and the pass moves on to the next item.
    pub fn cleanup(&self, suite: &Suite, scope: CleanupScope) -> CleanupReport {
        info!("Cleaning up the NLP Suite...");
        let mut report = CleanupReport::default();

        let containers = match self.container_service.list_all() {
            Ok(list) => select_for_cleanup(list, suite, scope),
            Err(e) => {
                error!("Error cleaning up: {e:#}");
                report.failures.push(format!("list: {e:#}"));
                return report;
            }
        };

        for container in &containers {
            match self.container_service.stop(&container.id) {
                Ok(_) => report.stopped += 1,
                Err(e) => {
                    error!("Error stopping container {}: {e:#}", container.id);
                    report.failures.push(format!("stop {}: {e:#}", container.id));
                }
            }
        }

        for container in &containers {
            match self.container_service.remove(&container.id) {
                Ok(_) => report.removed += 1,
                Err(e) => {
                    error!("Error removing container {}: {e:#}", container.id);
                    report.failures.push(format!("remove {}: {e:#}", container.id));
                }
            }
        }

        match self.network_service.remove(&suite.network.name) {
            Ok(_) => report.network_removed = true,
            // usually just means the network was never created
            Err(e) => debug!("Network {} not removed: {e:#}", suite.network.name),
        }

        info!(
            "Cleanup done: {} stopped, {} removed, {} failure(s)",
            report.stopped,
            report.removed,
            report.failures.len()
        );

        report
    }
}

fn select_for_cleanup(
    containers: Vec<ContainerSummary>,
    suite: &Suite,
    scope: CleanupScope,
) -> Vec<ContainerSummary> {
    match scope {
        CleanupScope::All => containers,
        CleanupScope::Suite => {
            let names = suite.container_names();
            containers
                .into_iter()
                .filter(|c| names.contains(&c.name))
                .collect()
        }
    }
}
