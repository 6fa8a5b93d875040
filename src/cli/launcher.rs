use crate::cli::signals::ShutdownSignal;
use crate::domain::{ContainerRuntime, Suite};
use crate::infra::EngineAdapter;
use crate::infra::config::{AppConfig, home_dir, load_app_config};
use crate::services::{
    CleanupReport, ContainerService, ImageService, LaunchOptions, NetworkService, Orchestrator,
};
use anyhow::{Result, bail};
use clap::Args;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Args, Debug, Default, Clone)]
pub struct UpArgs {
    /// Skip pulling images (also enabled by ENV=dev)
    #[arg(long)]
    pub dev: bool,
    /// Exit right after cleanup instead of waiting for ENTER
    #[arg(long)]
    pub no_pause: bool,
}

pub struct Launcher {
    config: AppConfig,
    suite: Suite,
    container_service: Arc<ContainerService>,
    orchestrator: Orchestrator,
}

impl Launcher {
    pub fn new(config_dir: &Path) -> Result<Self> {
        let config = load_app_config(config_dir)?;
        let runtime = Arc::new(EngineAdapter::from_config(&config.engine));
        Self::with_runtime(config, &home_dir()?, runtime)
    }

    pub fn with_runtime(
        config: AppConfig,
        home: &Path,
        runtime: Arc<dyn ContainerRuntime>,
    ) -> Result<Self> {
        let suite = config.to_suite(home)?;
        let container_service = Arc::new(ContainerService::new(runtime.clone()));
        let image_service = Arc::new(ImageService::new(runtime.clone()));
        let network_service = Arc::new(NetworkService::new(runtime));
        let orchestrator = Orchestrator::new(
            container_service.clone(),
            image_service,
            network_service,
        );

        Ok(Self {
            config,
            suite,
            container_service,
            orchestrator,
        })
    }

    pub fn suite(&self) -> &Suite {
        &self.suite
    }

    pub fn ensure_engine(&self) -> Result<()> {
        if !self.container_service.is_engine_available() {
            bail!(
                "container engine `{}` is not reachable. Is it installed and running?",
                self.config.engine.binary
            );
        }
        Ok(())
    }

    /// Launches the suite, blocks in `wait_for_shutdown`, then cleans up.
    /// Cleanup also runs when setup fails; the setup error is returned after it.
    pub fn up<F>(&self, dev: bool, wait_for_shutdown: F) -> Result<CleanupReport>
    where
        F: FnOnce(),
    {
        self.ensure_engine()?;

        let options = LaunchOptions {
            skip_pull: dev,
            scope: self.config.cleanup.scope,
        };

        let outcome = self.orchestrator.launch(&self.suite, &options);
        match &outcome {
            Ok(()) => {
                self.print_banner();
                wait_for_shutdown();
                info!("Interrupt received, shutting down...");
            }
            Err(_) => warn!("Setup failed, cleaning up before exit..."),
        }

        let report = self.orchestrator.cleanup(&self.suite, self.config.cleanup.scope);
        outcome.map(|_| report)
    }

    pub fn down(&self) -> Result<CleanupReport> {
        self.ensure_engine()?;
        Ok(self.orchestrator.cleanup(&self.suite, self.config.cleanup.scope))
    }

    pub fn status(&self) -> Result<()> {
        println!("NLP Suite containers:");
        let mut running = 0;

        let entries = self.container_service.status(&self.suite.services)?;
        for (service, container) in &entries {
            let state = match container {
                Some(c) if c.is_running() => {
                    running += 1;
                    "running"
                }
                Some(c) if !c.state.is_empty() => c.state.as_str(),
                Some(_) => "unknown",
                None => "not created",
            };
            println!(
                "- {:<26} | {:<15} | {}:{}",
                service.container_name, state, service.ip, service.port
            );
        }

        println!("{running} of {} running", entries.len());
        Ok(())
    }

    fn print_banner(&self) {
        if let Some(url) = self.suite.ui_url() {
            println!(
                "The NLP Suite is running... copy the following address to a browser to open the NLP Suite at {url}"
            );
        }
        println!(
            "Your NLP Suite folder can be found at: {}",
            self.suite.mounts.root.display()
        );
    }
}

/// `ENV=dev` behaves like `--dev`
pub fn dev_mode<F>(flag: bool, lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    flag || lookup("ENV").is_some_and(|v| v == "dev")
}

pub fn up(args: UpArgs, config_dir: &Path) -> Result<()> {
    let launcher = Launcher::new(config_dir)?;
    let shutdown = ShutdownSignal::install()?;

    let result = launcher.up(
        dev_mode(args.dev, |key| std::env::var(key).ok()),
        || shutdown.wait(),
    );

    if launcher.config.cleanup.pause_on_exit && !args.no_pause && std::io::stdin().is_terminal() {
        pause_for_enter();
    }

    result.map(|_| ())
}

pub fn down(config_dir: &Path) -> Result<()> {
    let report = Launcher::new(config_dir)?.down()?;
    if !report.is_clean() {
        bail!("cleanup finished with {} failure(s)", report.failures.len());
    }
    Ok(())
}

pub fn status(config_dir: &Path) -> Result<()> {
    let launcher = Launcher::new(config_dir)?;
    launcher.ensure_engine()?;
    launcher.status()
}

fn pause_for_enter() {
    println!("The NLP Suite has successfully closed... please type ENTER to close this window.");
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
}
