pub mod cli;
pub mod domain;
pub mod infra;
pub mod services;

// Shared with the integration tests under tests/
pub mod test_support;

pub use domain::{ContainerRuntime, ContainerSpec, ServiceRole, Suite, SuiteService};
pub use infra::EngineAdapter;
pub use services::{CleanupReport, ContainerService, Orchestrator};
