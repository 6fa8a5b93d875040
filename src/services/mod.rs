mod container_service;
mod image_service;
mod network_service;
mod orchestrator;

pub use container_service::ContainerService;
pub use image_service::ImageService;
pub use network_service::NetworkService;
pub use orchestrator::{CleanupReport, LaunchOptions, Orchestrator};
