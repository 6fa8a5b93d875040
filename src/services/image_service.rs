use crate::domain::ContainerRuntime;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

pub struct ImageService {
    runtime: Arc<dyn ContainerRuntime>,
}

impl ImageService {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    pub fn pull(&self, image: &str) -> Result<()> {
        info!("Pulling {image}...");
        self.runtime
            .pull_image(image)
            .with_context(|| format!("pulling {image}"))
    }
}
