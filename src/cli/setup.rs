use crate::infra::config::{DEFAULT_NLPBOX_TOML_NAME, install_default_config};
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub fn install(config_dir: &Path) -> Result<()> {
    info!("Preparing config in {:?}", config_dir);

    if install_default_config(config_dir)? {
        info!(
            "Config ready. Adjust {} as needed.",
            config_dir.join(DEFAULT_NLPBOX_TOML_NAME).display()
        );
    } else {
        info!(
            "{} already exists, left untouched",
            config_dir.join(DEFAULT_NLPBOX_TOML_NAME).display()
        );
    }

    Ok(())
}
