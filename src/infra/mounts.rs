use anyhow::{Context, Result, bail};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Makes sure `path` is a directory, creating it (and its parents) when missing
pub fn ensure_mount_point(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => {
            debug!("{:?} already exists", path);
            Ok(())
        }
        Ok(_) => bail!("{:?} exists but is not a directory", path),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            create_dir(path).with_context(|| format!("creating {:?}", path))
        }
        Err(e) => Err(e).with_context(|| format!("checking {:?}", path)),
    }
}

#[cfg(unix)]
fn create_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new()
        .recursive(true)
        .mode(0o755)
        .create(path)
}

#[cfg(not(unix))]
fn create_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)
}
