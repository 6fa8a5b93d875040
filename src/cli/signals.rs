use anyhow::{Context, Result};
use std::sync::mpsc::{self, Receiver};
use tracing::debug;

/// Interrupt (SIGINT/SIGTERM) listener. The handler thread only notifies;
/// the main thread does the cleanup.
pub struct ShutdownSignal {
    rx: Receiver<()>,
}

impl ShutdownSignal {
    pub fn install() -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        ctrlc::set_handler(move || {
            let _ = tx.send(());
        })
        .context("installing interrupt handler")?;

        Ok(Self::from_channel(rx))
    }

    pub(crate) fn from_channel(rx: Receiver<()>) -> Self {
        Self { rx }
    }

    /// Blocks until the first interrupt
    pub fn wait(&self) {
        if self.rx.recv().is_err() {
            debug!("interrupt handler dropped");
        }
    }
}
