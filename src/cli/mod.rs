pub mod launcher;
pub mod setup;
pub mod signals;

pub use launcher::{Launcher, UpArgs};
