pub mod config;
pub mod engine_adapter;
pub mod mounts;

pub use engine_adapter::EngineAdapter;
