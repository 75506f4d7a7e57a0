//! Line-delimited JSON worker protocol around the search core.

pub mod config;
pub mod engine;
pub mod error;
pub mod position;
pub mod wire;

pub use config::WorkerConfig;
pub use engine::Worker;
pub use error::WorkerError;
