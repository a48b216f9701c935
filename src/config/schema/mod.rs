mod client;
mod core;
mod gateway;
mod generation;

pub use client::{ClientConfig, StorageConfig};
pub use core::Config;
pub use gateway::GatewayConfig;
pub use generation::{GenerationBackend, GenerationConfig};
