pub mod schema;

pub use schema::{
    ClientConfig, Config, GatewayConfig, GenerationBackend, GenerationConfig, StorageConfig,
};
