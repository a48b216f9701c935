use super::super::{ClientConfig, GatewayConfig, GenerationConfig, StorageConfig};
use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_log_level() -> String {
    "info".into()
}

pub(super) fn config_dir() -> PathBuf {
    let home = UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
    home.join(".reentry")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: config_dir().join("config.toml"),
            log_level: default_log_level(),
            gateway: GatewayConfig::default(),
            generation: GenerationConfig::default(),
            client: ClientConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gateway.allow_public_bind && !is_loopback_host(&self.gateway.host) {
            return Err(ConfigError::Validation(format!(
                "gateway.host {} is not loopback; set gateway.allow_public_bind = true to expose it",
                self.gateway.host
            )));
        }
        if self.gateway.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "gateway.request_timeout_secs must be at least 1".into(),
            ));
        }
        if self.generation.artifact_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "generation.artifact_timeout_secs must be at least 1".into(),
            ));
        }
        if self.generation.artifact_timeout_secs >= self.gateway.request_timeout_secs {
            return Err(ConfigError::Validation(format!(
                "generation.artifact_timeout_secs ({}) must be below gateway.request_timeout_secs ({})",
                self.generation.artifact_timeout_secs, self.gateway.request_timeout_secs
            )));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::Validation(format!(
                "generation.temperature {} is outside 0.0..=2.0",
                self.generation.temperature
            )));
        }
        if self.client.request_timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "client.request_timeout_secs must be at least 1 when set".into(),
            ));
        }
        if !self.client.api_url.starts_with("http://") && !self.client.api_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(format!(
                "client.api_url {} must start with http:// or https://",
                self.client.api_url
            )));
        }
        if self.storage.max_age_hours == 0 {
            return Err(ConfigError::Validation(
                "storage.max_age_hours must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn is_loopback_host(host: &str) -> bool {
    matches!(host, "127.0.0.1" | "localhost" | "::1" | "[::1]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationBackend;

    #[test]
    fn default_config_has_reasonable_values() {
        let config = Config::default();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.generation.backend, GenerationBackend::Template);
        assert!(config.config_path.ends_with("config.toml"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_toml_round_trip_preserves_serialized_fields() {
        let mut config = Config::default();
        config.generation.backend = GenerationBackend::Llm;
        config.generation.model = "llama-3.3-70b".into();
        config.storage.max_age_hours = 6;
        config.client.request_timeout_secs = Some(45);

        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(deserialized.generation.backend, GenerationBackend::Llm);
        assert_eq!(deserialized.generation.model, "llama-3.3-70b");
        assert_eq!(deserialized.storage.max_age_hours, 6);
        assert_eq!(deserialized.client.request_timeout_secs, Some(45));
    }

    #[test]
    fn empty_file_parses_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.gateway.port, 5000);
        assert_eq!(config.storage.max_age_hours, 24);
    }

    #[test]
    fn artifact_timeout_must_fit_inside_request_timeout() {
        let mut config = Config::default();
        config.gateway.request_timeout_secs = 60;
        config.generation.artifact_timeout_secs = 60;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("artifact_timeout_secs"));

        config.generation.artifact_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.generation.artifact_timeout_secs = 45;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn public_host_requires_opt_in() {
        let mut config = Config::default();
        config.gateway.host = "0.0.0.0".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("allow_public_bind"));

        config.gateway.allow_public_bind = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn temperature_out_of_range_is_rejected() {
        let mut config = Config::default();
        config.generation.temperature = 3.5;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn zero_client_timeout_is_rejected() {
        let mut config = Config::default();
        config.client.request_timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn api_url_scheme_is_checked() {
        let mut config = Config::default();
        config.client.api_url = "localhost:5000".into();
        assert!(config.validate().is_err());
    }
}
