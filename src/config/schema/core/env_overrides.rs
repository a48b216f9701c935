use super::Config;
use crate::config::GenerationBackend;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("REENTRY_API_KEY")
            && !key.is_empty()
        {
            self.generation.api_key = Some(key);
        }

        if let Ok(model) = std::env::var("REENTRY_MODEL")
            && !model.is_empty()
        {
            self.generation.model = model;
        }

        if let Ok(backend) = std::env::var("REENTRY_GENERATOR")
            && let Ok(backend) = backend.parse::<GenerationBackend>()
        {
            self.generation.backend = backend;
        }

        if let Ok(port_str) = std::env::var("REENTRY_PORT").or_else(|_| std::env::var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(host) = std::env::var("REENTRY_HOST")
            && !host.is_empty()
        {
            self.gateway.host = host;
        }

        if let Ok(url) = std::env::var("REENTRY_API_URL")
            && !url.is_empty()
        {
            self.client.api_url = url;
        }
    }
}
