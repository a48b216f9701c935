use serde::{Deserialize, Serialize};

/// Settings for the interactive wizard talking to a gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the gateway (default: http://127.0.0.1:5000)
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Abort generation calls after this many seconds. Unset means the call
    /// waits on the transport.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_api_url() -> String {
    "http://127.0.0.1:5000".into()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: None,
        }
    }
}

/// Where the wizard keeps drafts, results and regeneration counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Session directory; `~` is expanded. Unset keeps everything in memory,
    /// so closing the wizard discards it.
    #[serde(default)]
    pub session_dir: Option<String>,
    /// Records older than this are treated as absent (default: 24h)
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u32,
}

fn default_max_age_hours() -> u32 {
    24
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            session_dir: None,
            max_age_hours: default_max_age_hours(),
        }
    }
}

impl StorageConfig {
    pub fn resolved_session_dir(&self) -> Option<std::path::PathBuf> {
        self.session_dir
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(|dir| std::path::PathBuf::from(shellexpand::tilde(dir).as_ref()))
    }
}
