//! Hosted store configuration.

use serde::{Deserialize, Serialize};

/// Hosted store client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the hosted backend (REST under `/rest/v1`, auth under `/auth/v1`)
    #[serde(default = "default_url")]
    pub url: String,
    /// Service-role key used for data calls (optional in development)
    pub service_key: Option<String>,
    /// Public key sent as `apikey` on identity calls; falls back to the service key
    pub anon_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            service_key: None,
            anon_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}
