//! Backend endpoint configuration.

use serde::{Deserialize, Serialize};

/// Where the HireHub backend lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// HTTP origin of the backend, without a trailing path.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u32,
    /// Origin of the web frontend, used for links printed by job toasts.
    pub web_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            request_timeout_secs: 10,
            web_url: "http://localhost:5173".into(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.request_timeout_secs))
    }

    fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Endpoint receiving worker position updates.
    pub fn location_url(&self) -> String {
        format!("{}/api/worker/location", self.origin())
    }

    /// Base of the login and registration endpoints.
    pub fn auth_url(&self) -> String {
        format!("{}/api/auth", self.origin())
    }

    /// WebSocket URL for `path`, derived from the HTTP origin.
    pub fn ws_url(&self, path: &str) -> String {
        let origin = self.origin();
        let origin = if let Some(rest) = origin.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = origin.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            origin.to_string()
        };
        format!("{origin}{path}")
    }
}
