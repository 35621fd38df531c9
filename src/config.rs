//! Environment-driven configuration for the generation client.

use std::time::Duration;

/// Connection settings for the generation proxy.
///
/// The proxy accepts `{ prompt, personalApiKey, model }` and holds a
/// server-side default credential; a per-node personal key overrides it.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Proxy endpoint accepting generation requests.
    pub endpoint: String,
    /// Model identifier forwarded with each request.
    pub model: String,
    /// Server-side default credential; `None` defers to the proxy's own.
    pub default_api_key: Option<String>,
}

impl ClientConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:8000/api/generate";
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";

    /// Reads configuration from the environment, loading a `.env` file when
    /// present. Missing variables fall back to local defaults.
    ///
    /// Recognized variables: `FLOWCANVAS_API_URL`, `FLOWCANVAS_MODEL`,
    /// `GEMINI_API_KEY`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            endpoint: std::env::var("FLOWCANVAS_API_URL")
                .unwrap_or_else(|_| Self::DEFAULT_ENDPOINT.to_string()),
            model: std::env::var("FLOWCANVAS_MODEL")
                .unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string()),
            default_api_key: std::env::var("GEMINI_API_KEY").ok(),
        }
    }

    /// Configuration pointed at an explicit endpoint, for tests and
    /// embedded deployments.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            default_api_key: None,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Tunables for the execution engine and session.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Model identifier stamped on each generation request.
    pub model: String,
    /// Whether generation replies get lightweight markup stripped.
    pub cleanup_replies: bool,
    /// Delay before node statuses reset to idle after a run. Cosmetic.
    pub status_reset_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: ClientConfig::DEFAULT_MODEL.to_string(),
            cleanup_replies: true,
            status_reset_delay: Duration::from_secs(2),
        }
    }
}
