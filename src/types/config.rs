//! Configuration structures.
//!
//! Configuration is assembled from CLI flags and environment variables by the
//! binary entry point; the library only sees these structs.

use serde::{Deserialize, Serialize};

/// Global gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend API access configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// SSE transport configuration.
    #[serde(default)]
    pub sse: SseConfig,
}

/// Backend API access configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bearer token for the backend API. Required; an empty value is a
    /// startup error.
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Base URL of the backend API.
    pub base_url: String,

    /// Request timeout in seconds for backend round trips.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.example.com".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// SSE transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseConfig {
    /// Listen address for the HTTP server.
    pub listen_addr: String,

    /// Bounded channel capacity per peer stream. A peer that cannot drain
    /// responses within this window exerts backpressure on its own posts
    /// only, never on other peers.
    pub channel_capacity: usize,

    /// Keep-alive comment interval in seconds on idle streams.
    pub keep_alive_secs: u64,
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8808".to_string(),
            channel_capacity: 32,
            keep_alive_secs: 15,
        }
    }
}

impl ApiConfig {
    /// Validate startup requirements. Called before any transport binding
    /// is opened.
    pub fn validate(&self) -> crate::types::Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(crate::types::Error::config("api key must not be empty"));
        }
        if self.base_url.trim().is_empty() {
            return Err(crate::types::Error::config("base url must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        let config = ApiConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn populated_config_validates() {
        let config = ApiConfig {
            api_key: "secret".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
