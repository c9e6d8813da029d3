//! Configuration for the platform client.

use serde::{Deserialize, Serialize};

use crate::Network;

/// Connection settings for the platform gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Gateway base URL (e.g., "https://platform.example/v1").
    pub api_url: String,

    /// Network every call is made on.
    #[serde(default)]
    pub network: Network,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Default request timeout in seconds.
pub fn default_timeout() -> u64 {
    30
}

impl PlatformConfig {
    /// Create a new configuration on testnet.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            network: Network::default(),
            timeout_secs: default_timeout(),
        }
    }

    /// Set the network.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = PlatformConfig::new("https://platform.example/v1")
            .with_network(Network::Mainnet)
            .with_timeout(5);

        assert_eq!(config.api_url, "https://platform.example/v1");
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_serde_defaults() {
        let config: PlatformConfig =
            serde_json::from_str(r#"{"api_url":"http://localhost:9000"}"#).unwrap();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.timeout_secs, 30);
    }
}
