use std::sync::Arc;

use chargekit_lib::{Credentials, Network, SubscriptionPlatform};

use crate::config::ServerConfig;

/// Shared handler state, cloned into every request.
///
/// Holds no per-request data. The wallet itself lives on the platform and is
/// looked up again on every call.
#[derive(Clone)]
pub struct AppState {
    pub platform: Arc<dyn SubscriptionPlatform>,
    pub credentials: Arc<Credentials>,
    pub wallet_name: Arc<str>,
    pub network: Network,
}

impl AppState {
    pub fn new(
        platform: Arc<dyn SubscriptionPlatform>,
        credentials: Credentials,
        wallet_name: impl Into<Arc<str>>,
        network: Network,
    ) -> Self {
        Self {
            platform,
            credentials: Arc::new(credentials),
            wallet_name: wallet_name.into(),
            network,
        }
    }

    /// Build the state for a configured server.
    pub fn from_config(platform: Arc<dyn SubscriptionPlatform>, config: &ServerConfig) -> Self {
        Self::new(
            platform,
            config.credentials.clone(),
            config.wallet_name.as_str(),
            config.network,
        )
    }
}
