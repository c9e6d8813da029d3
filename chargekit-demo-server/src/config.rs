//! Server configuration read from the process environment.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `PLATFORM_API_KEY_ID` | API key identifier | required |
//! | `PLATFORM_API_KEY_SECRET` | API key secret | required |
//! | `PLATFORM_WALLET_SECRET` | Secret unlocking the server wallet | required |
//! | `PLATFORM_API_URL` | Platform gateway base URL | required for the HTTP platform |
//! | `CHARGEKIT_WALLET_NAME` | Name of the server wallet | `chargekit-demo-wallet` |
//! | `CHARGEKIT_NETWORK` | `testnet` or `mainnet` | `testnet` |
//! | `CHARGEKIT_BIND` | Listen address | `127.0.0.1:3000` |
//!
//! Missing credentials are not fatal at startup; the handlers report the
//! platform's refusal instead.

use anyhow::{anyhow, Context, Result};
use chargekit_lib::{Credentials, Network, DEFAULT_WALLET_NAME};

/// Listen address when `CHARGEKIT_BIND` is unset.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Everything the server needs to start.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,
    /// Platform gateway base URL.
    pub platform_url: Option<String>,
    /// Server-side platform credentials.
    pub credentials: Credentials,
    /// Name of the custodial wallet the server charges with.
    pub wallet_name: String,
    /// Network every platform call is made on.
    pub network: Network,
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary lookup function.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let network = match get("CHARGEKIT_NETWORK") {
            Some(raw) => raw
                .parse::<Network>()
                .map_err(|e| anyhow!(e))
                .context("CHARGEKIT_NETWORK")?,
            None => Network::Testnet,
        };

        Ok(Self {
            bind: get("CHARGEKIT_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            platform_url: get("PLATFORM_API_URL"),
            credentials: Credentials::new(
                get("PLATFORM_API_KEY_ID").unwrap_or_default(),
                get("PLATFORM_API_KEY_SECRET").unwrap_or_default(),
                get("PLATFORM_WALLET_SECRET").unwrap_or_default(),
            ),
            wallet_name: get("CHARGEKIT_WALLET_NAME")
                .unwrap_or_else(|| DEFAULT_WALLET_NAME.to_string()),
            network,
        })
    }

    /// Override the listen address.
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }
}
