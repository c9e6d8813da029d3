//! Wallet/subscription platform capability.
//!
//! The platform owns wallet custody, subscription accounting and settlement.
//! Chargekit only ever talks to it through [`SubscriptionPlatform`], which keeps
//! the demo server and the client controller testable without a live network.
//!
//! ## Implementations
//!
//! - [`HttpPlatform`] - JSON client for the platform gateway (feature `http-platform`)
//! - `test_utils::MockPlatform` - in-memory double (feature `test-utils`)

mod config;
#[cfg(feature = "http-platform")]
mod http;

pub use config::{default_timeout, PlatformConfig};
#[cfg(feature = "http-platform")]
pub use http::HttpPlatform;

use async_trait::async_trait;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    ChargeReceipt, ChargeRequest, Network, Result, RevokeRequest, RevokeResult, SubscribeRequest,
    SubscriptionInfo, SubscriptionStatus, WalletInfo,
};

/// Server-side platform credentials.
///
/// Read from the process environment by the server and never handed to
/// clients. Secrets are wiped from memory on drop and redacted from `Debug`.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    /// API key identifier.
    pub api_key_id: String,
    /// API key secret.
    pub api_key_secret: String,
    /// Secret unlocking the custodial wallet.
    pub wallet_secret: String,
}

impl Credentials {
    /// Create credentials from their three parts.
    pub fn new(
        api_key_id: impl Into<String>,
        api_key_secret: impl Into<String>,
        wallet_secret: impl Into<String>,
    ) -> Self {
        Self {
            api_key_id: api_key_id.into(),
            api_key_secret: api_key_secret.into(),
            wallet_secret: wallet_secret.into(),
        }
    }

    /// True when all three values are present.
    pub fn is_complete(&self) -> bool {
        !self.api_key_id.trim().is_empty()
            && !self.api_key_secret.trim().is_empty()
            && !self.wallet_secret.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key_id", &self.api_key_id)
            .field("api_key_secret", &"<redacted>")
            .field("wallet_secret", &"<redacted>")
            .finish()
    }
}

/// The five platform operations Chargekit relies on.
///
/// `subscribe` and `get_status` are client-side calls and carry no
/// credentials. The other three act with the server wallet.
#[async_trait]
pub trait SubscriptionPlatform: Send + Sync {
    /// Return the wallet provisioned under `name`, creating it on first use.
    ///
    /// Repeated calls with the same name return the same address.
    async fn create_or_get_wallet(&self, name: &str, credentials: &Credentials)
        -> Result<WalletInfo>;

    /// Create a subscription allowing `owner_address` to charge the payer.
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<SubscriptionInfo>;

    /// Fetch the live status of a subscription.
    async fn get_status(&self, subscription_id: &str, network: Network)
        -> Result<SubscriptionStatus>;

    /// Charge a subscription using the server wallet.
    async fn charge(&self, request: &ChargeRequest, credentials: &Credentials)
        -> Result<ChargeReceipt>;

    /// Cancel a subscription using the server wallet.
    async fn revoke(&self, request: &RevokeRequest, credentials: &Credentials)
        -> Result<RevokeResult>;
}
