//! Platform used when no gateway URL is configured.

use async_trait::async_trait;
use chargekit_lib::{
    ChargeReceipt, ChargeRequest, ChargekitError, Credentials, Network, RevokeRequest,
    RevokeResult, SubscribeRequest, SubscriptionInfo, SubscriptionPlatform, SubscriptionStatus,
    WalletInfo,
};

const HINT: &str = "set PLATFORM_API_URL or pass --platform-url";

/// Fails every client-side call with a configuration hint.
///
/// Server-backed commands (`wallet`, `charge`, `revoke`) still work without it.
pub struct UnconfiguredPlatform;

fn unconfigured<T>() -> chargekit_lib::Result<T> {
    Err(ChargekitError::invalid_data("platform_url", HINT))
}

#[async_trait]
impl SubscriptionPlatform for UnconfiguredPlatform {
    async fn create_or_get_wallet(
        &self,
        _name: &str,
        _credentials: &Credentials,
    ) -> chargekit_lib::Result<WalletInfo> {
        unconfigured()
    }

    async fn subscribe(&self, _request: &SubscribeRequest) -> chargekit_lib::Result<SubscriptionInfo> {
        unconfigured()
    }

    async fn get_status(
        &self,
        _subscription_id: &str,
        _network: Network,
    ) -> chargekit_lib::Result<SubscriptionStatus> {
        unconfigured()
    }

    async fn charge(
        &self,
        _request: &ChargeRequest,
        _credentials: &Credentials,
    ) -> chargekit_lib::Result<ChargeReceipt> {
        unconfigured()
    }

    async fn revoke(
        &self,
        _request: &RevokeRequest,
        _credentials: &Credentials,
    ) -> chargekit_lib::Result<RevokeResult> {
        unconfigured()
    }
}
