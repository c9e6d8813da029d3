//! HTTP client for the wallet/subscription platform gateway.
//!
//! # Feature Flags
//!
//! This module requires the `http-platform` feature flag (on by default).
//!
//! ```toml
//! [dependencies]
//! chargekit-lib = { version = "0.1", features = ["http-platform"] }
//! ```
//!
//! # Wire contract
//!
//! All paths are relative to [`PlatformConfig::api_url`]:
//!
//! | Operation | Request |
//! |---|---|
//! | create_or_get_wallet | `POST wallets` `{name}` |
//! | subscribe | `POST subscriptions` `{owner, recurringCharge, periodInDays, testnet}` |
//! | get_status | `GET subscriptions/{id}/status?testnet=<bool>` |
//! | charge | `POST subscriptions/{id}/charge` `{amount, testnet, walletName, recipient?}` |
//! | revoke | `POST subscriptions/{id}/revoke` `{testnet, walletName}` |
//!
//! Server-side calls authenticate with the `x-api-key-id`, `authorization` and
//! `x-wallet-secret` headers. Client-side calls send no credentials.
//!
//! # Example
//!
//! ```rust,ignore
//! use chargekit_lib::platform::{HttpPlatform, PlatformConfig};
//!
//! let platform = HttpPlatform::new(PlatformConfig::new("https://platform.example/v1"))?;
//! let status = platform.get_status("0x5ub", Network::Testnet).await?;
//! println!("subscribed: {}", status.is_subscribed);
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{Credentials, PlatformConfig, SubscriptionPlatform};
use crate::{
    ChargeReceipt, ChargeRequest, ChargekitError, Network, Result, RevokeRequest, RevokeResult,
    SubscribeRequest, SubscriptionInfo, SubscriptionStatus, WalletInfo,
};

/// Error body returned by the platform gateway.
#[derive(Debug, Default, Deserialize)]
struct PlatformErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Platform client speaking JSON over HTTP.
///
/// Stateless apart from the connection pool; safe to share between requests.
pub struct HttpPlatform {
    config: PlatformConfig,
    client: reqwest::Client,
}

impl HttpPlatform {
    /// Create a new platform client with the given configuration.
    pub fn new(config: PlatformConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChargekitError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Get the configuration.
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Build the full URL for an API endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn authenticated(
        &self,
        builder: reqwest::RequestBuilder,
        credentials: &Credentials,
    ) -> Result<reqwest::RequestBuilder> {
        if !credentials.is_complete() {
            return Err(ChargekitError::Auth(
                "platform credentials are not configured".to_string(),
            ));
        }
        Ok(builder
            .header("x-api-key-id", credentials.api_key_id.as_str())
            .bearer_auth(credentials.api_key_secret.as_str())
            .header("x-wallet-secret", credentials.wallet_secret.as_str()))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<T> {
        tracing::debug!(operation, "platform request");
        let response = builder
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(operation, e))?;
        self.handle_response(operation, response).await
    }

    /// Handle an HTTP response, parsing JSON or returning an error.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        operation: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let err = self.map_status_error(status.as_u16(), &error_text);
            tracing::debug!(operation, status = status.as_u16(), error = %err, "platform rejected request");
            return Err(err);
        }

        response.json::<T>().await.map_err(|e| {
            ChargekitError::Serialization(format!(
                "Failed to parse platform {} response: {}",
                operation, e
            ))
        })
    }

    /// Map HTTP status codes to ChargekitError.
    fn map_status_error(&self, status: u16, error_text: &str) -> ChargekitError {
        let body: PlatformErrorBody = serde_json::from_str(error_text).unwrap_or_default();
        let headline = body
            .error
            .clone()
            .or_else(|| body.title.clone())
            .or_else(|| body.message.clone());

        match status {
            401 | 403 => ChargekitError::Auth(
                headline.unwrap_or_else(|| format!("platform refused credentials ({})", status)),
            ),
            404 => ChargekitError::NotFound {
                resource_type: "platform resource".to_string(),
                identifier: headline.unwrap_or_else(|| error_text.to_string()),
            },
            _ => match headline {
                Some(title) => {
                    // A message that was not used as the headline is the best detail we have
                    let details = body.details.or_else(|| {
                        body.message
                            .filter(|m| body.error.is_some() || body.title.is_some())
                            .filter(|m| *m != title)
                    });
                    ChargekitError::Platform { title, details }
                }
                None if (500..=599).contains(&status) => ChargekitError::Internal(format!(
                    "platform server error ({}): {}",
                    status, error_text
                )),
                None => ChargekitError::Transport(format!(
                    "platform request failed ({}): {}",
                    status, error_text
                )),
            },
        }
    }

    /// Map reqwest errors to ChargekitError.
    fn timeout_ms(&self) -> u64 {
        self.config.timeout_secs.saturating_mul(1000)
    }

    fn map_reqwest_error(&self, operation: &str, e: reqwest::Error) -> ChargekitError {
        if e.is_timeout() {
            ChargekitError::ConnectionTimeout {
                operation: format!("platform {}", operation),
                timeout_ms: self.timeout_ms(),
            }
        } else if e.is_connect() {
            ChargekitError::ConnectionFailed {
                target: self.config.api_url.clone(),
                reason: e.to_string(),
            }
        } else {
            ChargekitError::Transport(format!("platform {} failed: {}", operation, e))
        }
    }
}

#[async_trait]
impl SubscriptionPlatform for HttpPlatform {
    async fn create_or_get_wallet(
        &self,
        name: &str,
        credentials: &Credentials,
    ) -> Result<WalletInfo> {
        let builder = self.client.post(self.url("wallets")).json(&json!({ "name": name }));
        let builder = self.authenticated(builder, credentials)?;
        self.execute("create wallet", builder).await
    }

    async fn subscribe(&self, request: &SubscribeRequest) -> Result<SubscriptionInfo> {
        let body = json!({
            "owner": request.owner_address,
            "recurringCharge": request.recurring_charge_amount,
            "periodInDays": request.period_in_days,
            "testnet": request.network.is_testnet(),
        });
        let builder = self.client.post(self.url("subscriptions")).json(&body);
        self.execute("subscribe", builder).await
    }

    async fn get_status(
        &self,
        subscription_id: &str,
        network: Network,
    ) -> Result<SubscriptionStatus> {
        let builder = self
            .client
            .get(self.url(&format!("subscriptions/{}/status", subscription_id)))
            .query(&[("testnet", network.is_testnet())]);
        self.execute("get status", builder).await
    }

    async fn charge(
        &self,
        request: &ChargeRequest,
        credentials: &Credentials,
    ) -> Result<ChargeReceipt> {
        let mut body = json!({
            "amount": request.amount,
            "testnet": request.network.is_testnet(),
            "walletName": request.wallet_name,
        });
        if let Some(recipient) = &request.recipient {
            body["recipient"] = json!(recipient);
        }
        let builder = self
            .client
            .post(self.url(&format!("subscriptions/{}/charge", request.subscription_id)))
            .json(&body);
        let builder = self.authenticated(builder, credentials)?;
        self.execute("charge", builder).await
    }

    async fn revoke(
        &self,
        request: &RevokeRequest,
        credentials: &Credentials,
    ) -> Result<RevokeResult> {
        let body = json!({
            "testnet": request.network.is_testnet(),
            "walletName": request.wallet_name,
        });
        let builder = self
            .client
            .post(self.url(&format!("subscriptions/{}/revoke", request.subscription_id)))
            .json(&body);
        let builder = self.authenticated(builder, credentials)?;
        self.execute("revoke", builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> HttpPlatform {
        HttpPlatform::new(PlatformConfig::new("https://platform.example/v1/")).unwrap()
    }

    #[test]
    fn test_timeout_ms_saturates() {
        assert_eq!(platform().timeout_ms(), 30_000);

        let huge = HttpPlatform::new(
            PlatformConfig::new("https://platform.example").with_timeout(u64::MAX),
        )
        .unwrap();
        assert_eq!(huge.timeout_ms(), u64::MAX);
    }

    #[test]
    fn test_url_building() {
        assert_eq!(
            platform().url("subscriptions/0x1/status"),
            "https://platform.example/v1/subscriptions/0x1/status"
        );
    }

    #[test]
    fn test_gas_error_keeps_title() {
        let err = platform().map_status_error(
            500,
            r#"{"error":"Insufficient Gas","details":"fund 0xabc"}"#,
        );
        assert_eq!(err.to_string(), "Insufficient Gas");
        assert_eq!(err.details(), Some("fund 0xabc"));
    }

    #[test]
    fn test_message_only_body_becomes_title() {
        let err = platform().map_status_error(400, r#"{"message":"Subscription is revoked"}"#);
        assert_eq!(
            err,
            ChargekitError::Platform {
                title: "Subscription is revoked".to_string(),
                details: None
            }
        );
    }

    #[test]
    fn test_status_mapping_without_body() {
        let p = platform();
        assert!(matches!(p.map_status_error(401, ""), ChargekitError::Auth(_)));
        assert!(matches!(
            p.map_status_error(404, "missing"),
            ChargekitError::NotFound { .. }
        ));
        assert!(matches!(
            p.map_status_error(502, "bad gateway"),
            ChargekitError::Internal(_)
        ));
        assert!(matches!(
            p.map_status_error(418, "teapot"),
            ChargekitError::Transport(_)
        ));
    }
}
