//! Client for the demo server's `/API` endpoints.
//!
//! Wallet, charge and revoke go through the server because they need the
//! server wallet's credentials. [`BackendApi`] is the seam the controller uses;
//! [`HttpBackend`] is the reqwest implementation.

use std::time::Duration;

use async_trait::async_trait;
use chargekit_lib::{Amount, WalletInfo};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

/// Failure talking to the demo server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Non-2xx response carrying an `error` field.
    #[error("{error}")]
    Rejected {
        status: u16,
        error: String,
        details: Option<String>,
    },
    /// Non-2xx response without an `error` field.
    #[error("Request failed with status {status}")]
    Unstructured { status: u16, body: String },
    #[error("Could not reach the server: {0}")]
    Transport(String),
    #[error("Unexpected server response: {0}")]
    Decode(String),
}

/// Response of `POST /API/create-wallet`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletCreated {
    pub address: String,
    #[serde(default)]
    pub wallet_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl WalletCreated {
    pub fn wallet_info(&self) -> WalletInfo {
        WalletInfo {
            address: self.address.clone(),
            wallet_name: self.wallet_name.clone(),
        }
    }
}

/// Response of `POST /API/charge-subscription`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeOutcome {
    pub transaction_hash: String,
    pub amount: Amount,
    pub subscription_owner: String,
    #[serde(default)]
    pub message: Option<String>,
    pub subscription_id: String,
    #[serde(default)]
    pub recipient: Option<String>,
}

/// Response of `POST /API/revoke-subscription`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeConfirmation {
    pub subscription_id: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub revoke_result: Value,
}

/// The three server-side operations.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn create_wallet(&self) -> Result<WalletCreated, BackendError>;

    async fn charge_subscription(
        &self,
        subscription_id: &str,
        amount: &Amount,
        recipient: Option<&str>,
    ) -> Result<ChargeOutcome, BackendError>;

    async fn revoke_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<RevokeConfirmation, BackendError>;
}

/// JSON client for a running demo server.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| BackendError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/API/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, BackendError> {
        let mut builder = self.client.post(self.url(path));
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        tracing::debug!(path, "backend request");

        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::map_status_error(status.as_u16(), text));
        }

        serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn map_status_error(status: u16, body: String) -> BackendError {
        let parsed: Option<Value> = serde_json::from_str(&body).ok();
        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        match field("error") {
            Some(error) => BackendError::Rejected {
                status,
                error,
                details: field("details"),
            },
            None => BackendError::Unstructured { status, body },
        }
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn create_wallet(&self) -> Result<WalletCreated, BackendError> {
        self.post("create-wallet", None).await
    }

    async fn charge_subscription(
        &self,
        subscription_id: &str,
        amount: &Amount,
        recipient: Option<&str>,
    ) -> Result<ChargeOutcome, BackendError> {
        let mut body = json!({
            "subscriptionId": subscription_id,
            "amount": amount,
        });
        if let Some(recipient) = recipient {
            body["recipient"] = json!(recipient);
        }
        self.post("charge-subscription", Some(body)).await
    }

    async fn revoke_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<RevokeConfirmation, BackendError> {
        self.post(
            "revoke-subscription",
            Some(json!({ "subscriptionId": subscription_id })),
        )
        .await
    }
}
