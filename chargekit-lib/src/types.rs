//! Records exchanged with the platform and with API clients.
//!
//! Field names follow the camelCase JSON used on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Amount, SUBSCRIPTION_PERIOD_DAYS};

/// Network the platform settles on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network.
    Mainnet,
    /// Test network. The demo always runs here.
    #[default]
    Testnet,
}

impl Network {
    /// Get the network name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    /// The flag the platform expects on every call.
    pub fn is_testnet(&self) -> bool {
        matches!(self, Self::Testnet)
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(format!("unknown network: {}", other)),
        }
    }
}

/// Custodial wallet provisioned by the platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    /// On-chain address of the wallet.
    pub address: String,
    /// Name the wallet was provisioned under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_name: Option<String>,
}

impl WalletInfo {
    /// Create wallet info for an address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            wallet_name: None,
        }
    }

    /// Attach the wallet name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.wallet_name = Some(name.into());
        self
    }
}

/// A recurring-charge subscription created by the payer.
///
/// Immutable once created; a new subscription gets a new identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInfo {
    /// Platform identifier of the subscription.
    pub id: String,
    /// Address of the paying account.
    pub payer_address: String,
    /// Maximum amount chargeable per period.
    pub recurring_charge_amount: Amount,
    /// Period length in days.
    pub period_in_days: u32,
}

/// Live subscription state as reported by the platform.
///
/// Never derived locally and never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    /// Whether the subscription can currently be charged.
    pub is_subscribed: bool,
    /// Allowance left in the current period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_charge_in_period: Option<Amount>,
    /// Start of the next period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_period_start: Option<DateTime<Utc>>,
    /// Address allowed to charge (the server wallet).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Address being charged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

/// Result of a successful platform charge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeReceipt {
    /// Transaction identifier (hash).
    pub id: String,
    /// Amount charged.
    pub amount: Amount,
    /// Wallet that executed the charge.
    pub subscription_owner: String,
    /// Subscription charged.
    pub subscription_id: String,
    /// Where the funds went, if not the owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

/// Raw revoke result, passed through untouched.
pub type RevokeResult = serde_json::Value;

/// Parameters of a client-side subscribe call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscribeRequest {
    /// Wallet allowed to charge the subscription.
    pub owner_address: String,
    /// Allowance per period.
    pub recurring_charge_amount: Amount,
    /// Period length in days.
    pub period_in_days: u32,
    /// Network to subscribe on.
    pub network: Network,
}

impl SubscribeRequest {
    /// Create a subscribe request with the standard 30-day period on testnet.
    pub fn new(owner_address: impl Into<String>, recurring_charge_amount: Amount) -> Self {
        Self {
            owner_address: owner_address.into(),
            recurring_charge_amount,
            period_in_days: SUBSCRIPTION_PERIOD_DAYS,
            network: Network::default(),
        }
    }

    /// Set the period length.
    pub fn with_period(mut self, days: u32) -> Self {
        self.period_in_days = days;
        self
    }

    /// Set the network.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }
}

/// Parameters of a server-side charge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChargeRequest {
    /// Subscription to charge.
    pub subscription_id: String,
    /// Amount to charge.
    pub amount: Amount,
    /// Network of the subscription.
    pub network: Network,
    /// Server wallet executing the charge.
    pub wallet_name: String,
    /// Optional recipient of the funds.
    pub recipient: Option<String>,
}

/// Parameters of a server-side revoke.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevokeRequest {
    /// Subscription to cancel.
    pub subscription_id: String,
    /// Network of the subscription.
    pub network: Network,
    /// Server wallet owning the subscription.
    pub wallet_name: String,
}
