//! Chargekit library.
//!
//! This crate intentionally stays stateless. Wallet custody, subscription
//! accounting and on-chain settlement belong to an external platform, which
//! callers reach through the [`SubscriptionPlatform`] capability trait.
//!
//! # Features
//!
//! - **Data model**: wallet, subscription and status records with the camelCase
//!   JSON shape shared by the demo server and its clients
//! - **Fixed-point amounts**: [`Amount`] never touches floating point
//! - **Platform abstraction**: [`SubscriptionPlatform`] with an HTTP
//!   implementation ([`HttpPlatform`], feature `http-platform`) and an in-memory
//!   double (`test_utils::MockPlatform`, feature `test-utils`)
//!
//! # Example
//!
//! ```ignore
//! use chargekit_lib::{Amount, Network, SubscribeRequest, SubscriptionPlatform};
//! use chargekit_lib::platform::{HttpPlatform, PlatformConfig};
//!
//! let platform = HttpPlatform::new(PlatformConfig::new("https://platform.example/v1"))?;
//! let info = platform
//!     .subscribe(&SubscribeRequest::new("0xowner", Amount::from_str_checked("19.99")?))
//!     .await?;
//! let status = platform.get_status(&info.id, Network::Testnet).await?;
//! assert!(status.is_subscribed);
//! ```

pub mod amount;
pub mod errors;
pub mod platform;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use amount::Amount;
pub use errors::{ChargekitError, ChargekitErrorCode};
pub use platform::{Credentials, PlatformConfig, SubscriptionPlatform};
#[cfg(feature = "http-platform")]
pub use platform::HttpPlatform;
pub use types::{
    ChargeReceipt, ChargeRequest, Network, RevokeRequest, RevokeResult, SubscribeRequest,
    SubscriptionInfo, SubscriptionStatus, WalletInfo,
};

/// Convenience alias for fallible Chargekit operations.
pub type Result<T> = std::result::Result<T, ChargekitError>;

/// Amount charged when a charge request does not name one.
pub const DEFAULT_CHARGE_AMOUNT: &str = "1.00";

/// Length of one subscription period.
pub const SUBSCRIPTION_PERIOD_DAYS: u32 = 30;

/// Name of the server wallet when none is configured.
pub const DEFAULT_WALLET_NAME: &str = "chargekit-demo-wallet";
