//! Test utilities for Chargekit.
//!
//! This module provides testing infrastructure including:
//! - An in-memory platform with configurable faults
//! - Deterministic fixtures for addresses and credentials
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chargekit_lib::test_utils::{test_credentials, MockPlatform};
//!
//! let platform = MockPlatform::new();
//! let wallet = platform
//!     .create_or_get_wallet("demo", &test_credentials())
//!     .await?;
//!
//! // Make the next charge fail the way a wallet without gas does
//! platform.set_gas_exhausted(true);
//! ```

mod fixtures;
mod mock_platform;

pub use fixtures::{derive_address, derive_hash, test_credentials, TEST_WALLET_NAME};
pub use mock_platform::{MockPlatform, PlatformOp, INSUFFICIENT_GAS};
