//! Deterministic test fixtures.

use sha2::{Digest, Sha256};

use crate::Credentials;

/// Wallet name used throughout the test suites.
pub const TEST_WALLET_NAME: &str = "chargekit-test-wallet";

/// Credentials accepted by [`super::MockPlatform`].
pub fn test_credentials() -> Credentials {
    Credentials::new("test-key-id", "test-key-secret", "test-wallet-secret")
}

/// Derive a 32-byte hex hash (`0x` prefixed) from a seed string.
pub fn derive_hash(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    format!("0x{}", hex::encode(digest))
}

/// Derive a 20-byte hex address (`0x` prefixed) from a seed string.
///
/// The same seed always yields the same address.
pub fn derive_address(seed: &str) -> String {
    let digest = Sha256::digest(format!("address:{}", seed).as_bytes());
    format!("0x{}", hex::encode(&digest[..20]))
}
