//! Testing utilities for Chargekit demo applications.
//!
//! [`MockBackend`] answers the three `/API` calls in-process by driving a
//! [`SubscriptionPlatform`](chargekit_lib::SubscriptionPlatform) directly, the
//! same way the demo server does. Pair it with
//! `chargekit_lib::test_utils::MockPlatform` to test the controller without
//! sockets.
//!
//! # Usage
//!
//! ```rust,ignore
//! use chargekit_demo_core::testing::MockBackend;
//! use chargekit_lib::test_utils::{test_credentials, MockPlatform};
//!
//! let platform = MockPlatform::new();
//! let backend = MockBackend::new(platform.clone(), test_credentials(), "demo-wallet");
//! ```

pub mod mock_backend;

pub use mock_backend::MockBackend;
