//! Chargekit Demo Core Library
//!
//! Shared client-side logic for Chargekit demo front-ends. This crate provides
//! the subscription controller, per-operation state, identity persistence and
//! the client for the demo server's `/API` endpoints.

pub mod backend;
pub mod banner;
pub mod controller;
pub mod operation;
pub mod records;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use backend::{
    BackendApi, BackendError, ChargeOutcome, HttpBackend, RevokeConfirmation, WalletCreated,
};
pub use banner::{Banner, ErrorKind, OperationError, Tone, INSUFFICIENT_GAS_TAG};
pub use controller::{
    ControllerConfig, ControllerState, OperationStates, SubscriptionController,
    DEFAULT_REFRESH_DELAY, DEFAULT_SUBSCRIPTION_AMOUNT,
};
pub use operation::{OperationKind, OperationState};
pub use records::{IdentityRecords, RECORD_VERSION, SUBSCRIPTION_KEY, WALLET_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, StoreResult};
