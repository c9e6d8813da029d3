//! Per-operation progress tracking.

use std::fmt;

use crate::banner::OperationError;

/// The five user-triggered operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Wallet,
    Subscription,
    Status,
    Charge,
    Revoke,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        Self::Wallet,
        Self::Subscription,
        Self::Status,
        Self::Charge,
        Self::Revoke,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Wallet => "wallet",
            Self::Subscription => "subscription",
            Self::Status => "status",
            Self::Charge => "charge",
            Self::Revoke => "revoke",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where one operation stands.
///
/// Each operation kind has its own state, so a failing charge never hides a
/// status fetch that succeeded at the same time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationState<T> {
    Idle,
    Pending,
    Succeeded(T),
    Failed(OperationError),
}

impl<T> Default for OperationState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> OperationState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Result of the last successful run.
    pub fn succeeded(&self) -> Option<&T> {
        match self {
            Self::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&OperationError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Short label for rendering.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}
