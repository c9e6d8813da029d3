//! Error types for Chargekit operations.
//!
//! Every failure that crosses the platform boundary ends up here. Platform
//! rejections keep the platform's own wording so it can be forwarded verbatim
//! to API clients.

use std::fmt;

/// Error codes for logs and API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ChargekitErrorCode {
    /// Transport/network layer error
    Transport = 2000,
    /// Connection failed
    ConnectionFailed = 2001,
    /// Connection timeout
    ConnectionTimeout = 2002,
    /// Authentication/authorization error
    Auth = 3000,
    /// Wallet or subscription not found
    NotFound = 4000,
    /// Invalid request/data
    InvalidData = 5000,
    /// Serialization error
    Serialization = 5002,
    /// The platform rejected the operation
    Platform = 6000,
    /// Internal/unexpected error
    Internal = 9999,
}

/// Comprehensive error type for Chargekit operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargekitError {
    /// Transport/network layer error.
    Transport(String),

    /// Connection failed.
    ConnectionFailed {
        /// Target endpoint or service
        target: String,
        /// Underlying error message
        reason: String,
    },

    /// Connection timeout.
    ConnectionTimeout {
        /// Operation that timed out
        operation: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Credentials missing or refused.
    Auth(String),

    /// Resource not found.
    NotFound {
        /// Type of resource (e.g., "subscription", "wallet")
        resource_type: String,
        /// Resource identifier
        identifier: String,
    },

    /// Invalid data provided by the caller.
    InvalidData {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Serialization/deserialization error.
    Serialization(String),

    /// The platform refused or failed the operation.
    ///
    /// `title` is the platform's short error text (e.g. `"Insufficient Gas"`)
    /// and is displayed unchanged.
    Platform {
        /// Platform error title
        title: String,
        /// Optional longer explanation from the platform
        details: Option<String>,
    },

    /// Internal/unexpected error.
    Internal(String),
}

impl ChargekitError {
    /// Get the error code.
    pub fn code(&self) -> ChargekitErrorCode {
        match self {
            Self::Transport(_) => ChargekitErrorCode::Transport,
            Self::ConnectionFailed { .. } => ChargekitErrorCode::ConnectionFailed,
            Self::ConnectionTimeout { .. } => ChargekitErrorCode::ConnectionTimeout,
            Self::Auth(_) => ChargekitErrorCode::Auth,
            Self::NotFound { .. } => ChargekitErrorCode::NotFound,
            Self::InvalidData { .. } => ChargekitErrorCode::InvalidData,
            Self::Serialization(_) => ChargekitErrorCode::Serialization,
            Self::Platform { .. } => ChargekitErrorCode::Platform,
            Self::Internal(_) => ChargekitErrorCode::Internal,
        }
    }

    /// Optional details supplied by the platform.
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Platform { details, .. } => details.as_deref(),
            _ => None,
        }
    }

    /// Returns true if the caller sent something unusable (maps to a 4xx).
    ///
    /// Everything else, platform rejections included, is a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidData { .. })
    }

    /// Create a platform rejection.
    pub fn platform(title: impl Into<String>, details: Option<String>) -> Self {
        Self::Platform {
            title: title.into(),
            details,
        }
    }

    /// Create a not found error.
    pub fn not_found(resource_type: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ChargekitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::ConnectionFailed { target, reason } => {
                write!(f, "connection to {} failed: {}", target, reason)
            }
            Self::ConnectionTimeout {
                operation,
                timeout_ms,
            } => {
                write!(f, "{} timed out after {}ms", operation, timeout_ms)
            }
            Self::Auth(msg) => write!(f, "authentication error: {}", msg),
            Self::NotFound {
                resource_type,
                identifier,
            } => {
                write!(f, "{} not found: {}", resource_type, identifier)
            }
            Self::InvalidData { field, reason } => {
                write!(f, "invalid {}: {}", field, reason)
            }
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
            Self::Platform { title, .. } => write!(f, "{}", title),
            Self::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for ChargekitError {}

impl From<serde_json::Error> for ChargekitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_title_is_verbatim() {
        let err = ChargekitError::platform(
            "Insufficient Gas",
            Some("wallet 0xabc cannot pay for gas".to_string()),
        );
        assert_eq!(err.to_string(), "Insufficient Gas");
        assert_eq!(err.details(), Some("wallet 0xabc cannot pay for gas"));
        assert_eq!(err.code(), ChargekitErrorCode::Platform);
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_error_display() {
        let err = ChargekitError::ConnectionTimeout {
            operation: "platform charge".to_string(),
            timeout_ms: 30_000,
        };
        assert_eq!(err.to_string(), "platform charge timed out after 30000ms");
        assert_eq!(err.details(), None);
    }

    #[test]
    fn test_helper_constructors() {
        let err = ChargekitError::not_found("subscription", "0x01");
        assert_eq!(err.code(), ChargekitErrorCode::NotFound);

        let err = ChargekitError::invalid_data("subscriptionId", "is required");
        assert_eq!(err.code(), ChargekitErrorCode::InvalidData);
        assert!(err.is_client_error());
    }
}
