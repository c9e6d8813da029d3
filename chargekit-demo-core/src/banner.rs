//! Operation errors and the banner shown after each operation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::operation::OperationKind;

/// Error title the platform uses when the server wallet cannot pay for gas.
pub const INSUFFICIENT_GAS_TAG: &str = "Insufficient Gas";

/// How a structured failure should be presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// The server wallet needs funding.
    Gas,
    Error,
}

impl ErrorKind {
    /// Classify a failure by the error tag the backend returned.
    ///
    /// Exact, case-sensitive match on the platform's title. The platform offers
    /// no error codes, so this is a best-effort hint and may need updating if
    /// the platform rewords the message.
    pub fn from_tag(tag: &str) -> Self {
        if tag == INSUFFICIENT_GAS_TAG {
            Self::Gas
        } else {
            Self::Error
        }
    }
}

/// Why an operation failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationError {
    /// Plain failure message.
    Message(String),
    /// Failure with a recognised error tag.
    Structured {
        title: String,
        message: String,
        details: Option<String>,
        kind: ErrorKind,
    },
}

impl OperationError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn structured(
        title: impl Into<String>,
        message: impl Into<String>,
        details: Option<String>,
        kind: ErrorKind,
    ) -> Self {
        Self::Structured {
            title: title.into(),
            message: message.into(),
            details,
            kind,
        }
    }

    /// `Error` for plain messages.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Message(_) => ErrorKind::Error,
            Self::Structured { kind, .. } => *kind,
        }
    }

    pub fn is_gas(&self) -> bool {
        self.kind() == ErrorKind::Gas
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(message) => f.write_str(message),
            Self::Structured { title, message, .. } if message.is_empty() => f.write_str(title),
            Self::Structured { title, message, .. } => write!(f, "{}: {}", title, message),
        }
    }
}

impl std::error::Error for OperationError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tone {
    Success(String),
    Failure(OperationError),
}

/// Most recent outcome shown to the user. Latest wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Banner {
    pub operation: OperationKind,
    pub tone: Tone,
}

impl Banner {
    pub fn success(operation: OperationKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            tone: Tone::Success(message.into()),
        }
    }

    pub fn failure(operation: OperationKind, error: OperationError) -> Self {
        Self {
            operation,
            tone: Tone::Failure(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.tone, Tone::Success(_))
    }

    pub fn error(&self) -> Option<&OperationError> {
        match &self.tone {
            Tone::Failure(err) => Some(err),
            Tone::Success(_) => None,
        }
    }

    pub fn text(&self) -> String {
        match &self.tone {
            Tone::Success(message) => message.clone(),
            Tone::Failure(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_tag_is_exact() {
        assert_eq!(ErrorKind::from_tag("Insufficient Gas"), ErrorKind::Gas);
        assert_eq!(ErrorKind::from_tag("insufficient gas"), ErrorKind::Error);
        assert_eq!(ErrorKind::from_tag("Insufficient Gas!"), ErrorKind::Error);
        assert_eq!(ErrorKind::from_tag(""), ErrorKind::Error);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ErrorKind::Gas).unwrap(), "\"gas\"");
        assert_eq!(serde_json::to_string(&ErrorKind::Error).unwrap(), "\"error\"");
    }

    #[test]
    fn test_display() {
        let err = OperationError::structured(
            "Insufficient Gas",
            "Fund 0xabc",
            None,
            ErrorKind::Gas,
        );
        assert_eq!(err.to_string(), "Insufficient Gas: Fund 0xabc");
        assert!(err.is_gas());

        let banner = Banner::failure(OperationKind::Charge, OperationError::message("boom"));
        assert!(!banner.is_success());
        assert_eq!(banner.text(), "boom");
    }
}
