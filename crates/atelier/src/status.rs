//! User-facing status messages.
//!
//! Failures never travel further than the component that triggered them:
//! they are turned into a [`Status`] on the spot and shown next to the form or
//! button that caused them.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};

/// Severity tag of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    /// Something went wrong.
    Error,
    /// The action completed.
    Success,
    /// Progress or neutral information.
    Info,
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Success => write!(f, "success"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A short message with a severity, ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    /// Severity.
    pub level: StatusLevel,
    /// Message text.
    pub message: String,
}

impl Status {
    /// An error status.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            message: message.into(),
        }
    }

    /// A success status.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Success,
            message: message.into(),
        }
    }

    /// An informational status.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            message: message.into(),
        }
    }

    /// Convert an error into an error status.
    #[must_use]
    pub fn from_error(err: &Error) -> Self {
        warn!(error = %err, "operation failed");
        Self::error(err.to_string())
    }

    /// Collapse an operation result into a status, using `success` when it
    /// went through.
    #[must_use]
    pub fn from_result<T>(result: &Result<T>, success: impl Into<String>) -> Self {
        match result {
            Ok(_) => Self::success(success),
            Err(err) => Self::from_error(err),
        }
    }

    /// Whether this status reports a failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == StatusLevel::Error
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}
