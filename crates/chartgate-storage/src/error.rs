//! Storage error types for the ChartGate storage abstraction layer.
//!
//! This module defines all error types that can occur during storage
//! operations.

use std::fmt;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested row was not found inside the tenant.
    #[error("Not found: {kind}/{id}")]
    NotFound {
        /// The kind of row that was not found (e.g. "policy", "request").
        kind: String,
        /// The id of the row that was not found.
        id: String,
    },

    /// Attempted to create a row that already exists.
    #[error("Already exists: {kind}/{id}")]
    AlreadyExists {
        /// The kind of row that already exists.
        kind: String,
        /// The id of the row that already exists.
        id: String,
    },

    /// A compare-and-set guard failed: the row is no longer in the state the
    /// write was conditioned on.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting state.
        message: String,
    },

    /// The row data is invalid.
    #[error("Invalid data: {message}")]
    InvalidData {
        /// Description of why the data is invalid.
        message: String,
    },

    /// The backing storage cannot be reached.
    ///
    /// Callers evaluating access must treat this as a denial (fail-closed).
    #[error("Storage unavailable: {message}")]
    Unavailable {
        /// Description of the outage.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidData` error.
    #[must_use]
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Creates a new `Unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not-found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a conflict or already-exists error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::AlreadyExists { .. })
    }

    /// Returns `true` if the backing storage is unreachable.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::AlreadyExists { .. } | Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::InvalidData { .. } => ErrorCategory::Validation,
            Self::Unavailable { .. } => ErrorCategory::Infrastructure,
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Row not found.
    NotFound,
    /// Conflict (state-machine guard or existence).
    Conflict,
    /// Validation error.
    Validation,
    /// Infrastructure/connection error.
    Infrastructure,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::not_found("policy", "pol1");
        assert_eq!(err.to_string(), "Not found: policy/pol1");

        let err = StorageError::conflict("request already decided");
        assert_eq!(err.to_string(), "Conflict: request already decided");

        let err = StorageError::unavailable("connection refused");
        assert_eq!(err.to_string(), "Storage unavailable: connection refused");
    }

    #[test]
    fn test_error_predicates() {
        let err = StorageError::not_found("policy", "pol1");
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
        assert!(!err.is_unavailable());

        let err = StorageError::already_exists("policy", "pol1");
        assert!(err.is_conflict());

        let err = StorageError::conflict("already revoked");
        assert!(err.is_conflict());

        let err = StorageError::unavailable("down");
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            StorageError::not_found("request", "r1").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            StorageError::conflict("decided").category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            StorageError::invalid_data("bad scope").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            StorageError::unavailable("down").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(ErrorCategory::Conflict.to_string(), "conflict");
    }
}
