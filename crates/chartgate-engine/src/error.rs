//! Engine error taxonomy.
//!
//! Four deterministic error families cover every failure the engine can
//! surface. A `DENIED` evaluation is never an error: denial is a legitimate
//! business answer, while [`EngineError::Unavailable`] is an outage the
//! caller must fail closed on.

use std::fmt;

use chartgate_core::CoreError;
use chartgate_storage::StorageError;

/// Errors that can occur during engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The input is malformed: scope/duration mismatch, blank reason, etc.
    ///
    /// Deterministic; the caller can correct the request and retry.
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the malformed input.
        message: String,
    },

    /// The referenced policy or request does not exist inside the tenant.
    #[error("Not found: {kind}/{id}")]
    NotFound {
        /// The kind of entity (e.g. "policy", "request").
        kind: String,
        /// The id that was looked up.
        id: String,
    },

    /// A state-machine guard failed: double-decision, revoke of an already
    /// revoked policy.
    ///
    /// Callers should treat this as "someone else already decided this" and
    /// refresh state rather than retry blindly.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting state.
        message: String,
    },

    /// A storage dependency cannot be reached.
    ///
    /// Access evaluation fails closed on this: no access is granted on
    /// infrastructure failure, and the engine performs no internal retries.
    #[error("Unavailable: {message}")]
    Unavailable {
        /// Description of the outage.
        message: String,
    },
}

impl EngineError {
    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
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

    /// Creates a new `Unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns `true` if this is a not-found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a conflict error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns `true` if this is an infrastructure outage.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Unavailable { .. } => ErrorCategory::Infrastructure,
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        Self::Validation {
            message: err.to_string(),
        }
    }
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { kind, id } => Self::NotFound { kind, id },
            StorageError::AlreadyExists { kind, id } => Self::Conflict {
                message: format!("{kind}/{id} already exists"),
            },
            StorageError::Conflict { message } => Self::Conflict { message },
            StorageError::InvalidData { message } => Self::Validation { message },
            StorageError::Unavailable { message } => Self::Unavailable { message },
        }
    }
}

/// Categories of engine errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed input.
    Validation,
    /// Unknown policy/request id within the tenant.
    NotFound,
    /// State-machine violation.
    Conflict,
    /// Storage/dependency failure.
    Infrastructure,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Infrastructure => write!(f, "infrastructure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::validation("reason must not be blank");
        assert_eq!(err.to_string(), "Validation error: reason must not be blank");

        let err = EngineError::not_found("request", "r1");
        assert_eq!(err.to_string(), "Not found: request/r1");

        let err = EngineError::conflict("request r1 is already approved");
        assert_eq!(err.to_string(), "Conflict: request r1 is already approved");
    }

    #[test]
    fn test_storage_error_mapping() {
        let err: EngineError = StorageError::not_found("policy", "pol1").into();
        assert!(err.is_not_found());

        let err: EngineError = StorageError::conflict("already decided").into();
        assert!(err.is_conflict());

        let err: EngineError = StorageError::already_exists("policy", "pol1").into();
        assert!(err.is_conflict());

        let err: EngineError = StorageError::invalid_data("bad scope").into();
        assert!(err.is_validation());

        let err: EngineError = StorageError::unavailable("connection refused").into();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_core_error_maps_to_validation() {
        let err: EngineError = CoreError::invalid_scope("empty type set").into();
        assert!(err.is_validation());
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(ErrorCategory::Infrastructure.to_string(), "infrastructure");
    }
}
