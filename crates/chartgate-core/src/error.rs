//! Domain validation error types.

use thiserror::Error;

/// Result type for core domain operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by domain-level validation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A policy or request scope violates its structural invariants.
    #[error("Invalid scope: {message}")]
    InvalidScope {
        /// Description of the violated invariant.
        message: String,
    },

    /// A policy duration violates its structural invariants.
    #[error("Invalid duration: {message}")]
    InvalidDuration {
        /// Description of the violated invariant.
        message: String,
    },

    /// An access request carries malformed input.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of the malformed input.
        message: String,
    },
}

impl CoreError {
    /// Creates a new `InvalidScope` error.
    #[must_use]
    pub fn invalid_scope(message: impl Into<String>) -> Self {
        Self::InvalidScope {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidDuration` error.
    #[must_use]
    pub fn invalid_duration(message: impl Into<String>) -> Self {
        Self::InvalidDuration {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_scope("type set is empty");
        assert_eq!(err.to_string(), "Invalid scope: type set is empty");

        let err = CoreError::invalid_request("reason must not be blank");
        assert_eq!(err.to_string(), "Invalid request: reason must not be blank");
    }
}
