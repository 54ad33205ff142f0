//! Typed identifiers for ChartGate entities.
//!
//! Every entity identifier is a distinct newtype so that a professional id
//! can never be passed where a tenant id is expected. Identifiers serialize
//! transparently as plain strings.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from an existing value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generates a new random (UUID v4) identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

identifier! {
    /// Identifier of an isolated clinic/organization partition.
    ///
    /// Established by the authenticated caller context, never inferred from
    /// payload data.
    TenantId
}

identifier! {
    /// Identifier of a healthcare professional within a tenant.
    ProfessionalId
}

identifier! {
    /// Identifier of a clinical document.
    DocumentId
}

identifier! {
    /// Identifier of an [`AccessPolicy`](crate::policy::AccessPolicy).
    PolicyId
}

identifier! {
    /// Identifier of an [`AccessRequest`](crate::request::AccessRequest).
    RequestId
}

/// Clinical-document-type tag (e.g. `LAB_RESULT`, `RADIOLOGY`).
///
/// Document types form an open set maintained by the document catalog, so
/// this is a tag newtype rather than a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentType(String);

impl DocumentType {
    /// Creates a document type tag.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentType {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for DocumentType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = PolicyId::generate();
        let b = PolicyId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_identifier_display() {
        let tenant = TenantId::new("clinic-nord");
        assert_eq!(tenant.to_string(), "clinic-nord");
        assert_eq!(tenant.as_str(), "clinic-nord");
    }

    #[test]
    fn test_identifier_serializes_transparently() {
        let id = DocumentId::new("doc123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"doc123\"");

        let back: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
