//! Access policies and their closed scope/duration/management variants.
//!
//! An [`AccessPolicy`] grants one professional read access to some breadth of
//! clinical documents inside a single tenant. Policies are never mutated in
//! place except for revocation, which is a logical delete: revoked rows stay
//! in storage so the audit history keeps its referents.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{CoreError, Result};
use crate::id::{DocumentId, DocumentType, PolicyId, ProfessionalId, TenantId};

// =============================================================================
// Policy Scope
// =============================================================================

/// The breadth of documents a policy (or request) covers.
///
/// Matching is exhaustive at every consumer, so adding a scope kind is a
/// compile-time-checked change across the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PolicyScope {
    /// Every document in the tenant.
    AllDocuments,

    /// Documents whose type is in the given (non-empty) tag set.
    DocumentsByType {
        /// The covered clinical-document-type tags.
        types: BTreeSet<DocumentType>,
    },

    /// Exactly one document.
    SpecificDocument {
        /// The covered document.
        document_id: DocumentId,
    },
}

impl PolicyScope {
    /// Creates a `DocumentsByType` scope from an iterator of type tags.
    #[must_use]
    pub fn by_types<I, T>(types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DocumentType>,
    {
        Self::DocumentsByType {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a `SpecificDocument` scope.
    #[must_use]
    pub fn specific(document_id: impl Into<DocumentId>) -> Self {
        Self::SpecificDocument {
            document_id: document_id.into(),
        }
    }

    /// Validates the structural invariants of this scope.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidScope`] if a `DocumentsByType` scope
    /// carries an empty type set.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::AllDocuments | Self::SpecificDocument { .. } => Ok(()),
            Self::DocumentsByType { types } => {
                if types.is_empty() {
                    Err(CoreError::invalid_scope(
                        "documentsByType requires a non-empty type set",
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Returns `true` if this scope covers the given document.
    #[must_use]
    pub fn matches(&self, document_id: &DocumentId, document_type: &DocumentType) -> bool {
        match self {
            Self::AllDocuments => true,
            Self::DocumentsByType { types } => types.contains(document_type),
            Self::SpecificDocument {
                document_id: covered,
            } => covered == document_id,
        }
    }

    /// Relative narrowness of this scope; higher is more specific.
    ///
    /// Used to report the most specific authorizing policy in audit trails:
    /// `SpecificDocument` > `DocumentsByType` > `AllDocuments`.
    #[must_use]
    pub fn specificity(&self) -> u8 {
        match self {
            Self::AllDocuments => 0,
            Self::DocumentsByType { .. } => 1,
            Self::SpecificDocument { .. } => 2,
        }
    }
}

// =============================================================================
// Policy Duration
// =============================================================================

/// How long a policy stays in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PolicyDuration {
    /// The policy never expires on its own; only revocation ends it.
    Indefinite,

    /// The policy lapses at `expires_at`.
    ///
    /// Expiry is lazy: expired rows are never swept, the evaluator simply
    /// treats them as absent at read time.
    Temporary {
        /// Instant after which the policy no longer matches.
        #[serde(with = "time::serde::rfc3339")]
        expires_at: OffsetDateTime,
    },
}

impl PolicyDuration {
    /// Returns `true` if the policy has lapsed as of the given instant.
    #[must_use]
    pub fn is_expired(&self, as_of: OffsetDateTime) -> bool {
        match self {
            Self::Indefinite => false,
            Self::Temporary { expires_at } => *expires_at <= as_of,
        }
    }
}

/// Caller-chosen duration for a granted policy, resolved at decision time.
///
/// An approval carries a lifetime rather than an absolute expiry so the
/// expiry is anchored to the moment the request is decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GrantDuration {
    /// Grant an indefinite policy.
    Indefinite,

    /// Grant a temporary policy lasting `lifetime` from the decision.
    Temporary {
        /// Lifetime of the granted policy.
        #[serde(with = "humantime_serde")]
        lifetime: std::time::Duration,
    },
}

impl GrantDuration {
    /// Resolves this grant into a concrete [`PolicyDuration`] anchored at
    /// the decision instant.
    #[must_use]
    pub fn resolve(&self, decided_at: OffsetDateTime) -> PolicyDuration {
        match self {
            Self::Indefinite => PolicyDuration::Indefinite,
            Self::Temporary { lifetime } => PolicyDuration::Temporary {
                expires_at: decided_at + *lifetime,
            },
        }
    }
}

// =============================================================================
// Management Type
// =============================================================================

/// How a policy came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ManagementType {
    /// System-granted, e.g. for the attending clinic of record.
    Automatic,

    /// Created as the terminal effect of an approved access request.
    ///
    /// The request workflow is the only writer able to create manual
    /// policies.
    Manual,
}

impl std::fmt::Display for ManagementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Automatic => write!(f, "automatic"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

// =============================================================================
// Access Policy
// =============================================================================

/// A grant of document access to one professional inside one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPolicy {
    /// Unique policy identifier.
    pub id: PolicyId,

    /// Tenant the policy belongs to.
    pub tenant_id: TenantId,

    /// The grantee professional.
    pub professional_id: ProfessionalId,

    /// Breadth of documents covered.
    pub scope: PolicyScope,

    /// How long the policy stays in force.
    pub duration: PolicyDuration,

    /// Whether the policy was system-granted or manually approved.
    pub management: ManagementType,

    /// When the policy was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the policy was revoked, if it has been.
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub revoked_at: Option<OffsetDateTime>,

    /// Who revoked the policy, if it has been.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub revoked_by: Option<ProfessionalId>,
}

impl AccessPolicy {
    /// Creates a new policy with a generated id and the current timestamp.
    #[must_use]
    pub fn new(
        tenant_id: TenantId,
        professional_id: ProfessionalId,
        scope: PolicyScope,
        duration: PolicyDuration,
        management: ManagementType,
    ) -> Self {
        Self {
            id: PolicyId::generate(),
            tenant_id,
            professional_id,
            scope,
            duration,
            management,
            created_at: crate::time::now_utc(),
            revoked_at: None,
            revoked_by: None,
        }
    }

    /// Validates the scope/duration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidScope`] if the scope is malformed.
    pub fn validate(&self) -> Result<()> {
        self.scope.validate()
    }

    /// Returns `true` if the policy has been logically deleted.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns `true` if the policy is neither revoked nor expired as of the
    /// given instant.
    #[must_use]
    pub fn is_active(&self, as_of: OffsetDateTime) -> bool {
        !self.is_revoked() && !self.duration.is_expired(as_of)
    }
}
