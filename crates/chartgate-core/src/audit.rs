//! Append-only audit events.
//!
//! Every access evaluation and every workflow transition yields exactly one
//! permanent audit row. Rows are keyed `(tenant, timestamp, sequence)` and
//! are never updated or deleted; corrections are modeled as new compensating
//! events.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::id::{DocumentId, DocumentType, PolicyId, ProfessionalId, RequestId, TenantId};
use crate::policy::ManagementType;

/// Outcome of a single access evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessOutcome {
    /// A matching active policy authorized the access.
    Allowed,
    /// No active policy matched. Denial is a legitimate business answer,
    /// not an error.
    Denied,
}

impl std::fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allowed => write!(f, "allowed"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

/// What happened, for one audit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AuditEventKind {
    /// An access evaluation was rendered, allowed or denied.
    AccessEvaluated {
        /// The professional attempting access.
        professional_id: ProfessionalId,
        /// The document being accessed.
        document_id: DocumentId,
        /// The document's clinical type tag.
        document_type: DocumentType,
        /// The rendered outcome.
        outcome: AccessOutcome,
        /// The most specific authorizing policy; absent on denial.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        matched_policy_id: Option<PolicyId>,
    },

    /// A policy was created, directly or through an approval.
    PolicyCreated {
        /// The created policy.
        policy_id: PolicyId,
        /// The grantee professional.
        professional_id: ProfessionalId,
        /// Whether the policy was system-granted or manually approved.
        management: ManagementType,
    },

    /// A policy was logically deleted.
    PolicyRevoked {
        /// The revoked policy.
        policy_id: PolicyId,
        /// Who revoked it.
        actor_id: ProfessionalId,
    },

    /// A manual access request was submitted.
    RequestCreated {
        /// The new request.
        request_id: RequestId,
        /// The requesting professional.
        professional_id: ProfessionalId,
    },

    /// A pending request was approved.
    RequestApproved {
        /// The decided request.
        request_id: RequestId,
        /// Who approved it.
        actor_id: ProfessionalId,
        /// The manual policy the approval created.
        policy_id: PolicyId,
    },

    /// A pending request was rejected.
    RequestRejected {
        /// The decided request.
        request_id: RequestId,
        /// Who rejected it.
        actor_id: ProfessionalId,
        /// Free-text rationale for the rejection.
        rationale: String,
    },
}

impl AuditEventKind {
    /// Stable label for this event kind, used in logs and filters.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::AccessEvaluated { .. } => "access.evaluated",
            Self::PolicyCreated { .. } => "policy.created",
            Self::PolicyRevoked { .. } => "policy.revoked",
            Self::RequestCreated { .. } => "request.created",
            Self::RequestApproved { .. } => "request.approved",
            Self::RequestRejected { .. } => "request.rejected",
        }
    }

    /// The professional this event is about: the subject of an evaluation or
    /// grant, or the actor of a decision.
    #[must_use]
    pub fn professional_id(&self) -> &ProfessionalId {
        match self {
            Self::AccessEvaluated {
                professional_id, ..
            }
            | Self::PolicyCreated {
                professional_id, ..
            }
            | Self::RequestCreated {
                professional_id, ..
            } => professional_id,
            Self::PolicyRevoked { actor_id, .. }
            | Self::RequestApproved { actor_id, .. }
            | Self::RequestRejected { actor_id, .. } => actor_id,
        }
    }

    /// The document involved, for evaluation events.
    #[must_use]
    pub fn document_id(&self) -> Option<&DocumentId> {
        match self {
            Self::AccessEvaluated { document_id, .. } => Some(document_id),
            _ => None,
        }
    }

    /// The rendered outcome, for evaluation events.
    #[must_use]
    pub fn outcome(&self) -> Option<AccessOutcome> {
        match self {
            Self::AccessEvaluated { outcome, .. } => Some(*outcome),
            _ => None,
        }
    }
}

/// One permanent audit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// Tenant the event belongs to.
    pub tenant_id: TenantId,

    /// Per-tenant monotonic sequence number; orders the history
    /// deterministically even under concurrent writers.
    pub sequence: u64,

    /// When the event was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,

    /// What happened.
    #[serde(flatten)]
    pub kind: AuditEventKind,
}

impl AuditEvent {
    /// Creates a sequence-stamped audit row.
    #[must_use]
    pub fn new(
        tenant_id: TenantId,
        sequence: u64,
        recorded_at: OffsetDateTime,
        kind: AuditEventKind,
    ) -> Self {
        Self {
            tenant_id,
            sequence,
            recorded_at,
            kind,
        }
    }
}
