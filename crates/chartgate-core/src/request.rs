//! Manual access requests and their approval state machine.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{CoreError, Result};
use crate::id::{ProfessionalId, RequestId, TenantId};
use crate::policy::PolicyScope;

/// State of an access request.
///
/// `Pending` is the only non-terminal state: a request transitions exactly
/// once, to either `Approved` or `Rejected`, and no transition ever leaves a
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved; exactly one manual policy was created for it.
    Approved,
    /// Rejected; no policy was created.
    Rejected,
}

impl RequestStatus {
    /// Returns `true` if no further transition is possible from this state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// A professional-initiated ask for document access.
///
/// Approval is the only path that creates
/// [`ManagementType::Manual`](crate::policy::ManagementType::Manual)
/// policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    /// Unique request identifier.
    pub id: RequestId,

    /// Tenant the request belongs to.
    pub tenant_id: TenantId,

    /// The professional asking for access.
    pub professional_id: ProfessionalId,

    /// Breadth of documents asked for; same shape as a policy scope.
    pub scope: PolicyScope,

    /// Free-text justification.
    pub reason: String,

    /// Current state.
    pub status: RequestStatus,

    /// When the request was submitted.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Who decided the request; set only on the transition out of `Pending`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub decided_by: Option<ProfessionalId>,

    /// When the request was decided; set only on the transition out of
    /// `Pending`.
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub decided_at: Option<OffsetDateTime>,
}

impl AccessRequest {
    /// Creates a new pending request with a generated id and the current
    /// timestamp.
    #[must_use]
    pub fn new(
        tenant_id: TenantId,
        professional_id: ProfessionalId,
        scope: PolicyScope,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: RequestId::generate(),
            tenant_id,
            professional_id,
            scope,
            reason: reason.into(),
            status: RequestStatus::Pending,
            created_at: crate::time::now_utc(),
            decided_by: None,
            decided_at: None,
        }
    }

    /// Validates scope and reason.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidScope`] for a malformed scope and
    /// [`CoreError::InvalidRequest`] for a blank reason.
    pub fn validate(&self) -> Result<()> {
        self.scope.validate()?;
        if self.reason.trim().is_empty() {
            return Err(CoreError::invalid_request("reason must not be blank"));
        }
        Ok(())
    }

    /// Returns `true` if the request is still awaiting a decision.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}
