//! Manual access request workflow.
//!
//! A request is `Pending` until exactly one decision lands on it. Approval
//! atomically creates the granted manual policy; rejection creates nothing.
//! Concurrent deciders are serialized by the storage compare-and-set: one
//! wins, the rest receive a conflict.

use std::sync::Arc;

use chartgate_core::{
    AccessPolicy, AccessRequest, AuditEventKind, GrantDuration, ManagementType, PolicyScope,
    ProfessionalId, RequestId, TenantId, now_utc,
};
use chartgate_storage::{AuditStorage, RequestStorage};

use crate::EngineResult;
use crate::error::EngineError;

/// The approval state machine over access requests.
pub struct RequestWorkflow {
    requests: Arc<dyn RequestStorage>,
    audit: Arc<dyn AuditStorage>,
}

impl RequestWorkflow {
    /// Creates a workflow over the given storage handles.
    #[must_use]
    pub fn new(requests: Arc<dyn RequestStorage>, audit: Arc<dyn AuditStorage>) -> Self {
        Self { requests, audit }
    }

    /// Submits a new pending request.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] on a malformed scope or blank
    /// reason.
    pub async fn submit(
        &self,
        tenant_id: TenantId,
        professional_id: ProfessionalId,
        scope: PolicyScope,
        reason: impl Into<String>,
    ) -> EngineResult<AccessRequest> {
        let request = AccessRequest::new(tenant_id, professional_id, scope, reason);
        request.validate()?;

        let created = self.requests.create(&request).await?;
        self.audit
            .append(
                &created.tenant_id,
                AuditEventKind::RequestCreated {
                    request_id: created.id.clone(),
                    professional_id: created.professional_id.clone(),
                },
                created.created_at,
            )
            .await?;
        tracing::info!(
            tenant_id = %created.tenant_id,
            request_id = %created.id,
            professional_id = %created.professional_id,
            "Access request submitted"
        );
        Ok(created)
    }

    /// Approves a pending request.
    ///
    /// Sets `decided_by`/`decided_at`, and atomically creates exactly one
    /// manual policy mirroring the request's scope with the caller-chosen
    /// duration resolved at decision time. The status transition and the
    /// policy write are a single storage unit: neither is observable without
    /// the other.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for an unknown request and
    /// [`EngineError::Conflict`] if the request is no longer pending —
    /// at most one decision ever succeeds per request.
    pub async fn approve(
        &self,
        tenant_id: &TenantId,
        request_id: &RequestId,
        actor_id: &ProfessionalId,
        granted_duration: GrantDuration,
    ) -> EngineResult<(AccessRequest, AccessPolicy)> {
        // The scope is immutable after submission, so it can be read before
        // the compare-and-set; only `status` is guarded.
        let request = self
            .requests
            .get(tenant_id, request_id)
            .await?
            .ok_or_else(|| EngineError::not_found("request", request_id.as_str()))?;

        let decided_at = now_utc();
        let granted = AccessPolicy::new(
            tenant_id.clone(),
            request.professional_id.clone(),
            request.scope.clone(),
            granted_duration.resolve(decided_at),
            ManagementType::Manual,
        );

        let (approved, policy) = self
            .requests
            .approve(tenant_id, request_id, actor_id, decided_at, granted)
            .await?;

        self.audit
            .append(
                tenant_id,
                AuditEventKind::RequestApproved {
                    request_id: approved.id.clone(),
                    actor_id: actor_id.clone(),
                    policy_id: policy.id.clone(),
                },
                decided_at,
            )
            .await?;
        self.audit
            .append(
                tenant_id,
                AuditEventKind::PolicyCreated {
                    policy_id: policy.id.clone(),
                    professional_id: policy.professional_id.clone(),
                    management: policy.management,
                },
                decided_at,
            )
            .await?;
        tracing::info!(
            tenant_id = %tenant_id,
            request_id = %request_id,
            actor_id = %actor_id,
            policy_id = %policy.id,
            "Access request approved"
        );
        Ok((approved, policy))
    }

    /// Rejects a pending request. No policy is created.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for a blank rationale,
    /// [`EngineError::NotFound`] for an unknown request and
    /// [`EngineError::Conflict`] if the request is no longer pending.
    pub async fn reject(
        &self,
        tenant_id: &TenantId,
        request_id: &RequestId,
        actor_id: &ProfessionalId,
        rationale: impl Into<String>,
    ) -> EngineResult<AccessRequest> {
        let rationale = rationale.into();
        if rationale.trim().is_empty() {
            return Err(EngineError::validation("rationale must not be blank"));
        }

        let decided_at = now_utc();
        let rejected = self
            .requests
            .reject(tenant_id, request_id, actor_id, decided_at)
            .await?;

        self.audit
            .append(
                tenant_id,
                AuditEventKind::RequestRejected {
                    request_id: rejected.id.clone(),
                    actor_id: actor_id.clone(),
                    rationale,
                },
                decided_at,
            )
            .await?;
        tracing::info!(
            tenant_id = %tenant_id,
            request_id = %request_id,
            actor_id = %actor_id,
            "Access request rejected"
        );
        Ok(rejected)
    }

    /// Reads a request by id, tenant-scoped.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the request does not exist in
    /// the tenant.
    pub async fn get(
        &self,
        tenant_id: &TenantId,
        request_id: &RequestId,
    ) -> EngineResult<AccessRequest> {
        self.requests
            .get(tenant_id, request_id)
            .await?
            .ok_or_else(|| EngineError::not_found("request", request_id.as_str()))
    }

    /// Lists pending requests in FIFO review order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unavailable`] on storage failure.
    pub async fn list_pending(&self, tenant_id: &TenantId) -> EngineResult<Vec<AccessRequest>> {
        Ok(self.requests.list_pending(tenant_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartgate_core::{PolicyDuration, RequestStatus};
    use chartgate_db_memory::MemoryStorage;
    use chartgate_storage::AuditFilter;

    fn workflow() -> (RequestWorkflow, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let workflow = RequestWorkflow::new(storage.clone(), storage.clone());
        (workflow, storage)
    }

    fn tenant() -> TenantId {
        TenantId::new("t1")
    }

    #[tokio::test]
    async fn test_submit_validates_and_audits() {
        let (workflow, storage) = workflow();

        let err = workflow
            .submit(
                tenant(),
                ProfessionalId::new("p1"),
                PolicyScope::by_types(["LAB_RESULT"]),
                "   ",
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let request = workflow
            .submit(
                tenant(),
                ProfessionalId::new("p1"),
                PolicyScope::by_types(["LAB_RESULT"]),
                "f/u",
            )
            .await
            .unwrap();
        assert!(request.is_pending());

        let events = storage
            .query(&tenant(), &AuditFilter::new().with_kind("request.created"))
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_approve_resolves_duration_at_decision_time() {
        let (workflow, _) = workflow();
        let request = workflow
            .submit(
                tenant(),
                ProfessionalId::new("p1"),
                PolicyScope::by_types(["LAB_RESULT"]),
                "f/u",
            )
            .await
            .unwrap();

        let thirty_days = std::time::Duration::from_secs(30 * 24 * 3600);
        let (approved, policy) = workflow
            .approve(
                &tenant(),
                &request.id,
                &ProfessionalId::new("admin"),
                GrantDuration::Temporary {
                    lifetime: thirty_days,
                },
            )
            .await
            .unwrap();

        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(policy.management, ManagementType::Manual);
        assert_eq!(policy.scope, request.scope);
        let decided_at = approved.decided_at.unwrap();
        assert_eq!(
            policy.duration,
            PolicyDuration::Temporary {
                expires_at: decided_at + thirty_days,
            }
        );
    }

    #[tokio::test]
    async fn test_second_decision_conflicts_and_creates_no_policy() {
        let (workflow, storage) = workflow();
        let request = workflow
            .submit(
                tenant(),
                ProfessionalId::new("p1"),
                PolicyScope::by_types(["LAB_RESULT"]),
                "f/u",
            )
            .await
            .unwrap();
        let admin = ProfessionalId::new("admin");

        workflow
            .approve(&tenant(), &request.id, &admin, GrantDuration::Indefinite)
            .await
            .unwrap();

        let err = workflow
            .approve(&tenant(), &request.id, &admin, GrantDuration::Indefinite)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let err = workflow
            .reject(&tenant(), &request.id, &admin, "late")
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let created_events = storage
            .query(&tenant(), &AuditFilter::new().with_kind("policy.created"))
            .await
            .unwrap();
        assert_eq!(created_events.len(), 1);
    }

    #[tokio::test]
    async fn test_reject_creates_no_policy() {
        let (workflow, storage) = workflow();
        let request = workflow
            .submit(
                tenant(),
                ProfessionalId::new("p1"),
                PolicyScope::specific("doc123"),
                "f/u",
            )
            .await
            .unwrap();
        let admin = ProfessionalId::new("admin");

        let err = workflow
            .reject(&tenant(), &request.id, &admin, "  ")
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let rejected = workflow
            .reject(&tenant(), &request.id, &admin, "insufficient justification")
            .await
            .unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);
        assert_eq!(rejected.decided_by, Some(admin));

        let created_events = storage
            .query(&tenant(), &AuditFilter::new().with_kind("policy.created"))
            .await
            .unwrap();
        assert!(created_events.is_empty());
        let rejected_events = storage
            .query(&tenant(), &AuditFilter::new().with_kind("request.rejected"))
            .await
            .unwrap();
        assert_eq!(rejected_events.len(), 1);
    }

    #[tokio::test]
    async fn test_get_and_list_pending_are_tenant_scoped() {
        let (workflow, _) = workflow();
        let request = workflow
            .submit(
                tenant(),
                ProfessionalId::new("p1"),
                PolicyScope::AllDocuments,
                "coverage",
            )
            .await
            .unwrap();

        assert!(workflow.get(&tenant(), &request.id).await.is_ok());
        let err = workflow
            .get(&TenantId::new("t2"), &request.id)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let pending = workflow.list_pending(&tenant()).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert!(
            workflow
                .list_pending(&TenantId::new("t2"))
                .await
                .unwrap()
                .is_empty()
        );
    }
}
