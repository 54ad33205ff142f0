//! Policy store service: validated writes with audit side effects.

use std::sync::Arc;

use chartgate_core::{
    AccessPolicy, AuditEventKind, ManagementType, PolicyDuration, PolicyId, PolicyScope,
    ProfessionalId, TenantId, now_utc,
};
use chartgate_storage::{AuditStorage, PolicySearchParams, PolicyStorage};

use crate::EngineResult;
use crate::error::EngineError;

/// Write and read paths for access policies.
///
/// Every successful write appends its audit event before returning; policy
/// rows themselves are owned exclusively by the policy storage.
pub struct PolicyService {
    policies: Arc<dyn PolicyStorage>,
    audit: Arc<dyn AuditStorage>,
}

impl PolicyService {
    /// Creates a service over the given storage handles.
    #[must_use]
    pub fn new(policies: Arc<dyn PolicyStorage>, audit: Arc<dyn AuditStorage>) -> Self {
        Self { policies, audit }
    }

    /// Creates an automatic (system-granted) policy.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] if the scope is malformed or the
    /// caller asks for a manual policy: manual policies are created only by
    /// the request workflow, as the terminal effect of an approval.
    pub async fn create(
        &self,
        tenant_id: TenantId,
        professional_id: ProfessionalId,
        scope: PolicyScope,
        duration: PolicyDuration,
        management: ManagementType,
    ) -> EngineResult<AccessPolicy> {
        if management == ManagementType::Manual {
            return Err(EngineError::validation(
                "manual policies are created by the request workflow, not directly",
            ));
        }
        let policy = AccessPolicy::new(tenant_id, professional_id, scope, duration, management);
        policy.validate()?;

        let created = self.policies.create(&policy).await?;
        self.audit
            .append(
                &created.tenant_id,
                AuditEventKind::PolicyCreated {
                    policy_id: created.id.clone(),
                    professional_id: created.professional_id.clone(),
                    management: created.management,
                },
                created.created_at,
            )
            .await?;
        tracing::info!(
            tenant_id = %created.tenant_id,
            policy_id = %created.id,
            professional_id = %created.professional_id,
            management = %created.management,
            "Access policy created"
        );
        Ok(created)
    }

    /// Logically deletes a policy.
    ///
    /// Its matching power is gone immediately; the row stays behind for the
    /// audit history.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the policy does not exist in the
    /// tenant and [`EngineError::Conflict`] if it is already revoked.
    pub async fn revoke(
        &self,
        tenant_id: &TenantId,
        policy_id: &PolicyId,
        actor_id: &ProfessionalId,
    ) -> EngineResult<AccessPolicy> {
        let at = now_utc();
        let revoked = self.policies.revoke(tenant_id, policy_id, actor_id, at).await?;
        self.audit
            .append(
                tenant_id,
                AuditEventKind::PolicyRevoked {
                    policy_id: revoked.id.clone(),
                    actor_id: actor_id.clone(),
                },
                at,
            )
            .await?;
        tracing::info!(
            tenant_id = %tenant_id,
            policy_id = %policy_id,
            actor_id = %actor_id,
            "Access policy revoked"
        );
        Ok(revoked)
    }

    /// Lists the policies currently in force for a professional.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unavailable`] on storage failure.
    pub async fn list_active(
        &self,
        tenant_id: &TenantId,
        professional_id: &ProfessionalId,
    ) -> EngineResult<Vec<AccessPolicy>> {
        Ok(self
            .policies
            .list_active_for_professional(tenant_id, professional_id, now_utc())
            .await?)
    }

    /// Searches policies with filtering, for admin and reporting reads.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unavailable`] on storage failure.
    pub async fn search(
        &self,
        tenant_id: &TenantId,
        params: &PolicySearchParams,
    ) -> EngineResult<Vec<AccessPolicy>> {
        Ok(self.policies.search(tenant_id, params).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartgate_db_memory::MemoryStorage;
    use chartgate_storage::AuditFilter;

    fn service() -> (PolicyService, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let service = PolicyService::new(storage.clone(), storage.clone());
        (service, storage)
    }

    fn tenant() -> TenantId {
        TenantId::new("t1")
    }

    #[tokio::test]
    async fn test_create_appends_audit_event() {
        let (service, storage) = service();
        let created = service
            .create(
                tenant(),
                ProfessionalId::new("p1"),
                PolicyScope::AllDocuments,
                PolicyDuration::Indefinite,
                ManagementType::Automatic,
            )
            .await
            .unwrap();

        let events = storage
            .query(&tenant(), &AuditFilter::new().with_kind("policy.created"))
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind.professional_id(), &created.professional_id);
        assert!(events[0].kind.outcome().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_scope() {
        let (service, _) = service();
        let err = service
            .create(
                tenant(),
                ProfessionalId::new("p1"),
                PolicyScope::DocumentsByType {
                    types: std::collections::BTreeSet::new(),
                },
                PolicyDuration::Indefinite,
                ManagementType::Automatic,
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_create_rejects_direct_manual_policies() {
        let (service, _) = service();
        let err = service
            .create(
                tenant(),
                ProfessionalId::new("p1"),
                PolicyScope::AllDocuments,
                PolicyDuration::Indefinite,
                ManagementType::Manual,
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_revoke_appends_audit_event_and_conflicts_on_repeat() {
        let (service, storage) = service();
        let created = service
            .create(
                tenant(),
                ProfessionalId::new("p1"),
                PolicyScope::AllDocuments,
                PolicyDuration::Indefinite,
                ManagementType::Automatic,
            )
            .await
            .unwrap();

        let admin = ProfessionalId::new("admin");
        service.revoke(&tenant(), &created.id, &admin).await.unwrap();

        let events = storage
            .query(&tenant(), &AuditFilter::new().with_kind("policy.revoked"))
            .await
            .unwrap();
        assert_eq!(events.len(), 1);

        let err = service
            .revoke(&tenant(), &created.id, &admin)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let err = service
            .revoke(&tenant(), &PolicyId::new("missing"), &admin)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
