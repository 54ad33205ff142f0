//! The collaborator-facing engine facade.

use std::sync::Arc;

use chartgate_core::{
    AccessPolicy, AccessRequest, AuditEvent, DocumentId, DocumentType, GrantDuration,
    ManagementType, PolicyDuration, PolicyId, PolicyScope, ProfessionalId, RequestId, TenantId,
};
use chartgate_storage::{
    AuditFilter, AuditStorage, PolicySearchParams, PolicyStorage, RequestStorage,
};

use crate::EngineResult;
use crate::config::EngineConfig;
use crate::evaluator::{AccessDecision, DecisionEvaluator};
use crate::policy::PolicyService;
use crate::report::{Report, ReportKind, ReportingEngine};
use crate::workflow::RequestWorkflow;

/// The access-control engine: one handle bundling the policy store service,
/// the request workflow, the decision evaluator and the reporting engine
/// over shared storage.
///
/// Every operation takes the tenant as its first argument; the engine keeps
/// no ambient identity state between calls. Callers are expected to pass a
/// tenant taken from an authenticated context upstream.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use chartgate_db_memory::MemoryStorage;
/// use chartgate_engine::AccessEngine;
///
/// let storage = Arc::new(MemoryStorage::new());
/// let engine = AccessEngine::new(storage.clone(), storage.clone(), storage, EngineConfig::default());
/// let decision = engine
///     .evaluate_access(&tenant, &professional, &document, &document_type)
///     .await?;
/// ```
pub struct AccessEngine {
    policies: PolicyService,
    workflow: RequestWorkflow,
    evaluator: DecisionEvaluator,
    reporting: ReportingEngine,
    audit: Arc<dyn AuditStorage>,
}

impl AccessEngine {
    /// Assembles an engine over the given storage handles.
    #[must_use]
    pub fn new(
        policy_storage: Arc<dyn PolicyStorage>,
        request_storage: Arc<dyn RequestStorage>,
        audit_storage: Arc<dyn AuditStorage>,
        config: EngineConfig,
    ) -> Self {
        Self {
            policies: PolicyService::new(policy_storage.clone(), audit_storage.clone()),
            workflow: RequestWorkflow::new(request_storage.clone(), audit_storage.clone()),
            evaluator: DecisionEvaluator::with_config(
                policy_storage.clone(),
                audit_storage.clone(),
                config.evaluation,
            ),
            reporting: ReportingEngine::new(
                audit_storage.clone(),
                policy_storage,
                request_storage,
                config.reporting,
            ),
            audit: audit_storage,
        }
    }

    // ==================== Evaluation ====================

    /// Decides whether the professional may read the document; see
    /// [`DecisionEvaluator::evaluate`].
    ///
    /// # Errors
    ///
    /// Fails only with `Unavailable` on infrastructure failure; the caller
    /// must then treat access as denied.
    pub async fn evaluate_access(
        &self,
        tenant_id: &TenantId,
        professional_id: &ProfessionalId,
        document_id: &DocumentId,
        document_type: &DocumentType,
    ) -> EngineResult<AccessDecision> {
        self.evaluator
            .evaluate(tenant_id, professional_id, document_id, document_type)
            .await
    }

    // ==================== Policies ====================

    /// Creates an automatic policy; see [`PolicyService::create`].
    ///
    /// # Errors
    ///
    /// Returns `Validation` on malformed input.
    pub async fn create_policy(
        &self,
        tenant_id: TenantId,
        professional_id: ProfessionalId,
        scope: PolicyScope,
        duration: PolicyDuration,
        management: ManagementType,
    ) -> EngineResult<AccessPolicy> {
        self.policies
            .create(tenant_id, professional_id, scope, duration, management)
            .await
    }

    /// Revokes a policy; see [`PolicyService::revoke`].
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Conflict` per the revocation guards.
    pub async fn revoke_policy(
        &self,
        tenant_id: &TenantId,
        policy_id: &PolicyId,
        actor_id: &ProfessionalId,
    ) -> EngineResult<AccessPolicy> {
        self.policies.revoke(tenant_id, policy_id, actor_id).await
    }

    /// Lists the policies currently in force for a professional.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` on storage failure.
    pub async fn list_active_policies(
        &self,
        tenant_id: &TenantId,
        professional_id: &ProfessionalId,
    ) -> EngineResult<Vec<AccessPolicy>> {
        self.policies.list_active(tenant_id, professional_id).await
    }

    /// Searches policies with filtering.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` on storage failure.
    pub async fn search_policies(
        &self,
        tenant_id: &TenantId,
        params: &PolicySearchParams,
    ) -> EngineResult<Vec<AccessPolicy>> {
        self.policies.search(tenant_id, params).await
    }

    // ==================== Requests ====================

    /// Submits a new access request; see [`RequestWorkflow::submit`].
    ///
    /// # Errors
    ///
    /// Returns `Validation` on malformed input.
    pub async fn submit_request(
        &self,
        tenant_id: TenantId,
        professional_id: ProfessionalId,
        scope: PolicyScope,
        reason: impl Into<String>,
    ) -> EngineResult<AccessRequest> {
        self.workflow
            .submit(tenant_id, professional_id, scope, reason)
            .await
    }

    /// Approves a pending request; see [`RequestWorkflow::approve`].
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Conflict` per the state-machine guards.
    pub async fn approve_request(
        &self,
        tenant_id: &TenantId,
        request_id: &RequestId,
        actor_id: &ProfessionalId,
        granted_duration: GrantDuration,
    ) -> EngineResult<(AccessRequest, AccessPolicy)> {
        self.workflow
            .approve(tenant_id, request_id, actor_id, granted_duration)
            .await
    }

    /// Rejects a pending request; see [`RequestWorkflow::reject`].
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Conflict` per the state-machine guards.
    pub async fn reject_request(
        &self,
        tenant_id: &TenantId,
        request_id: &RequestId,
        actor_id: &ProfessionalId,
        rationale: impl Into<String>,
    ) -> EngineResult<AccessRequest> {
        self.workflow
            .reject(tenant_id, request_id, actor_id, rationale)
            .await
    }

    /// Reads one request, tenant-scoped.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent in the tenant.
    pub async fn get_request(
        &self,
        tenant_id: &TenantId,
        request_id: &RequestId,
    ) -> EngineResult<AccessRequest> {
        self.workflow.get(tenant_id, request_id).await
    }

    /// Lists pending requests in FIFO review order.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` on storage failure.
    pub async fn list_pending_requests(
        &self,
        tenant_id: &TenantId,
    ) -> EngineResult<Vec<AccessRequest>> {
        self.workflow.list_pending(tenant_id).await
    }

    // ==================== Audit & Reporting ====================

    /// Queries the audit log, ordered by timestamp ascending.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` on storage failure.
    pub async fn query_audit_log(
        &self,
        tenant_id: &TenantId,
        filter: &AuditFilter,
    ) -> EngineResult<Vec<AuditEvent>> {
        Ok(self.audit.query(tenant_id, filter).await?)
    }

    /// Generates a report; see [`ReportingEngine::generate`].
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` on storage failure.
    pub async fn generate_report(
        &self,
        tenant_id: &TenantId,
        kind: ReportKind,
    ) -> EngineResult<Report> {
        self.reporting.generate(tenant_id, kind).await
    }

    // ==================== Component access ====================

    /// The policy store service.
    #[must_use]
    pub fn policies(&self) -> &PolicyService {
        &self.policies
    }

    /// The request workflow.
    #[must_use]
    pub fn workflow(&self) -> &RequestWorkflow {
        &self.workflow
    }

    /// The decision evaluator.
    #[must_use]
    pub fn evaluator(&self) -> &DecisionEvaluator {
        &self.evaluator
    }

    /// The reporting engine.
    #[must_use]
    pub fn reporting(&self) -> &ReportingEngine {
        &self.reporting
    }
}
