//! Decision evaluator: the pure access-decision function.
//!
//! The evaluator has no persistence of its own beyond the audit write. It
//! fetches the professional's active policies, matches them against the
//! attempted document, and unconditionally appends one audit row before
//! returning — auditability is a security control, never skippable,
//! including on the denied path.

use std::sync::Arc;

use serde::Serialize;

use chartgate_core::{
    AccessOutcome, AuditEventKind, DocumentId, DocumentType, PolicyId, ProfessionalId, TenantId,
    now_utc,
};
use chartgate_storage::{AuditStorage, PolicyStorage};

use crate::EngineResult;
use crate::config::EvaluationConfig;

/// Result of one access evaluation.
///
/// A denied decision is a successful result: the evaluator fails only on
/// infrastructure errors, and then the caller must treat access as denied
/// (fail-closed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    /// The rendered outcome.
    pub outcome: AccessOutcome,

    /// The most specific authorizing policy; absent on denial.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_policy_id: Option<PolicyId>,
}

impl AccessDecision {
    /// An allowed decision authorized by the given policy.
    #[must_use]
    pub fn allowed(matched_policy_id: PolicyId) -> Self {
        Self {
            outcome: AccessOutcome::Allowed,
            matched_policy_id: Some(matched_policy_id),
        }
    }

    /// A denied decision.
    #[must_use]
    pub fn denied() -> Self {
        Self {
            outcome: AccessOutcome::Denied,
            matched_policy_id: None,
        }
    }

    /// Returns `true` if access was granted.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.outcome == AccessOutcome::Allowed
    }

    /// Returns `true` if access was denied.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        self.outcome == AccessOutcome::Denied
    }
}

/// Renders allow/deny decisions for single access attempts.
pub struct DecisionEvaluator {
    policies: Arc<dyn PolicyStorage>,
    audit: Arc<dyn AuditStorage>,
    config: EvaluationConfig,
}

impl DecisionEvaluator {
    /// Creates an evaluator over the given storage handles.
    #[must_use]
    pub fn new(policies: Arc<dyn PolicyStorage>, audit: Arc<dyn AuditStorage>) -> Self {
        Self::with_config(policies, audit, EvaluationConfig::default())
    }

    /// Creates an evaluator with explicit evaluation options.
    #[must_use]
    pub fn with_config(
        policies: Arc<dyn PolicyStorage>,
        audit: Arc<dyn AuditStorage>,
        config: EvaluationConfig,
    ) -> Self {
        Self {
            policies,
            audit,
            config,
        }
    }

    /// Decides whether the professional may read the document.
    ///
    /// The reported policy is the matching one with the narrowest scope
    /// (specific document > by type > all documents), ties broken by
    /// most-recent creation, then id — so audit trails point at the most
    /// specific authorizing policy deterministically.
    ///
    /// Exactly one audit row is appended per call, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unavailable`](crate::EngineError::Unavailable)
    /// if the policy store or the audit log cannot be reached. The caller
    /// must then treat access as denied; the evaluator performs no internal
    /// retries.
    pub async fn evaluate(
        &self,
        tenant_id: &TenantId,
        professional_id: &ProfessionalId,
        document_id: &DocumentId,
        document_type: &DocumentType,
    ) -> EngineResult<AccessDecision> {
        let evaluated_at = now_utc();
        let active = self
            .policies
            .list_active_for_professional(tenant_id, professional_id, evaluated_at)
            .await?;

        let matched = active
            .iter()
            .filter(|policy| policy.scope.matches(document_id, document_type))
            .max_by(|a, b| {
                a.scope
                    .specificity()
                    .cmp(&b.scope.specificity())
                    .then_with(|| a.created_at.cmp(&b.created_at))
                    .then_with(|| a.id.cmp(&b.id))
            });

        let decision = match matched {
            Some(policy) => AccessDecision::allowed(policy.id.clone()),
            None => AccessDecision::denied(),
        };

        // The audit row is written before the decision is returned; if the
        // append fails the whole evaluation fails and the caller sees an
        // outage, not a decision.
        self.audit
            .append(
                tenant_id,
                AuditEventKind::AccessEvaluated {
                    professional_id: professional_id.clone(),
                    document_id: document_id.clone(),
                    document_type: document_type.clone(),
                    outcome: decision.outcome,
                    matched_policy_id: decision.matched_policy_id.clone(),
                },
                evaluated_at,
            )
            .await?;

        let log_at_info = match decision.outcome {
            AccessOutcome::Allowed => self.config.log_allowed,
            AccessOutcome::Denied => self.config.log_denied,
        };
        if log_at_info {
            tracing::info!(
                tenant_id = %tenant_id,
                professional_id = %professional_id,
                document_id = %document_id,
                document_type = %document_type,
                outcome = %decision.outcome,
                "Access evaluated"
            );
        } else {
            tracing::debug!(
                tenant_id = %tenant_id,
                professional_id = %professional_id,
                document_id = %document_id,
                outcome = %decision.outcome,
                "Access evaluated"
            );
        }
        Ok(decision)
    }
}
