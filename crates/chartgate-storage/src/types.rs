//! Query parameter types used by the storage traits.

use chartgate_core::{AccessOutcome, DocumentId, ManagementType, ProfessionalId};
use time::OffsetDateTime;

// =============================================================================
// Policy Search Parameters
// =============================================================================

/// Parameters for searching policies inside a tenant.
///
/// Used by admin reads and the reporting engine. Filters compose with AND
/// logic; an unset filter matches any value.
#[derive(Debug, Default, Clone)]
pub struct PolicySearchParams {
    /// Filter by grantee professional.
    pub professional_id: Option<ProfessionalId>,

    /// Filter by management type.
    pub management: Option<ManagementType>,

    /// Include logically deleted policies. Defaults to `false`.
    pub include_revoked: bool,

    /// Only temporary policies expiring strictly before this instant.
    pub expiring_before: Option<OffsetDateTime>,

    /// Maximum number of results to return.
    pub count: Option<usize>,

    /// Number of results to skip.
    pub offset: Option<usize>,
}

impl PolicySearchParams {
    /// Create new empty search parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the professional filter.
    #[must_use]
    pub fn with_professional(mut self, professional_id: impl Into<ProfessionalId>) -> Self {
        self.professional_id = Some(professional_id.into());
        self
    }

    /// Set the management type filter.
    #[must_use]
    pub fn with_management(mut self, management: ManagementType) -> Self {
        self.management = Some(management);
        self
    }

    /// Include revoked policies in the results.
    #[must_use]
    pub fn include_revoked(mut self) -> Self {
        self.include_revoked = true;
        self
    }

    /// Set the expiry horizon filter.
    #[must_use]
    pub fn with_expiring_before(mut self, instant: OffsetDateTime) -> Self {
        self.expiring_before = Some(instant);
        self
    }

    /// Set pagination parameters.
    #[must_use]
    pub fn with_pagination(mut self, count: usize, offset: usize) -> Self {
        self.count = Some(count);
        self.offset = Some(offset);
        self
    }
}

// =============================================================================
// Audit Filter
// =============================================================================

/// Filters for querying the audit log inside a tenant.
///
/// Filters compose with AND logic; an unset filter matches any value.
/// Results are always ordered by timestamp ascending, sequence as tiebreak.
#[derive(Debug, Default, Clone)]
pub struct AuditFilter {
    /// Filter by the professional an event is about.
    pub professional_id: Option<ProfessionalId>,

    /// Filter by document (evaluation events only carry one).
    pub document_id: Option<DocumentId>,

    /// Filter by evaluation outcome.
    pub outcome: Option<AccessOutcome>,

    /// Filter by event kind label (e.g. `"access.evaluated"`).
    pub kind: Option<&'static str>,

    /// Lower time bound, inclusive.
    pub from: Option<OffsetDateTime>,

    /// Upper time bound, exclusive.
    pub until: Option<OffsetDateTime>,

    /// Maximum number of results to return.
    pub count: Option<usize>,

    /// Number of results to skip.
    pub offset: Option<usize>,
}

impl AuditFilter {
    /// Create a new empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the professional filter.
    #[must_use]
    pub fn with_professional(mut self, professional_id: impl Into<ProfessionalId>) -> Self {
        self.professional_id = Some(professional_id.into());
        self
    }

    /// Set the document filter.
    #[must_use]
    pub fn with_document(mut self, document_id: impl Into<DocumentId>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    /// Set the outcome filter.
    #[must_use]
    pub fn with_outcome(mut self, outcome: AccessOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Set the event kind filter.
    #[must_use]
    pub fn with_kind(mut self, kind: &'static str) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the time range: `from` inclusive, `until` exclusive.
    #[must_use]
    pub fn with_time_range(mut self, from: OffsetDateTime, until: OffsetDateTime) -> Self {
        self.from = Some(from);
        self.until = Some(until);
        self
    }

    /// Set the lower time bound, inclusive.
    #[must_use]
    pub fn with_from(mut self, from: OffsetDateTime) -> Self {
        self.from = Some(from);
        self
    }

    /// Set pagination parameters.
    #[must_use]
    pub fn with_pagination(mut self, count: usize, offset: usize) -> Self {
        self.count = Some(count);
        self.offset = Some(offset);
        self
    }

    /// Returns `true` if the event matches every set filter.
    #[must_use]
    pub fn matches(&self, event: &chartgate_core::AuditEvent) -> bool {
        if let Some(professional_id) = &self.professional_id
            && event.kind.professional_id() != professional_id
        {
            return false;
        }
        if let Some(document_id) = &self.document_id
            && event.kind.document_id() != Some(document_id)
        {
            return false;
        }
        if let Some(outcome) = self.outcome
            && event.kind.outcome() != Some(outcome)
        {
            return false;
        }
        if let Some(kind) = self.kind
            && event.kind.label() != kind
        {
            return false;
        }
        if let Some(from) = self.from
            && event.recorded_at < from
        {
            return false;
        }
        if let Some(until) = self.until
            && event.recorded_at >= until
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartgate_core::{AuditEvent, AuditEventKind, DocumentType, TenantId, now_utc};
    use time::Duration;

    fn evaluated(outcome: AccessOutcome, at: OffsetDateTime) -> AuditEvent {
        AuditEvent::new(
            TenantId::new("t1"),
            1,
            at,
            AuditEventKind::AccessEvaluated {
                professional_id: ProfessionalId::new("p1"),
                document_id: DocumentId::new("doc123"),
                document_type: DocumentType::new("LAB_RESULT"),
                outcome,
                matched_policy_id: None,
            },
        )
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let event = evaluated(AccessOutcome::Denied, now_utc());
        assert!(AuditFilter::new().matches(&event));
    }

    #[test]
    fn test_filters_compose_with_and_logic() {
        let event = evaluated(AccessOutcome::Denied, now_utc());

        let filter = AuditFilter::new()
            .with_professional("p1")
            .with_outcome(AccessOutcome::Denied);
        assert!(filter.matches(&event));

        let filter = AuditFilter::new()
            .with_professional("p1")
            .with_outcome(AccessOutcome::Allowed);
        assert!(!filter.matches(&event));

        let filter = AuditFilter::new().with_document("doc456");
        assert!(!filter.matches(&event));

        let filter = AuditFilter::new().with_kind("policy.created");
        assert!(!filter.matches(&event));
    }

    #[test]
    fn test_time_range_is_half_open() {
        let at = now_utc();
        let event = evaluated(AccessOutcome::Allowed, at);

        let filter = AuditFilter::new().with_time_range(at, at + Duration::minutes(1));
        assert!(filter.matches(&event));

        // `until` is exclusive.
        let filter = AuditFilter::new().with_time_range(at - Duration::minutes(1), at);
        assert!(!filter.matches(&event));
    }

    #[test]
    fn test_policy_search_params_builder() {
        let params = PolicySearchParams::new()
            .with_professional("p1")
            .with_management(ManagementType::Manual)
            .include_revoked()
            .with_pagination(10, 20);
        assert_eq!(params.professional_id.unwrap().as_str(), "p1");
        assert_eq!(params.management, Some(ManagementType::Manual));
        assert!(params.include_revoked);
        assert_eq!(params.count, Some(10));
        assert_eq!(params.offset, Some(20));
    }
}
