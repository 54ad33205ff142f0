//! Reporting engine: read-only aggregations over the audit log, policy
//! store and request workflow.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use chartgate_core::{
    AccessOutcome, AccessPolicy, AccessRequest, PolicyDuration, ProfessionalId, TenantId, now_utc,
};
use chartgate_storage::{
    AuditFilter, AuditStorage, PolicySearchParams, PolicyStorage, RequestStorage,
};

use crate::EngineResult;
use crate::config::ReportingConfig;

// =============================================================================
// Report Kinds
// =============================================================================

/// A report request, dispatched through [`ReportingEngine::generate`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ReportKind {
    /// Denial rate over a trailing window, optionally for one professional.
    DenialRate {
        /// Width of the trailing window.
        #[serde(with = "humantime_serde")]
        window: Duration,
        /// Restrict to one professional.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        professional_id: Option<ProfessionalId>,
    },

    /// Pending requests older than a threshold (staleness alert).
    StalePendingRequests {
        /// Age threshold; the configured default when unset.
        #[serde(with = "humantime_serde", default)]
        older_than: Option<Duration>,
    },

    /// Active temporary policies expiring within a horizon, plus the
    /// already-lapsed ones lazy expiry leaves behind.
    ExpiryForecast {
        /// Forecast horizon; the configured default when unset.
        #[serde(with = "humantime_serde", default)]
        within: Option<Duration>,
    },

    /// Per-professional evaluation activity over a trailing window.
    ProfessionalActivity {
        /// Width of the trailing window.
        #[serde(with = "humantime_serde")]
        window: Duration,
    },
}

// =============================================================================
// Report Payloads
// =============================================================================

/// Denial-rate aggregation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DenialRateReport {
    /// Width of the trailing window the rate was computed over.
    #[serde(with = "humantime_serde")]
    pub window: Duration,
    /// The professional the report was restricted to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional_id: Option<ProfessionalId>,
    /// Total evaluations inside the window.
    pub evaluations: u64,
    /// Allowed evaluations.
    pub allowed: u64,
    /// Denied evaluations.
    pub denied: u64,
    /// `denied / evaluations`; zero when there were no evaluations.
    pub denial_rate: f64,
}

/// Stale pending requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StalePendingReport {
    /// Age threshold the report was computed with.
    #[serde(with = "humantime_serde")]
    pub older_than: Duration,
    /// Stale requests in FIFO review order.
    pub requests: Vec<AccessRequest>,
}

/// Policy-expiry forecast.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryForecastReport {
    /// Forecast horizon the report was computed with.
    #[serde(with = "humantime_serde")]
    pub within: Duration,
    /// Policies still in force that lapse inside the horizon, soonest first.
    pub expiring: Vec<AccessPolicy>,
    /// Unrevoked policies that have already lapsed. Lazy expiry never
    /// deletes them; this count is the reconciliation signal.
    pub lapsed: u64,
}

/// One professional's evaluation activity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalActivityEntry {
    /// The professional.
    pub professional_id: ProfessionalId,
    /// Allowed evaluations inside the window.
    pub allowed: u64,
    /// Denied evaluations inside the window.
    pub denied: u64,
}

/// Per-professional activity aggregation, most active first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalActivityReport {
    /// Width of the trailing window.
    #[serde(with = "humantime_serde")]
    pub window: Duration,
    /// Activity entries, ordered by evaluation count descending, then
    /// professional id.
    pub entries: Vec<ProfessionalActivityEntry>,
}

/// A generated report.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Report {
    /// See [`DenialRateReport`].
    DenialRate(DenialRateReport),
    /// See [`StalePendingReport`].
    StalePendingRequests(StalePendingReport),
    /// See [`ExpiryForecastReport`].
    ExpiryForecast(ExpiryForecastReport),
    /// See [`ProfessionalActivityReport`].
    ProfessionalActivity(ProfessionalActivityReport),
}

// =============================================================================
// Reporting Engine
// =============================================================================

/// Read-only aggregation over the audit log, policy store and request
/// workflow. No write path exists here.
pub struct ReportingEngine {
    audit: Arc<dyn AuditStorage>,
    policies: Arc<dyn PolicyStorage>,
    requests: Arc<dyn RequestStorage>,
    config: ReportingConfig,
}

impl ReportingEngine {
    /// Creates a reporting engine over the given storage handles.
    #[must_use]
    pub fn new(
        audit: Arc<dyn AuditStorage>,
        policies: Arc<dyn PolicyStorage>,
        requests: Arc<dyn RequestStorage>,
        config: ReportingConfig,
    ) -> Self {
        Self {
            audit,
            policies,
            requests,
            config,
        }
    }

    /// Generates the requested report.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unavailable`](crate::EngineError::Unavailable)
    /// on storage failure.
    pub async fn generate(&self, tenant_id: &TenantId, kind: ReportKind) -> EngineResult<Report> {
        match kind {
            ReportKind::DenialRate {
                window,
                professional_id,
            } => Ok(Report::DenialRate(
                self.denial_rate(tenant_id, window, professional_id).await?,
            )),
            ReportKind::StalePendingRequests { older_than } => Ok(Report::StalePendingRequests(
                self.stale_pending(tenant_id, older_than).await?,
            )),
            ReportKind::ExpiryForecast { within } => Ok(Report::ExpiryForecast(
                self.expiry_forecast(tenant_id, within).await?,
            )),
            ReportKind::ProfessionalActivity { window } => Ok(Report::ProfessionalActivity(
                self.professional_activity(tenant_id, window).await?,
            )),
        }
    }

    /// Denial rate over the trailing window.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub async fn denial_rate(
        &self,
        tenant_id: &TenantId,
        window: Duration,
        professional_id: Option<ProfessionalId>,
    ) -> EngineResult<DenialRateReport> {
        let mut filter = AuditFilter::new()
            .with_kind("access.evaluated")
            .with_from(now_utc() - window);
        if let Some(professional_id) = &professional_id {
            filter = filter.with_professional(professional_id.clone());
        }

        let events = self.audit.query(tenant_id, &filter).await?;
        let evaluations = events.len() as u64;
        let denied = events
            .iter()
            .filter(|event| event.kind.outcome() == Some(AccessOutcome::Denied))
            .count() as u64;
        let allowed = evaluations - denied;
        let denial_rate = if evaluations == 0 {
            0.0
        } else {
            denied as f64 / evaluations as f64
        };
        Ok(DenialRateReport {
            window,
            professional_id,
            evaluations,
            allowed,
            denied,
            denial_rate,
        })
    }

    /// Pending requests older than the threshold, FIFO order.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub async fn stale_pending(
        &self,
        tenant_id: &TenantId,
        older_than: Option<Duration>,
    ) -> EngineResult<StalePendingReport> {
        let older_than = older_than.unwrap_or(self.config.stale_request_threshold);
        let cutoff = now_utc() - older_than;
        let requests = self
            .requests
            .list_pending(tenant_id)
            .await?
            .into_iter()
            .filter(|request| request.created_at <= cutoff)
            .collect();
        Ok(StalePendingReport {
            older_than,
            requests,
        })
    }

    /// Active temporary policies expiring inside the horizon, plus the
    /// count of already-lapsed unrevoked policies.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub async fn expiry_forecast(
        &self,
        tenant_id: &TenantId,
        within: Option<Duration>,
    ) -> EngineResult<ExpiryForecastReport> {
        let within = within.unwrap_or(self.config.expiry_forecast_window);
        let now = now_utc();
        let horizon = now + within;

        let candidates = self
            .policies
            .search(
                tenant_id,
                &PolicySearchParams::new().with_expiring_before(horizon),
            )
            .await?;

        let mut expiring = Vec::new();
        let mut lapsed = 0u64;
        for policy in candidates {
            if policy.duration.is_expired(now) {
                lapsed += 1;
            } else {
                expiring.push(policy);
            }
        }
        expiring.sort_by(|a, b| match (&a.duration, &b.duration) {
            (
                PolicyDuration::Temporary { expires_at: ea },
                PolicyDuration::Temporary { expires_at: eb },
            ) => ea.cmp(eb).then_with(|| a.id.cmp(&b.id)),
            // Search only returns temporary policies here.
            _ => a.id.cmp(&b.id),
        });

        Ok(ExpiryForecastReport {
            within,
            expiring,
            lapsed,
        })
    }

    /// Per-professional evaluation counts over the trailing window.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub async fn professional_activity(
        &self,
        tenant_id: &TenantId,
        window: Duration,
    ) -> EngineResult<ProfessionalActivityReport> {
        let filter = AuditFilter::new()
            .with_kind("access.evaluated")
            .with_from(now_utc() - window);
        let events = self.audit.query(tenant_id, &filter).await?;

        let mut counts: BTreeMap<ProfessionalId, (u64, u64)> = BTreeMap::new();
        for event in &events {
            let entry = counts.entry(event.kind.professional_id().clone()).or_default();
            match event.kind.outcome() {
                Some(AccessOutcome::Allowed) => entry.0 += 1,
                Some(AccessOutcome::Denied) => entry.1 += 1,
                None => {}
            }
        }

        let mut entries: Vec<ProfessionalActivityEntry> = counts
            .into_iter()
            .map(|(professional_id, (allowed, denied))| ProfessionalActivityEntry {
                professional_id,
                allowed,
                denied,
            })
            .collect();
        entries.sort_by(|a, b| {
            (b.allowed + b.denied)
                .cmp(&(a.allowed + a.denied))
                .then_with(|| a.professional_id.cmp(&b.professional_id))
        });

        Ok(ProfessionalActivityReport { window, entries })
    }
}
