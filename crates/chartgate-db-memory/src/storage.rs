//! Concurrent in-memory implementation of the ChartGate storage traits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use chartgate_core::{
    AccessPolicy, AccessRequest, AuditEvent, AuditEventKind, PolicyId, ProfessionalId, RequestId,
    RequestStatus, TenantId,
};
use chartgate_storage::{
    AuditFilter, AuditStorage, PolicySearchParams, PolicyStorage, RequestStorage, StorageError,
};

pub type StorageKey = String; // Format: "tenantId/id"

pub(crate) fn make_storage_key(tenant_id: &TenantId, id: &str) -> StorageKey {
    format!("{tenant_id}/{id}")
}

/// Per-tenant slice of the audit log.
#[derive(Debug, Default)]
struct TenantAuditLog {
    /// Monotonic sequence counter; the next append gets `next_sequence + 1`.
    next_sequence: u64,
    events: Vec<AuditEvent>,
}

/// In-memory storage backend over concurrent maps.
///
/// Policy and request rows live in `DashMap` tables keyed `tenant/id`, so a
/// `get_mut` entry guard gives the per-row exclusive access the
/// compare-and-set transitions need. The audit log lives behind a `tokio`
/// RwLock keyed by tenant, with each tenant carrying its own monotonic
/// sequence counter.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    policies: DashMap<StorageKey, AccessPolicy>,
    requests: DashMap<StorageKey, AccessRequest>,
    audit: Arc<RwLock<HashMap<TenantId, TenantAuditLog>>>,
}

impl MemoryStorage {
    /// Creates a new empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tenant_policies(&self, tenant_id: &TenantId) -> Vec<AccessPolicy> {
        let mut policies: Vec<AccessPolicy> = self
            .policies
            .iter()
            .filter(|entry| &entry.value().tenant_id == tenant_id)
            .map(|entry| entry.value().clone())
            .collect();
        policies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        policies
    }
}

#[async_trait]
impl PolicyStorage for MemoryStorage {
    async fn create(&self, policy: &AccessPolicy) -> Result<AccessPolicy, StorageError> {
        let key = make_storage_key(&policy.tenant_id, policy.id.as_str());
        match self.policies.entry(key) {
            Entry::Occupied(_) => Err(StorageError::already_exists("policy", policy.id.as_str())),
            Entry::Vacant(slot) => {
                slot.insert(policy.clone());
                Ok(policy.clone())
            }
        }
    }

    async fn get(
        &self,
        tenant_id: &TenantId,
        id: &PolicyId,
    ) -> Result<Option<AccessPolicy>, StorageError> {
        let key = make_storage_key(tenant_id, id.as_str());
        Ok(self.policies.get(&key).map(|entry| entry.value().clone()))
    }

    async fn list_active_for_professional(
        &self,
        tenant_id: &TenantId,
        professional_id: &ProfessionalId,
        as_of: OffsetDateTime,
    ) -> Result<Vec<AccessPolicy>, StorageError> {
        Ok(self
            .tenant_policies(tenant_id)
            .into_iter()
            .filter(|p| &p.professional_id == professional_id && p.is_active(as_of))
            .collect())
    }

    async fn revoke(
        &self,
        tenant_id: &TenantId,
        id: &PolicyId,
        actor_id: &ProfessionalId,
        at: OffsetDateTime,
    ) -> Result<AccessPolicy, StorageError> {
        let key = make_storage_key(tenant_id, id.as_str());
        let mut entry = self
            .policies
            .get_mut(&key)
            .ok_or_else(|| StorageError::not_found("policy", id.as_str()))?;
        if entry.is_revoked() {
            return Err(StorageError::conflict(format!(
                "policy {id} is already revoked"
            )));
        }
        entry.revoked_at = Some(at);
        entry.revoked_by = Some(actor_id.clone());
        Ok(entry.clone())
    }

    async fn search(
        &self,
        tenant_id: &TenantId,
        params: &PolicySearchParams,
    ) -> Result<Vec<AccessPolicy>, StorageError> {
        let matches = |p: &AccessPolicy| {
            if !params.include_revoked && p.is_revoked() {
                return false;
            }
            if let Some(professional_id) = &params.professional_id
                && &p.professional_id != professional_id
            {
                return false;
            }
            if let Some(management) = params.management
                && p.management != management
            {
                return false;
            }
            if let Some(bound) = params.expiring_before {
                match &p.duration {
                    chartgate_core::PolicyDuration::Temporary { expires_at } => {
                        if *expires_at >= bound {
                            return false;
                        }
                    }
                    chartgate_core::PolicyDuration::Indefinite => return false,
                }
            }
            true
        };

        let results = self
            .tenant_policies(tenant_id)
            .into_iter()
            .filter(|p| matches(p))
            .skip(params.offset.unwrap_or(0))
            .take(params.count.unwrap_or(usize::MAX))
            .collect();
        Ok(results)
    }
}

#[async_trait]
impl RequestStorage for MemoryStorage {
    async fn create(&self, request: &AccessRequest) -> Result<AccessRequest, StorageError> {
        let key = make_storage_key(&request.tenant_id, request.id.as_str());
        match self.requests.entry(key) {
            Entry::Occupied(_) => {
                Err(StorageError::already_exists("request", request.id.as_str()))
            }
            Entry::Vacant(slot) => {
                slot.insert(request.clone());
                Ok(request.clone())
            }
        }
    }

    async fn get(
        &self,
        tenant_id: &TenantId,
        id: &RequestId,
    ) -> Result<Option<AccessRequest>, StorageError> {
        let key = make_storage_key(tenant_id, id.as_str());
        Ok(self.requests.get(&key).map(|entry| entry.value().clone()))
    }

    async fn list_pending(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<AccessRequest>, StorageError> {
        let mut pending: Vec<AccessRequest> = self
            .requests
            .iter()
            .filter(|entry| {
                let request = entry.value();
                &request.tenant_id == tenant_id && request.is_pending()
            })
            .map(|entry| entry.value().clone())
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(pending)
    }

    async fn approve(
        &self,
        tenant_id: &TenantId,
        id: &RequestId,
        actor_id: &ProfessionalId,
        at: OffsetDateTime,
        granted: AccessPolicy,
    ) -> Result<(AccessRequest, AccessPolicy), StorageError> {
        let key = make_storage_key(tenant_id, id.as_str());
        // The entry guard is held across the whole compound write: the status
        // check, the policy insert and the status update are one unit, and
        // concurrent deciders serialize on the guard.
        let mut entry = self
            .requests
            .get_mut(&key)
            .ok_or_else(|| StorageError::not_found("request", id.as_str()))?;
        if entry.status != RequestStatus::Pending {
            return Err(StorageError::conflict(format!(
                "request {id} is already {}",
                entry.status
            )));
        }

        let policy_key = make_storage_key(&granted.tenant_id, granted.id.as_str());
        match self.policies.entry(policy_key) {
            Entry::Occupied(_) => {
                // Nothing was mutated yet; the request stays pending.
                return Err(StorageError::already_exists("policy", granted.id.as_str()));
            }
            Entry::Vacant(slot) => {
                slot.insert(granted.clone());
            }
        }

        entry.status = RequestStatus::Approved;
        entry.decided_by = Some(actor_id.clone());
        entry.decided_at = Some(at);
        Ok((entry.clone(), granted))
    }

    async fn reject(
        &self,
        tenant_id: &TenantId,
        id: &RequestId,
        actor_id: &ProfessionalId,
        at: OffsetDateTime,
    ) -> Result<AccessRequest, StorageError> {
        let key = make_storage_key(tenant_id, id.as_str());
        let mut entry = self
            .requests
            .get_mut(&key)
            .ok_or_else(|| StorageError::not_found("request", id.as_str()))?;
        if entry.status != RequestStatus::Pending {
            return Err(StorageError::conflict(format!(
                "request {id} is already {}",
                entry.status
            )));
        }
        entry.status = RequestStatus::Rejected;
        entry.decided_by = Some(actor_id.clone());
        entry.decided_at = Some(at);
        Ok(entry.clone())
    }
}

#[async_trait]
impl AuditStorage for MemoryStorage {
    async fn append(
        &self,
        tenant_id: &TenantId,
        kind: AuditEventKind,
        at: OffsetDateTime,
    ) -> Result<AuditEvent, StorageError> {
        let mut guard = self.audit.write().await;
        let log = guard.entry(tenant_id.clone()).or_default();
        log.next_sequence += 1;
        let event = AuditEvent::new(tenant_id.clone(), log.next_sequence, at, kind);
        log.events.push(event.clone());
        Ok(event)
    }

    async fn query(
        &self,
        tenant_id: &TenantId,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditEvent>, StorageError> {
        let guard = self.audit.read().await;
        let Some(log) = guard.get(tenant_id) else {
            return Ok(Vec::new());
        };
        let mut events: Vec<AuditEvent> = log
            .events
            .iter()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            a.recorded_at
                .cmp(&b.recorded_at)
                .then_with(|| a.sequence.cmp(&b.sequence))
        });
        Ok(events
            .into_iter()
            .skip(filter.offset.unwrap_or(0))
            .take(filter.count.unwrap_or(usize::MAX))
            .collect())
    }
}
