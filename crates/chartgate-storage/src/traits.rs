//! Storage traits for the ChartGate storage abstraction layer.
//!
//! This module defines the contracts every storage backend must implement.
//! All operations are tenant-parameterized and must be safely callable
//! concurrently.

use async_trait::async_trait;
use time::OffsetDateTime;

use chartgate_core::{
    AccessPolicy, AccessRequest, AuditEvent, AuditEventKind, PolicyId, ProfessionalId, RequestId,
    TenantId,
};

use crate::error::StorageError;
use crate::types::{AuditFilter, PolicySearchParams};

/// Storage operations for access policy rows.
///
/// Policies are never physically removed: revocation is a logical delete
/// and superseded rows stay behind for the audit history.
///
/// # Example
///
/// ```ignore
/// use chartgate_storage::PolicyStorage;
///
/// async fn active_count(storage: &impl PolicyStorage, tenant: &TenantId, professional: &ProfessionalId) {
///     let policies = storage
///         .list_active_for_professional(tenant, professional, OffsetDateTime::now_utc())
///         .await?;
///     println!("{} active policies", policies.len());
/// }
/// ```
#[async_trait]
pub trait PolicyStorage: Send + Sync {
    /// Persists a new policy.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if a policy with the same id
    /// exists in the tenant, or `StorageError::Unavailable` on
    /// infrastructure failure.
    async fn create(&self, policy: &AccessPolicy) -> Result<AccessPolicy, StorageError>;

    /// Reads a policy by id, tenant-scoped.
    ///
    /// Returns `None` if the policy does not exist in that tenant.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing rows.
    async fn get(
        &self,
        tenant_id: &TenantId,
        id: &PolicyId,
    ) -> Result<Option<AccessPolicy>, StorageError>;

    /// Lists the policies for a professional that are neither revoked nor
    /// expired as of `as_of`.
    ///
    /// The result is computed freshly on every call (no caching across
    /// calls) and ordered by `created_at` ascending, id as tiebreak.
    /// Used exclusively by the decision evaluator.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` on infrastructure failure; the
    /// evaluator fails closed on it.
    async fn list_active_for_professional(
        &self,
        tenant_id: &TenantId,
        professional_id: &ProfessionalId,
        as_of: OffsetDateTime,
    ) -> Result<Vec<AccessPolicy>, StorageError>;

    /// Logically deletes a policy via compare-and-set on its revocation
    /// state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the policy does not exist in the
    /// tenant and `StorageError::Conflict` if it is already revoked.
    async fn revoke(
        &self,
        tenant_id: &TenantId,
        id: &PolicyId,
        actor_id: &ProfessionalId,
        at: OffsetDateTime,
    ) -> Result<AccessPolicy, StorageError>;

    /// Searches policies with filtering, for admin and reporting reads.
    ///
    /// Revoked policies are excluded unless the params say otherwise.
    /// Results are ordered by `created_at` ascending, id as tiebreak.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn search(
        &self,
        tenant_id: &TenantId,
        params: &PolicySearchParams,
    ) -> Result<Vec<AccessPolicy>, StorageError>;
}

/// Storage operations for access request rows.
///
/// A request's `status` is the only mutable shared field in the engine and
/// is guarded by compare-and-set: concurrent deciders lose with
/// `StorageError::Conflict`, never corruption.
#[async_trait]
pub trait RequestStorage: Send + Sync {
    /// Persists a new pending request.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if a request with the same id
    /// exists in the tenant, or `StorageError::Unavailable` on
    /// infrastructure failure.
    async fn create(&self, request: &AccessRequest) -> Result<AccessRequest, StorageError>;

    /// Reads a request by id, tenant-scoped.
    ///
    /// Returns `None` if the request does not exist in that tenant.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing rows.
    async fn get(
        &self,
        tenant_id: &TenantId,
        id: &RequestId,
    ) -> Result<Option<AccessRequest>, StorageError>;

    /// Lists pending requests in FIFO review order: `created_at` ascending,
    /// ties broken by id ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list_pending(&self, tenant_id: &TenantId)
    -> Result<Vec<AccessRequest>, StorageError>;

    /// Atomically transitions a pending request to approved and persists the
    /// granted manual policy as a single unit.
    ///
    /// This is the storage-level transaction boundary around the approve
    /// compound write: on any failure neither the status change nor the
    /// policy is visible to any reader.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the request does not exist in the
    /// tenant and `StorageError::Conflict` if it is no longer pending
    /// (concurrent deciders lose here).
    async fn approve(
        &self,
        tenant_id: &TenantId,
        id: &RequestId,
        actor_id: &ProfessionalId,
        at: OffsetDateTime,
        granted: AccessPolicy,
    ) -> Result<(AccessRequest, AccessPolicy), StorageError>;

    /// Transitions a pending request to rejected via compare-and-set.
    ///
    /// No policy is created.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the request does not exist in the
    /// tenant and `StorageError::Conflict` if it is no longer pending.
    async fn reject(
        &self,
        tenant_id: &TenantId,
        id: &RequestId,
        actor_id: &ProfessionalId,
        at: OffsetDateTime,
    ) -> Result<AccessRequest, StorageError>;
}

/// The append-only audit log.
///
/// No update or delete operation exists in this contract; corrections are
/// modeled as new compensating events.
#[async_trait]
pub trait AuditStorage: Send + Sync {
    /// Appends one audit row, assigning the tenant's next monotonic
    /// sequence number.
    ///
    /// Appends never fail silently.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` on storage failure; evaluation
    /// callers must fail closed on it.
    async fn append(
        &self,
        tenant_id: &TenantId,
        kind: AuditEventKind,
        at: OffsetDateTime,
    ) -> Result<AuditEvent, StorageError>;

    /// Queries audit rows matching the filter, ordered by timestamp
    /// ascending with the sequence number as tiebreak.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn query(
        &self,
        tenant_id: &TenantId,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditEvent>, StorageError>;
}
