//! # chartgate-core
//!
//! Core domain model for the ChartGate clinical-document access-control
//! engine.
//!
//! This crate defines the entities shared by every other ChartGate crate:
//!
//! - Typed identifiers for tenants, professionals, documents, policies and
//!   access requests
//! - [`AccessPolicy`] with its closed scope, duration and management variants
//! - [`AccessRequest`] and its approval state machine states
//! - Append-only audit event types
//! - Domain validation errors
//!
//! All entities are tenant-scoped: every record carries a [`TenantId`] and no
//! operation in the platform ever crosses a tenant boundary.

pub mod audit;
pub mod error;
pub mod id;
pub mod policy;
pub mod request;
pub mod time;

pub use audit::{AccessOutcome, AuditEvent, AuditEventKind};
pub use error::{CoreError, Result};
pub use id::{DocumentId, DocumentType, PolicyId, ProfessionalId, RequestId, TenantId};
pub use policy::{AccessPolicy, GrantDuration, ManagementType, PolicyDuration, PolicyScope};
pub use request::{AccessRequest, RequestStatus};
pub use time::now_utc;
