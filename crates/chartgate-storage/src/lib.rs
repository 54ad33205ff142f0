//! # chartgate-storage
//!
//! Storage abstraction layer for the ChartGate access-control engine.
//!
//! This crate defines the async traits every storage backend must implement:
//!
//! - [`PolicyStorage`] - access policy rows (logical delete only)
//! - [`RequestStorage`] - access request rows and their compare-and-set
//!   state transitions, including the atomic approve+grant compound write
//! - [`AuditStorage`] - the append-only audit log
//!
//! All traits are tenant-parameterized on every operation: cross-tenant
//! lookups are structurally impossible, and no implementation ever holds a
//! cross-tenant lock.
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `chartgate-db-memory` - concurrent in-memory backend

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::{AuditStorage, PolicyStorage, RequestStorage};
pub use types::{AuditFilter, PolicySearchParams};
