//! # chartgate-db-memory
//!
//! In-memory storage backend for the ChartGate access-control engine.
//!
//! [`MemoryStorage`] implements all three storage traits over concurrent
//! maps:
//!
//! - Policy and request tables on `dashmap` (per-entry exclusive access
//!   gives the compare-and-set transition guarantees)
//! - The audit log behind a `tokio` RwLock with per-tenant monotonic
//!   sequence counters
//!
//! The backend is fully tenant-partitioned and intended for tests, local
//! development and single-node deployments.

pub mod storage;

pub use storage::MemoryStorage;
