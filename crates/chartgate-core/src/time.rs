//! Time helpers shared across the engine.

use time::OffsetDateTime;

/// Returns the current UTC timestamp.
///
/// All engine timestamps (policy creation, workflow decisions, audit rows)
/// are taken in UTC through this helper.
#[must_use]
pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}
