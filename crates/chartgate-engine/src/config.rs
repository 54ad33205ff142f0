//! Engine configuration.
//!
//! All values have sensible defaults and deserialize from TOML with
//! humantime duration strings.
//!
//! # Example (TOML)
//!
//! ```toml
//! [evaluation]
//! log_allowed = true
//! log_denied = true
//!
//! [reporting]
//! stale_request_threshold = "7d"
//! expiry_forecast_window = "30d"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root engine configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Decision evaluator options.
    pub evaluation: EvaluationConfig,

    /// Reporting engine defaults.
    pub reporting: ReportingConfig,
}

/// Decision evaluator options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Emit an info-level trace line for allowed evaluations.
    /// When disabled they are still traced at debug level; the audit row is
    /// written regardless.
    pub log_allowed: bool,

    /// Emit an info-level trace line for denied evaluations.
    pub log_denied: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            log_allowed: true,
            log_denied: true,
        }
    }
}

/// Reporting engine defaults, used when a report request leaves the
/// corresponding parameter unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Age beyond which a pending request counts as stale.
    #[serde(with = "humantime_serde")]
    pub stale_request_threshold: Duration,

    /// Horizon for the policy-expiry forecast.
    #[serde(with = "humantime_serde")]
    pub expiry_forecast_window: Duration,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            stale_request_threshold: Duration::from_secs(7 * 24 * 3600), // 7 days
            expiry_forecast_window: Duration::from_secs(30 * 24 * 3600), // 30 days
        }
    }
}
