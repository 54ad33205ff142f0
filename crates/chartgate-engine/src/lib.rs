//! # chartgate-engine
//!
//! Clinical-document access-control policy engine for the ChartGate
//! platform.
//!
//! The engine decides, for every (professional, document) pair inside a
//! tenant, whether access is allowed or denied, manages the lifecycle of
//! manual access requests, and appends a tamper-evident audit row for every
//! decision and workflow transition.
//!
//! ## Modules
//!
//! - [`policy`] - policy store service: validated writes with audit side
//!   effects
//! - [`workflow`] - the pending → approved/rejected request state machine
//! - [`evaluator`] - the pure allow/deny decision function
//! - [`report`] - read-only aggregations for compliance reporting
//! - [`config`] - engine configuration
//! - [`error`] - the engine error taxonomy
//! - [`engine`] - the [`AccessEngine`] facade bundling the above
//!
//! ## Fail-closed evaluation
//!
//! A denied evaluation is a successful result. The evaluator errors only
//! when a storage dependency is unreachable, and callers must then treat
//! access as denied: no access is ever granted on infrastructure failure,
//! and the engine performs no internal retries that could mask a
//! security-relevant outage.

pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod policy;
pub mod report;
pub mod workflow;

pub use config::{EngineConfig, EvaluationConfig, ReportingConfig};
pub use engine::AccessEngine;
pub use error::{EngineError, ErrorCategory};
pub use evaluator::{AccessDecision, DecisionEvaluator};
pub use policy::PolicyService;
pub use report::{
    DenialRateReport, ExpiryForecastReport, ProfessionalActivityEntry,
    ProfessionalActivityReport, Report, ReportKind, ReportingEngine, StalePendingReport,
};
pub use workflow::RequestWorkflow;

/// Type alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use chartgate_engine::prelude::*;
/// ```
pub mod prelude {
    pub use crate::EngineResult;
    pub use crate::config::{EngineConfig, EvaluationConfig, ReportingConfig};
    pub use crate::engine::AccessEngine;
    pub use crate::error::{EngineError, ErrorCategory};
    pub use crate::evaluator::{AccessDecision, DecisionEvaluator};
    pub use crate::policy::PolicyService;
    pub use crate::report::{Report, ReportKind, ReportingEngine};
    pub use crate::workflow::RequestWorkflow;
}
