//! Prelude for commonly used types and traits in plan-guard.

pub use crate::config::{InspectorConfig, Verbosity};
pub use crate::error::{ErrorContext, PlanGuardError, Result};
pub use crate::formatters::{AnalysisFormatter, ReportOptions};
pub use crate::inspector::{Inspector, PlanSource};
pub use crate::logging::LogConfig;
