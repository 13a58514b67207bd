//! Error types for plan-guard.
//!
//! Only the collaborator-facing steps fail loudly: loading a rule document
//! from disk, parsing EXPLAIN output and talking to a [`PlanSource`]. Rule
//! evaluation never returns errors; data-shape surprises degrade to zero debt
//! instead.
//!
//! [`PlanSource`]: crate::inspector::PlanSource

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for plan-guard.
#[derive(Error, Debug)]
pub enum PlanGuardError {
    /// The rule document could not be found at the configured path.
    #[error(
        "Failed to load the rule file from '{}'. The file may be missing or there is a problem with the path",
        path.display()
    )]
    RulesNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// The rule document has an extension that no loader understands.
    #[error("'{extension}' extension is not supported for rules")]
    UnsupportedRulesFormat { extension: String },

    /// The rule document failed strict validation.
    #[error("Invalid rules: {0}")]
    InvalidRules(String),

    /// The plan source failed to produce a plan.
    #[error("Plan source error: {message}")]
    PlanSource {
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while rendering a report.
    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Error when parsing EXPLAIN output.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, PlanGuardError>`.
pub type Result<T> = std::result::Result<T, PlanGuardError>;

impl PlanGuardError {
    /// Creates a new plan source error.
    pub fn plan_source(message: impl Into<String>) -> Self {
        Self::PlanSource {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new plan source error with a source error.
    pub fn plan_source_with_source(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::PlanSource {
            message: message.into(),
            source: Some(source),
        }
    }
}

impl From<serde_json::Error> for PlanGuardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for PlanGuardError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<PlanGuardError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| prefix(msg, e.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| prefix(&f(), e.into()))
    }
}

fn prefix(msg: &str, err: PlanGuardError) -> PlanGuardError {
    match err {
        PlanGuardError::Internal(inner) => PlanGuardError::Internal(format!("{msg}: {inner}")),
        PlanGuardError::Parse(inner) => PlanGuardError::Parse(format!("{msg}: {inner}")),
        other => PlanGuardError::Internal(format!("{msg}: {other}")),
    }
}
