//! Inspector configuration and rule document loading.
//!
//! Rule documents live in JSON or YAML files. [`load_rules`] picks the parser
//! from the file extension and validates debt types strictly, so a misspelled
//! `type` fails at load time instead of silently scoring zero.
//!
//! # Examples
//!
//! ```rust,no_run
//! use plan_guard::config::{InspectorConfig, Verbosity};
//!
//! let config = InspectorConfig::from_rules_path("config/rules.yml")?
//!     .with_verbosity(Verbosity::Basic);
//! # Ok::<(), plan_guard::error::PlanGuardError>(())
//! ```

use crate::core::RuleDocument;
use crate::formatters::ReportOptions;
use crate::logging::LogConfig;
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Which EXPLAIN variants are gathered for a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Plain `EXPLAIN` rows only
    Basic,
    /// Plain rows merged with the flattened `format=json` explain
    #[default]
    Detailed,
}

/// Everything an [`Inspector`](crate::inspector::Inspector) needs besides its
/// plan source.
#[derive(Debug, Clone)]
pub struct InspectorConfig {
    pub rules: RuleDocument,
    pub verbosity: Verbosity,
    /// Whether inspection starts enabled
    pub enabled: bool,
    /// Rendering options for logged reports
    pub report: ReportOptions,
    pub log: LogConfig,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            rules: RuleDocument::new(),
            verbosity: Verbosity::default(),
            enabled: true,
            report: ReportOptions::default(),
            log: LogConfig::default(),
        }
    }
}

impl InspectorConfig {
    pub fn new(rules: RuleDocument) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Creates a configuration from a rule file on disk.
    pub fn from_rules_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_rules(path)?))
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_report(mut self, report: ReportOptions) -> Self {
        self.report = report;
        self
    }

    /// Sets the footer appended to logged reports.
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.report = self.report.with_footer(footer);
        self
    }

    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}

/// Loads and validates a rule document from a `.json`, `.yaml` or `.yml` file.
///
/// # Errors
///
/// - [`PlanGuardError::RulesNotFound`] if the file does not exist
/// - [`PlanGuardError::UnsupportedRulesFormat`] for any other extension
/// - [`PlanGuardError::Serialization`] if the document does not parse
/// - [`PlanGuardError::InvalidRules`] if a debt spec has a missing or unknown type
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_rules(path: impl AsRef<Path>) -> Result<RuleDocument> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PlanGuardError::RulesNotFound {
            path: path.to_path_buf(),
        });
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_lowercase();

    let parse: fn(&str) -> Result<RuleDocument> = match extension.as_str() {
        "json" => RuleDocument::from_json_str,
        "yaml" | "yml" => RuleDocument::from_yaml_str,
        _ => {
            return Err(PlanGuardError::UnsupportedRulesFormat {
                extension: format!(".{extension}"),
            })
        }
    };

    let rules = parse(&std::fs::read_to_string(path)?)?;

    if let Err(e) = rules.validate() {
        warn!(error = %e, "Rejected rule document");
        return Err(e);
    }

    debug!(columns = rules.columns().count(), "Loaded rule document");
    Ok(rules)
}
