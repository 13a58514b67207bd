//! Query inspection against a live plan source.
//!
//! An [`Inspector`] owns a [`PlanSource`] that knows how to run `EXPLAIN` for a
//! query, and an [`InspectorConfig`] holding the rules. [`Inspector::analyse`]
//! returns the scored [`Analysis`]; [`Inspector::inspect`] is the
//! fire-and-forget variant a host wires into its query path: it renders the
//! report into the log and never fails the caller.
//!
//! # Examples
//!
//! ```rust
//! use plan_guard::config::{InspectorConfig, Verbosity};
//! use plan_guard::core::{ColumnRule, DebtSpec, Impact, PlanRow, RuleDocument, TagRule};
//! use plan_guard::inspector::{Inspector, PlanSource};
//! use plan_guard::prelude::*;
//! use serde_json::json;
//!
//! struct FixedPlan;
//!
//! impl PlanSource for FixedPlan {
//!     fn explain(&self, _query: &str) -> Result<Vec<PlanRow>> {
//!         Ok(vec![serde_json::from_value(json!({"table": "users", "type": "ALL"}))?])
//!     }
//! }
//!
//! let rules = RuleDocument::new().with_column(
//!     "type",
//!     ColumnRule::default().with_tag(
//!         "ALL",
//!         TagRule::new(Impact::Negative, "full scan").with_debt(DebtSpec::base(40.0)),
//!     ),
//! );
//! let config = InspectorConfig::new(rules).with_verbosity(Verbosity::Basic);
//! let inspector = Inspector::new(FixedPlan, config);
//!
//! let analysis = inspector.analyse("SELECT * FROM users")?;
//! assert_eq!(analysis.query_debt(), 40.0);
//!
//! let skipped = inspector.evade_inspection(|| inspector.inspect("SELECT 1"));
//! assert!(skipped.is_none());
//! # Ok::<(), PlanGuardError>(())
//! ```

use crate::config::{InspectorConfig, Verbosity};
use crate::core::{analyse, Analysis, PlanRow};
use crate::explain::{merge_plans, parse_detailed_explain};
use crate::formatters::render;
use crate::log_rule;
use crate::logging::truncate_field;
use crate::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, instrument, trace, warn, Level};

#[allow(clippy::expect_used)]
static EXPLAIN_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*EXPLAIN\b").expect("Hardcoded regex pattern should be valid"));

/// Something that can produce an execution plan for a query.
///
/// Implementations typically run `EXPLAIN <query>` on a database connection.
pub trait PlanSource {
    /// Returns one row per table of the basic `EXPLAIN` output.
    fn explain(&self, query: &str) -> Result<Vec<PlanRow>>;

    /// Returns the raw `EXPLAIN format=json` document, if the backend has one.
    fn explain_detailed(&self, _query: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

impl<S: PlanSource + ?Sized> PlanSource for &S {
    fn explain(&self, query: &str) -> Result<Vec<PlanRow>> {
        (**self).explain(query)
    }

    fn explain_detailed(&self, query: &str) -> Result<Option<String>> {
        (**self).explain_detailed(query)
    }
}

/// Returns true for statements that are themselves `EXPLAIN`s.
pub fn is_explain_statement(query: &str) -> bool {
    EXPLAIN_STATEMENT.is_match(query)
}

/// Scores queries from a [`PlanSource`] and logs the reports.
#[derive(Debug)]
pub struct Inspector<S> {
    source: S,
    config: InspectorConfig,
    enabled: AtomicBool,
}

impl<S: PlanSource> Inspector<S> {
    pub fn new(source: S, config: InspectorConfig) -> Self {
        let enabled = AtomicBool::new(config.enabled);
        Self {
            source,
            config,
            enabled,
        }
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Builds the plan for a query according to the configured verbosity.
    pub fn plan(&self, query: &str) -> Result<Vec<PlanRow>> {
        let basic = self.source.explain(query)?;
        if self.config.verbosity == Verbosity::Basic {
            return Ok(basic);
        }

        match self.source.explain_detailed(query)? {
            Some(document) => Ok(merge_plans(basic, parse_detailed_explain(&document)?)),
            None => Ok(basic),
        }
    }

    /// Explains and scores a query.
    ///
    /// Runs regardless of the enabled flag; only [`inspect`](Self::inspect)
    /// honours it.
    #[instrument(skip_all, fields(query = %truncate_field(query, self.config.log.max_field_length)))]
    pub fn analyse(&self, query: &str) -> Result<Analysis> {
        let plan = self.plan(query)?;
        let analysis = analyse(&plan, &self.config.rules);
        debug!(
            tables = analysis.table_count(),
            query_debt = analysis.query_debt(),
            "Analysed query"
        );
        Ok(analysis)
    }

    /// Renders an analysis with the configured report options.
    pub fn report(&self, analysis: &Analysis) -> Result<String> {
        render(analysis, &self.config.report)
    }

    /// Analyses a query and logs its report.
    ///
    /// Returns `None` without touching the plan source when inspection is
    /// disabled or the query is itself an `EXPLAIN`. Failures are logged at
    /// error level and swallowed.
    pub fn inspect(&self, query: &str) -> Option<Analysis> {
        if !self.is_enabled() {
            trace!("Inspection disabled, skipping query");
            return None;
        }
        if is_explain_statement(query) {
            trace!("Skipping EXPLAIN statement");
            return None;
        }

        let outcome = self
            .analyse(query)
            .and_then(|analysis| self.report(&analysis).map(|report| (analysis, report)));

        match outcome {
            Ok((analysis, report)) => {
                self.log_rule_details(&analysis);
                self.log_report(&report);
                Some(analysis)
            }
            Err(e) => {
                error!(
                    error = %e,
                    query = %truncate_field(query, self.config.log.max_field_length),
                    "Query inspection failed"
                );
                None
            }
        }
    }

    /// Runs `f` with inspection disabled, then restores the previous state.
    ///
    /// The previous state is restored even if `f` panics.
    pub fn evade_inspection<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = EvasionGuard {
            enabled: &self.enabled,
            previous: self.enabled.swap(false, Ordering::SeqCst),
        };
        f()
    }

    fn log_rule_details(&self, analysis: &Analysis) {
        let log = &self.config.log;
        for table in analysis.table_refs() {
            let Some(columns) = analysis.columns(table) else {
                continue;
            };
            for (column, column_analysis) in columns.iter() {
                for (tag, tag_analysis) in column_analysis.tags.iter() {
                    log_rule!(
                        log,
                        table = %table,
                        column,
                        tag,
                        impact = %tag_analysis.impact,
                        debt = tag_analysis.debt,
                        "Matched rule"
                    );
                }
            }
        }
    }

    fn log_report(&self, report: &str) {
        let level = self.config.log.base_level;
        if level == Level::ERROR {
            error!("{report}");
        } else if level == Level::WARN {
            warn!("{report}");
        } else if level == Level::INFO {
            info!("{report}");
        } else if level == Level::DEBUG {
            debug!("{report}");
        } else {
            trace!("{report}");
        }
    }
}

struct EvasionGuard<'a> {
    enabled: &'a AtomicBool,
    previous: bool,
}

impl Drop for EvasionGuard<'_> {
    fn drop(&mut self) {
        self.enabled.store(self.previous, Ordering::SeqCst);
    }
}
