//! # plan-guard - Query Plan Debt Scoring for Rust
//!
//! plan-guard scores SQL execution plans against a declarative rule document
//! and reports the result as *debt*: a number that grows with every full scan,
//! missing index or oversized row estimate the plan reveals.
//!
//! ## Overview
//!
//! A rule document maps EXPLAIN columns (`type`, `possible_keys`, `rows`, ...)
//! to tag rules. Every plan value is normalized into one or more tags; each
//! matching tag carries an impact (negative, positive or caution), a message
//! and a debt spec. Numeric columns may also carry a threshold rule that fires
//! once an amount reaches a boundary. The debts add up per table, across
//! tables through a summary pseudo-table, and finally per query.
//!
//! ## Quick Start
//!
//! ```rust
//! use plan_guard::core::{analyse, PlanRow, RuleDocument, TableRef};
//! use plan_guard::formatters::{render, ReportOptions};
//! use serde_json::json;
//!
//! # fn example() -> plan_guard::error::Result<()> {
//! let rules = RuleDocument::from_yaml_str(r#"
//! type:
//!   rules:
//!     ALL:
//!       impact: negative
//!       message: full scan on $table
//!       suggestion: add an index usable by this query
//!       debt:
//!         type: base
//!         value: 100
//! rows:
//!   value_type: number
//!   rules:
//!     threshold:
//!       amount: 1000
//!       impact: negative
//!       message: the query reads $amount rows
//!       debt:
//!         type: threshold_relative
//!         value: 0.01
//! "#)?;
//!
//! let plan: Vec<PlanRow> = vec![serde_json::from_value(json!({
//!     "table": "orders", "type": "ALL", "rows": 5000
//! }))?];
//!
//! let analysis = analyse(&plan, &rules);
//! // 100 for the full scan, plus (5000 - 1000) * 0.01 on the table and again
//! // on the summary.
//! assert_eq!(analysis.debt_of(TableRef::Named("orders")), 140.0);
//! assert_eq!(analysis.query_debt(), 180.0);
//!
//! let report = render(&analysis, &ReportOptions::default().with_colors(false))?;
//! assert!(report.starts_with("query debt: 180 (Good Query)"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Live Inspection
//!
//! [`inspector::Inspector`] wraps a [`inspector::PlanSource`] (anything that can
//! run `EXPLAIN` for a query) and logs a report for every inspected query
//! through `tracing`. Inspection never fails the caller: errors are logged and
//! swallowed, `EXPLAIN` statements are skipped, and
//! [`evade_inspection`](inspector::Inspector::evade_inspection) suspends it for
//! a block of work.
//!
//! ## Architecture
//!
//! - **`core`**: rule document types, value normalization, debt computation,
//!   the evaluator and the [`core::Analysis`] aggregate
//! - **`explain`**: flattening and merging of basic and detailed EXPLAIN output
//! - **`config`**: [`config::InspectorConfig`] and rule file loading
//! - **`inspector`**: the plan source seam and the inspection lifecycle
//! - **`formatters`**: human and JSON reports
//! - **`logging`**: logging configuration and subscriber setup

pub mod config;
pub mod core;
pub mod error;
pub mod explain;
pub mod formatters;
pub mod inspector;
pub mod logging;
pub mod prelude;
