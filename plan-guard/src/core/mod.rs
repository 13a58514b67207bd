//! Core rule evaluation types for plan-guard.
//!
//! This module holds the engine that scores an execution plan against a rule
//! document and accumulates the result.
//!
//! ## Overview
//!
//! - **[`RuleDocument`]**: plan column name to [`ColumnRule`], each with tag
//!   rules and an optional threshold
//! - **[`normalize`] / [`amount_of`]**: turn a raw plan value into a
//!   [`CanonicalValue`] and a numeric amount
//! - **[`debt_for`]**: base, relative and threshold-relative debt
//! - **[`analyse`]**: evaluates every plan row, then the cross-table summary
//! - **[`Analysis`]**: the aggregate, with per-table and per-query debt and
//!   `$variable` message expansion
//!
//! ## Architecture
//!
//! ```text
//! plan rows ──► evaluate_table (per row) ──► Analysis::register_table
//!                     │
//!                     └─► SummaryStats ──► evaluate_summary ──► Analysis::register_summary
//! ```
//!
//! ## Example
//!
//! ```rust
//! use plan_guard::core::{analyse, ColumnRule, DebtSpec, Impact, RuleDocument, TagRule, TableRef};
//! use plan_guard::core::MessageKind;
//! use serde_json::json;
//!
//! let rules = RuleDocument::new().with_column(
//!     "type",
//!     ColumnRule::default().with_tag(
//!         "ALL",
//!         TagRule::new(Impact::Negative, "full scan of $table")
//!             .with_debt(DebtSpec::base(40.0)),
//!     ),
//! );
//!
//! let plan = vec![serde_json::from_value(json!({"table": "orders", "type": "ALL"})).unwrap()];
//! let analysis = analyse(&plan, &rules);
//!
//! assert_eq!(analysis.query_debt(), 40.0);
//! let message = analysis.dynamic_message(TableRef::Named("orders"), "type", "ALL", MessageKind::Message);
//! assert_eq!(message, "full scan of orders");
//! ```

mod analysis;
mod debt;
mod evaluator;
mod impact;
mod message;
mod ordered;
mod rules;
mod transform;

pub use analysis::{Analysis, ColumnAnalyses, ColumnAnalysis, TableAnalysis, TableRef, TagAnalysis};
pub use debt::{debt_for, default_debt_ranges, find_debt_range, DebtRange};
pub use evaluator::{
    analyse, evaluate_summary, evaluate_table, table_name, PlanRow, SummaryStats, ROWS_COLUMN,
    TABLE_COLUMN, UNNAMED_TABLE,
};
pub use impact::{Colour, Impact};
pub use message::MessageKind;
pub use ordered::OrderedMap;
pub use rules::{ColumnRule, DebtKind, DebtSpec, RuleDocument, TagRule, ValueType, THRESHOLD_TAG};
pub use transform::{amount_of, normalize, parse_float, value_text, CanonicalValue, ABSENT};
