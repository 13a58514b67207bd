//! Property-based tests for plan-guard's scoring engine.
//!
//! ## Test Categories
//!
//! ### 1. Debt Modes
//! - `base` debt ignores the amount
//! - `relative` debt scales linearly with the amount
//! - `threshold_relative` debt is zero at the boundary and grows above it
//!
//! ### 2. Threshold Activation
//! - Amounts at or above the boundary fire the threshold tag; lower ones do not
//!
//! ### 3. Value Normalization
//! - Null numbers measure zero
//! - Delimited arrays split into trimmed elements
//!
//! ### 4. Aggregation
//! - Query debt is the sum of table debts and summary debt

use plan_guard::core::{
    amount_of, analyse, debt_for, normalize, CanonicalValue, ColumnRule, DebtSpec, Impact,
    PlanRow, RuleDocument, TableRef, TagRule, ValueType, THRESHOLD_TAG,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn row(value: Value) -> PlanRow {
    serde_json::from_value(value).unwrap()
}

fn threshold_rules(boundary: f64) -> RuleDocument {
    RuleDocument::new().with_column(
        "filtered",
        ColumnRule::new(ValueType::Number).with_tag(
            THRESHOLD_TAG,
            TagRule::threshold(boundary, Impact::Negative, "$amount over $table")
                .with_debt(DebtSpec::threshold_relative(2.0)),
        ),
    )
}

proptest! {
    /// Base debt is the configured value whatever the amount.
    #[test]
    fn test_base_debt_ignores_amount(value in 0u32..10_000, amount in 0u32..1_000_000) {
        let rule = TagRule::new(Impact::Negative, "m").with_debt(DebtSpec::base(value as f64));
        prop_assert_eq!(debt_for(&rule, 1.0), value as f64);
        prop_assert_eq!(debt_for(&rule, amount as f64), value as f64);
    }

    /// Relative debt at ten times the amount is ten times the debt.
    #[test]
    fn test_relative_debt_is_linear(value in 0u32..1_000, amount in 0u32..10_000) {
        let rule = TagRule::new(Impact::Negative, "m").with_debt(DebtSpec::relative(value as f64));
        let single = debt_for(&rule, amount as f64);
        prop_assert_eq!(debt_for(&rule, amount as f64 * 10.0), single * 10.0);
    }

    /// Threshold-relative debt measures the excess over the boundary.
    #[test]
    fn test_threshold_relative_debt(boundary in 0u32..100_000, excess in 0u32..100_000) {
        let rule = TagRule::threshold(boundary as f64, Impact::Negative, "m")
            .with_debt(DebtSpec::threshold_relative(3.0));
        prop_assert_eq!(debt_for(&rule, boundary as f64), 0.0);
        prop_assert_eq!(debt_for(&rule, (boundary + excess) as f64), excess as f64 * 3.0);
    }

    /// The threshold tag fires exactly from the boundary upwards.
    #[test]
    fn test_threshold_activation(boundary in 1u32..1_000_000) {
        let rules = threshold_rules(boundary as f64);

        let at = analyse(&[row(json!({"table": "t", "filtered": boundary}))], &rules);
        prop_assert!(at.tag(TableRef::Named("t"), "filtered", THRESHOLD_TAG).is_some());

        let below = analyse(&[row(json!({"table": "t", "filtered": boundary - 1}))], &rules);
        prop_assert!(below.tag(TableRef::Named("t"), "filtered", THRESHOLD_TAG).is_none());
        prop_assert_eq!(below.query_debt(), 0.0);
    }

    /// A null number always measures zero, whatever else the rule says.
    #[test]
    fn test_null_number_amount_is_zero(delimiter in proptest::option::of("[,;|]")) {
        let mut rule = ColumnRule::new(ValueType::Number);
        rule.delimiter = delimiter;
        let value = normalize(Some(&Value::Null), &rule);
        prop_assert!(value.is_absent());
        prop_assert_eq!(amount_of(&value, &rule), 0.0);
    }

    /// Splitting a delimited list trims elements and counts them.
    #[test]
    fn test_array_split_trims(items in proptest::collection::vec("[a-z_]{1,12}", 1..8), pad in " {0,3}") {
        let text = items.iter().map(|item| format!("{pad}{item}{pad}")).collect::<Vec<_>>().join(",");
        let rule = ColumnRule::new(ValueType::Array).with_delimiter(",");
        let value = normalize(Some(&Value::String(text)), &rule);

        prop_assert_eq!(&value, &CanonicalValue::List(items.clone()));
        prop_assert_eq!(amount_of(&value, &rule), items.len() as f64);
    }

    /// Query debt equals the table debts plus the summary debt.
    #[test]
    fn test_query_debt_is_additive(
        tables in proptest::collection::vec((any::<bool>(), any::<bool>(), 1u32..5_000), 1..6)
    ) {
        let rules = RuleDocument::new()
            .with_column("type", ColumnRule::default().with_tag(
                "ALL", TagRule::new(Impact::Negative, "full scan").with_debt(DebtSpec::base(40.0)),
            ))
            .with_column("select_type", ColumnRule::default().with_tag(
                "SIMPLE", TagRule::new(Impact::Caution, "simple").with_debt(DebtSpec::base(5.0)),
            ))
            .with_column("rows", ColumnRule::new(ValueType::Number).with_tag(
                THRESHOLD_TAG,
                TagRule::threshold(1.0, Impact::Negative, "rows").with_debt(DebtSpec::threshold_relative(1.0)),
            ));

        let plan: Vec<PlanRow> = tables
            .iter()
            .enumerate()
            .map(|(i, (full_scan, simple, rows))| row(json!({
                "table": format!("t{i}"),
                "type": if *full_scan { "ALL" } else { "ref" },
                "select_type": if *simple { "SIMPLE" } else { "PRIMARY" },
                "rows": rows,
            })))
            .collect();

        let analysis = analyse(&plan, &rules);
        let table_sum: f64 = analysis.tables().map(|table| table.debt).sum();
        prop_assert_eq!(analysis.table_debt(), table_sum);
        prop_assert_eq!(analysis.query_debt(), table_sum + analysis.summary_debt());

        for (i, (full_scan, simple, rows)) in tables.iter().enumerate() {
            let expected = if *full_scan { 40.0 } else { 0.0 }
                + if *simple { 5.0 } else { 0.0 }
                + (*rows as f64 - 1.0);
            let name = format!("t{i}");
            prop_assert_eq!(analysis.debt_of(TableRef::Named(&name)), expected);
        }
    }
}
