//! End-to-end tests: rule documents and plans in, debt and reports out.

use plan_guard::core::{analyse, Analysis, MessageKind, PlanRow, RuleDocument, TableRef};
use plan_guard::formatters::{
    render, AnalysisFormatter, HumanFormatter, JsonFormatter, ReportOptions,
};
use serde_json::{json, Value};

fn plan(rows: Value) -> Vec<PlanRow> {
    serde_json::from_value(rows).unwrap()
}

fn plain() -> ReportOptions {
    ReportOptions::default().with_colors(false)
}

const MYSQL_RULES: &str = r#"
select_type:
  rules:
    SIMPLE:
      impact: caution
      message: full scan
      debt:
        type: base
        value: 5
type:
  rules:
    ALL:
      impact: negative
      message: "Entire $table table is scanned to find matching rows, you have $amount_rows rows."
      suggestion: "Add an index on a column used in the WHERE clause of $table"
      debt:
        type: base
        value: 100
    const:
      impact: positive
      message: "Single row lookup on $table"
      debt:
        type: base
        value: 0
possible_keys:
  value_type: array
  delimiter: ","
  rules:
    absent:
      impact: negative
      message: "There are no possible keys for $table table to be used"
      debt:
        type: base
        value: 50
    threshold:
      amount: 3
      impact: caution
      message: "$amount possible keys: $value"
      debt:
        type: relative
        value: 10
rows:
  value_type: number
  rules:
    threshold:
      amount: 1000
      impact: negative
      message: "$amount rows scanned"
      debt:
        type: threshold_relative
        value: 0.5
"#;

fn mysql_rules() -> RuleDocument {
    RuleDocument::from_yaml_str(MYSQL_RULES).unwrap()
}

#[test]
fn test_end_to_end_scenario() {
    let rules = RuleDocument::from_json_str(
        r#"{"select_type":{"rules":{"SIMPLE":{"impact":"caution","message":"full scan","debt":{"type":"base","value":5}}}}}"#,
    )
    .unwrap();
    let analysis = analyse(
        &plan(json!([{"table": "users", "select_type": "SIMPLE", "rows": "1000"}])),
        &rules,
    );

    assert_eq!(analysis.debt_of(TableRef::Named("users")), 5.0);
    assert_eq!(analysis.query_debt(), 5.0);

    let report = render(&analysis, &plain()).unwrap();
    assert!(report.contains("[caution] table: users"));
    assert!(report.contains("column: select_type"));
    assert!(report.contains("message: full scan"));
}

#[test]
fn test_mysql_style_plan() {
    let analysis = analyse(
        &plan(json!([
            {"id": 1, "select_type": "SIMPLE", "table": "orders", "type": "ALL",
             "possible_keys": null, "key": null, "rows": 4000},
            {"id": 1, "select_type": "SIMPLE", "table": "users", "type": "const",
             "possible_keys": "PRIMARY,index_users_on_email, index_users_on_name", "rows": 1}
        ])),
        &mysql_rules(),
    );

    // orders: SIMPLE 5 + ALL 100 + no keys 50 + (4000 - 1000) * 0.5
    assert_eq!(analysis.debt_of(TableRef::Named("orders")), 1655.0);
    // users: SIMPLE 5 + const 0 + 3 keys * 10
    assert_eq!(analysis.debt_of(TableRef::Named("users")), 35.0);
    // summary: rows 4000 * 1 = 4000, (4000 - 1000) * 0.5
    assert_eq!(analysis.summary_debt(), 1500.0);
    assert_eq!(analysis.query_debt(), 3190.0);

    let message = analysis.dynamic_message(
        TableRef::Named("orders"),
        "type",
        "ALL",
        MessageKind::Message,
    );
    assert_eq!(
        message,
        "Entire orders table is scanned to find matching rows, you have 4000 rows."
    );

    let keys = analysis.dynamic_message(
        TableRef::Named("users"),
        "possible_keys",
        "threshold",
        MessageKind::Message,
    );
    assert_eq!(
        keys,
        "3 possible keys: PRIMARY, index_users_on_email, index_users_on_name"
    );
}

#[test]
fn test_template_resolution() {
    let rules = RuleDocument::from_value(json!({
        "rows": {"value_type": "number", "rules": {"threshold": {
            "amount": 1, "impact": "negative", "message": "scanned $amount rows, $unknownvar"
        }}}
    }))
    .unwrap();
    let analysis = analyse(&plan(json!([{"table": "t", "rows": 42}])), &rules);

    let message =
        analysis.dynamic_message(TableRef::Named("t"), "rows", "threshold", MessageKind::Message);
    assert_eq!(message, "scanned 42 rows, $unknownvar");
}

#[test]
fn test_report_filtering_by_impact() {
    let rules = mysql_rules();
    let analysis = analyse(
        &plan(json!([{"table": "lookup", "type": "const"}])),
        &rules,
    );

    let hidden = render(&analysis, &plain()).unwrap();
    assert!(!hidden.contains("lookup"));

    let shown = render(&analysis, &plain().with_impacts(false, true, false)).unwrap();
    assert!(shown.contains("[positive] table: lookup"));
    assert!(shown.contains("message: Single row lookup on lookup"));
}

#[test]
fn test_verdict_and_footer() {
    let analysis = analyse(
        &plan(json!([{"table": "orders", "type": "ALL", "possible_keys": null}])),
        &mysql_rules(),
    );
    assert_eq!(analysis.query_debt(), 150.0);

    let report = render(&analysis, &plain().with_footer("-- see the query guide")).unwrap();
    assert!(report.starts_with("query debt: 150 (Good Query)\n"));
    assert!(report.ends_with("\n-- see the query guide\n"));

    let skipped = render(
        &analysis,
        &plain().with_footer("-- see the query guide").with_skip_footer(true),
    )
    .unwrap();
    assert!(!skipped.contains("query guide"));
}

#[test]
fn test_table_named_summary_does_not_collide() {
    let rules = mysql_rules();
    let analysis = analyse(
        &plan(json!([{"table": "summary", "type": "ALL", "possible_keys": "PRIMARY", "rows": 2000}])),
        &rules,
    );

    assert_eq!(analysis.debt_of(TableRef::Named("summary")), 600.0);
    assert_eq!(analysis.debt_of(TableRef::Summary), 500.0);
    assert!(analysis.column(TableRef::Summary, "rows").is_some());
    assert!(analysis.column(TableRef::Summary, "type").is_none());
}

#[test]
fn test_empty_plan() {
    let analysis = analyse(&[], &mysql_rules());
    assert_eq!(analysis, Analysis::new());
    assert_eq!(analysis.query_debt(), 0.0);
    assert!(analysis.table_refs().iter().all(|t| *t == TableRef::Summary));
}

#[test]
fn test_json_report() {
    let analysis = analyse(
        &plan(json!([{"table": "orders", "type": "ALL", "possible_keys": null}])),
        &mysql_rules(),
    );

    let output = JsonFormatter::new().with_pretty(false).format(&analysis).unwrap();
    let report: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["query_debt"], json!(150.0));
    assert_eq!(report["verdict"]["message"], json!("Good Query"));
    assert_eq!(
        report["analysis"]["tables"]["orders"]["analysis"]["type"]["tags"]["ALL"]["debt"],
        json!(100.0)
    );

    let human = HumanFormatter::with_config(plain()).format(&analysis).unwrap();
    assert!(human.contains("[negative] table: orders"));
}
