//! Rule evaluation over plan rows.
//!
//! Each plan row is matched column by column against the rule document. Every
//! column value (each element, for array columns) is looked up as a tag name
//! under the column's rule, and the column's threshold fires when its amount
//! reaches the configured boundary. Cross-table statistics gathered along the
//! way are scored once more as a summary pseudo-table.

use super::analysis::{Analysis, ColumnAnalyses, ColumnAnalysis, TagAnalysis};
use super::debt::debt_for;
use super::ordered::OrderedMap;
use super::rules::{ColumnRule, RuleDocument, TagRule, ValueType, THRESHOLD_TAG};
use super::transform::{amount_of, normalize, parse_float, value_text, CanonicalValue};
use serde_json::Value;
use tracing::{debug, instrument};

/// One table's row of an execution plan: plan column name to raw value.
pub type PlanRow = serde_json::Map<String, Value>;

/// The plan column naming the scanned table.
pub const TABLE_COLUMN: &str = "table";

/// The plan column (and summary statistic) carrying estimated row counts.
pub const ROWS_COLUMN: &str = "rows";

/// Name used for plan rows that carry no `table` column.
pub const UNNAMED_TABLE: &str = "unknown";

/// Statistics accumulated across every table of a plan.
///
/// Currently holds `rows`: the product of every table's estimated row count,
/// an estimate of the joined cardinality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryStats {
    values: OrderedMap<f64>,
}

impl SummaryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one plan column's raw value into the running statistics.
    pub fn fold(&mut self, column: &str, raw: &Value) {
        if column == ROWS_COLUMN {
            let rows = self.values.get(ROWS_COLUMN).copied().unwrap_or(1.0);
            self.values.insert(ROWS_COLUMN, rows * raw_float(raw));
        }
    }

    pub fn get(&self, stat: &str) -> Option<f64> {
        self.values.get(stat).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Evaluates one plan row, folding its values into `summary`.
///
/// Returns the per-column analyses and the table's total debt. Columns without
/// a rule still feed the summary but contribute nothing else.
pub fn evaluate_table(
    row: &PlanRow,
    summary: &mut SummaryStats,
    rules: &RuleDocument,
) -> (ColumnAnalyses, f64) {
    let mut analysis = ColumnAnalyses::new();
    let mut debt = 0.0;

    for (column, raw) in row {
        summary.fold(column, raw);

        let Some(column_rule) = rules.column(column) else {
            continue;
        };

        let column_analysis = apply_rules(column, column_rule, Some(raw));
        debt += column_analysis.debt();
        analysis.insert(column.as_str(), column_analysis);
    }

    (analysis, debt)
}

/// Scores the accumulated summary statistics like an ordinary plan row.
pub fn evaluate_summary(rules: &RuleDocument, summary: &SummaryStats) -> (ColumnAnalyses, f64) {
    let mut analysis = ColumnAnalyses::new();
    let mut debt = 0.0;

    for (stat, value) in summary.iter() {
        let Some(column_rule) = rules.column(stat) else {
            continue;
        };

        let column_analysis = apply_summary_rules(stat, column_rule, value);
        debt += column_analysis.debt();
        analysis.insert(stat, column_analysis);
    }

    (analysis, debt)
}

/// Analyses a full plan against a rule document.
///
/// Tables are registered in plan order; the summary is registered last.
///
/// # Examples
///
/// ```rust
/// use plan_guard::core::{analyse, PlanRow, RuleDocument};
/// use serde_json::json;
///
/// let rules = RuleDocument::from_value(json!({
///     "select_type": {"rules": {"SIMPLE": {
///         "impact": "caution",
///         "message": "full scan",
///         "debt": {"type": "base", "value": 5}
///     }}}
/// })).unwrap();
///
/// let row: PlanRow = serde_json::from_value(json!({
///     "table": "users", "select_type": "SIMPLE", "rows": "1000"
/// })).unwrap();
///
/// let analysis = analyse(&[row], &rules);
/// assert_eq!(analysis.query_debt(), 5.0);
/// ```
#[instrument(skip_all, fields(tables = plan.len()))]
pub fn analyse(plan: &[PlanRow], rules: &RuleDocument) -> Analysis {
    let mut analysis = Analysis::new();
    let mut summary = SummaryStats::new();

    for row in plan {
        let name = table_name(row);
        let (table_analysis, table_debt) = evaluate_table(row, &mut summary, rules);
        debug!(
            table = %name,
            columns = table_analysis.len(),
            debt = table_debt,
            "Evaluated table"
        );
        analysis.register_table(name, table_analysis, table_debt);
    }

    let (summary_analysis, summary_debt) = evaluate_summary(rules, &summary);
    debug!(debt = summary_debt, "Evaluated summary");
    analysis.register_summary(summary_analysis, summary_debt);

    debug!(query_debt = analysis.query_debt(), "Analysis complete");
    analysis
}

/// The name of the table a plan row describes.
pub fn table_name(row: &PlanRow) -> String {
    match row.get(TABLE_COLUMN) {
        None | Some(Value::Null) => UNNAMED_TABLE.to_string(),
        Some(value) => value_text(value),
    }
}

fn apply_rules(column: &str, rule: &ColumnRule, raw: Option<&Value>) -> ColumnAnalysis {
    let value = normalize(raw, rule);
    let amount = amount_of(&value, rule);
    score(column, rule, value, amount)
}

// Summary statistics are plain floats and may overflow to infinity, which
// `serde_json::Value` cannot hold, so number columns keep the float as-is.
fn apply_summary_rules(column: &str, rule: &ColumnRule, stat: f64) -> ColumnAnalysis {
    let value = normalize(Some(&Value::String(stat.to_string())), rule);
    let amount = match rule.value_type {
        ValueType::Number => stat,
        _ => amount_of(&value, rule),
    };
    score(column, rule, value, amount)
}

fn score(column: &str, rule: &ColumnRule, value: CanonicalValue, amount: f64) -> ColumnAnalysis {
    let mut tags = OrderedMap::new();

    for tag in value.tags() {
        let Some(tag_rule) = rule.tag(tag) else {
            continue;
        };
        let debt = debt_for(tag_rule, amount);
        debug!(column, tag, debt, "Matched tag");
        tags.insert(tag, tag_analysis(tag_rule, debt, None));
    }

    if let Some((threshold, boundary)) = rule.threshold() {
        if amount >= boundary {
            let debt = debt_for(threshold, amount);
            debug!(column, amount, boundary, debt, "Threshold reached");
            tags.insert(THRESHOLD_TAG, tag_analysis(threshold, debt, Some(amount)));
        }
    }

    ColumnAnalysis {
        value,
        amount,
        tags,
    }
}

fn tag_analysis(rule: &TagRule, debt: f64, amount: Option<f64>) -> TagAnalysis {
    TagAnalysis {
        impact: rule.impact,
        message: rule.message.clone(),
        suggestion: rule.suggestion.clone(),
        debt,
        amount,
    }
}

fn raw_float(raw: &Value) -> f64 {
    match raw {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(text) => parse_float(text),
        _ => 0.0,
    }
}
