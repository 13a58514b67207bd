//! Assembly of plan rows from EXPLAIN output.
//!
//! Running EXPLAIN is the job of a [`PlanSource`]; this module only reshapes
//! what it returns. A basic `EXPLAIN` yields one flat row per table. A detailed
//! `EXPLAIN format=json` yields a nested tree whose per-table nodes are
//! flattened under the `detailed#` prefix and merged into the basic rows by
//! table name.
//!
//! [`PlanSource`]: crate::inspector::PlanSource

use crate::core::{table_name, value_text, OrderedMap, PlanRow, TABLE_COLUMN};
use crate::error::{PlanGuardError, Result};
use serde_json::{Map, Value};
use tracing::debug;

/// Prefix for flattened detailed-explain attributes.
pub const DETAILED_PREFIX: &str = "detailed";

/// Separator between nested key segments.
pub const KEY_SEPARATOR: char = '#';

const DETAILED_TABLE_NAME: &str = "table_name";

// Wrapper operations unwrapped, in this order, before reaching the tables.
const WRAPPER_OPERATIONS: [&str; 3] = [
    "ordering_operation",
    "grouping_operation",
    "duplicates_removal",
];

/// Flattens nested objects into a single level, joining keys with `#`.
///
/// ```rust
/// use plan_guard::explain::flatten;
/// use serde_json::json;
///
/// let nested = json!({"cost_info": {"read_cost": "1.00"}, "rows": 5});
/// let flat = flatten(nested.as_object().unwrap(), "detailed");
/// assert_eq!(flat["detailed#cost_info#read_cost"], json!("1.00"));
/// assert_eq!(flat["detailed#rows"], json!(5));
/// ```
pub fn flatten(map: &Map<String, Value>, prefix: &str) -> PlanRow {
    let mut flat = PlanRow::new();
    flatten_into(&mut flat, map, prefix);
    flat
}

fn flatten_into(flat: &mut PlanRow, map: &Map<String, Value>, prefix: &str) {
    for (key, value) in map {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}{KEY_SEPARATOR}{key}")
        };
        match value {
            Value::Object(nested) => flatten_into(flat, nested, &key),
            other => {
                flat.insert(key, other.clone());
            }
        }
    }
}

/// Extracts the per-table nodes of a detailed (`format=json`) explain.
///
/// Returns an empty list when the document has no `query_block` or no table
/// nodes.
pub fn parse_detailed_explain(json: &str) -> Result<Vec<Map<String, Value>>> {
    let document: Value = serde_json::from_str(json)
        .map_err(|e| PlanGuardError::Parse(format!("Invalid detailed explain JSON: {e}")))?;

    let Some(mut block) = document.get("query_block") else {
        return Ok(Vec::new());
    };
    for operation in WRAPPER_OPERATIONS {
        if let Some(inner) = block.get(operation) {
            block = inner;
        }
    }

    if let Some(Value::Array(loops)) = block.get("nested_loop") {
        return Ok(loops
            .iter()
            .filter_map(|node| node.get("table").and_then(Value::as_object).cloned())
            .collect());
    }

    Ok(block
        .get("table")
        .and_then(Value::as_object)
        .cloned()
        .into_iter()
        .collect())
}

/// Merges basic plan rows with detailed table nodes by table name.
///
/// Tables appear in basic order, followed by tables only the detailed explain
/// knows about. Detailed-only rows get a `table` column so they can still be
/// named.
pub fn merge_plans(basic: Vec<PlanRow>, detailed: Vec<Map<String, Value>>) -> Vec<PlanRow> {
    let mut merged: OrderedMap<PlanRow> = OrderedMap::new();
    for row in basic {
        merged.insert(table_name(&row), row);
    }

    let mut extra: Vec<(String, PlanRow)> = Vec::new();
    for node in detailed {
        let name = node
            .get(DETAILED_TABLE_NAME)
            .map_or_else(|| crate::core::UNNAMED_TABLE.to_string(), value_text);
        let flat = flatten(&node, DETAILED_PREFIX);
        extra.push((name, flat));
    }

    let mut rows: Vec<(String, PlanRow)> = merged
        .iter()
        .map(|(name, row)| (name.to_string(), row.clone()))
        .collect();

    for (name, flat) in extra {
        match rows.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, row)) => row.extend(flat),
            None => {
                let mut row = PlanRow::new();
                row.insert(TABLE_COLUMN.to_string(), Value::String(name.clone()));
                row.extend(flat);
                rows.push((name, row));
            }
        }
    }

    debug!(tables = rows.len(), "Merged basic and detailed plans");
    rows.into_iter().map(|(_, row)| row).collect()
}
