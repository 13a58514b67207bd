//! The analysis aggregate: per-table results and running debt totals.

use super::debt::{find_debt_range, DebtRange};
use super::ordered::OrderedMap;
use super::transform::CanonicalValue;
use super::Impact;
use serde::Serialize;
use std::fmt;

/// A tag that matched a column value (or the column's threshold).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagAnalysis {
    pub impact: Impact,
    /// Message template, expanded at render time
    pub message: String,
    /// Suggestion template, expanded at render time
    pub suggestion: String,
    pub debt: f64,
    /// The amount that triggered a threshold tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

/// The analysis of one plan column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnAnalysis {
    pub value: CanonicalValue,
    pub amount: f64,
    pub tags: OrderedMap<TagAnalysis>,
}

impl ColumnAnalysis {
    /// Total debt of every matched tag.
    pub fn debt(&self) -> f64 {
        self.tags.values().map(|tag| tag.debt).sum()
    }

    /// Returns true if any matched tag has the given impact.
    pub fn has_impact(&self, impact: Impact) -> bool {
        self.tags.values().any(|tag| tag.impact == impact)
    }
}

/// Column analyses of one table, in plan column order.
pub type ColumnAnalyses = OrderedMap<ColumnAnalysis>;

/// A registered table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableAnalysis {
    /// Sequential id assigned at registration, starting at 1
    pub id: usize,
    pub name: String,
    pub debt: f64,
    pub analysis: ColumnAnalyses,
}

/// Addresses either a real table or the summary pseudo-table.
///
/// The summary lives in its own slot, so a plan table literally named
/// `summary` never collides with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRef<'a> {
    Named(&'a str),
    Summary,
}

impl TableRef<'_> {
    pub fn name(&self) -> &str {
        match self {
            TableRef::Named(name) => name,
            TableRef::Summary => "summary",
        }
    }
}

impl fmt::Display for TableRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The result of analysing one query.
///
/// Built by [`analyse`](crate::core::analyse): one [`register_table`] call per
/// plan row, then one [`register_summary`] call. Re-registering a table name
/// replaces its entry but keeps the debt already added to the total, and
/// registering the summary twice counts its debt twice.
///
/// [`register_table`]: Analysis::register_table
/// [`register_summary`]: Analysis::register_summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    tables: OrderedMap<TableAnalysis>,
    #[serde(skip)]
    table_count: usize,
    table_debt: f64,
    summary: ColumnAnalyses,
    summary_debt: f64,
}

impl Analysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table's column analyses and adds its debt to the total.
    pub fn register_table(&mut self, name: impl Into<String>, analysis: ColumnAnalyses, debt: f64) {
        let name = name.into();
        self.table_count += 1;
        self.table_debt += debt;
        self.tables.insert(
            name.clone(),
            TableAnalysis {
                id: self.table_count,
                name,
                debt,
                analysis,
            },
        );
    }

    /// Sets the summary analysis and adds its debt to the total.
    pub fn register_summary(&mut self, analysis: ColumnAnalyses, debt: f64) {
        self.summary = analysis;
        self.summary_debt += debt;
    }

    /// Total debt of the query: every table plus the summary.
    pub fn query_debt(&self) -> f64 {
        self.table_debt + self.summary_debt
    }

    /// Sum of the debt of every registered table.
    pub fn table_debt(&self) -> f64 {
        self.table_debt
    }

    pub fn summary_debt(&self) -> f64 {
        self.summary_debt
    }

    /// Returns the first range containing the query debt.
    pub fn query_debt_range<'r>(&self, ranges: &'r [DebtRange]) -> Option<&'r DebtRange> {
        find_debt_range(ranges, self.query_debt())
    }

    /// Registered tables in registration order.
    pub fn tables(&self) -> impl Iterator<Item = &TableAnalysis> {
        self.tables.values()
    }

    pub fn table(&self, name: &str) -> Option<&TableAnalysis> {
        self.tables.get(name)
    }

    pub fn table_count(&self) -> usize {
        self.table_count
    }

    pub fn summary(&self) -> &ColumnAnalyses {
        &self.summary
    }

    /// Every table followed by the summary pseudo-table, in report order.
    pub fn table_refs(&self) -> Vec<TableRef<'_>> {
        self.tables
            .keys()
            .map(TableRef::Named)
            .chain(std::iter::once(TableRef::Summary))
            .collect()
    }

    /// The column analyses of a table or of the summary.
    pub fn columns(&self, table: TableRef<'_>) -> Option<&ColumnAnalyses> {
        match table {
            TableRef::Named(name) => self.tables.get(name).map(|t| &t.analysis),
            TableRef::Summary => Some(&self.summary),
        }
    }

    pub fn column(&self, table: TableRef<'_>, column: &str) -> Option<&ColumnAnalysis> {
        self.columns(table)?.get(column)
    }

    pub fn tag(&self, table: TableRef<'_>, column: &str, tag: &str) -> Option<&TagAnalysis> {
        self.column(table, column)?.tags.get(tag)
    }

    /// The debt attributed to a table or to the summary.
    pub fn debt_of(&self, table: TableRef<'_>) -> f64 {
        match table {
            TableRef::Named(name) => self.tables.get(name).map_or(0.0, |t| t.debt),
            TableRef::Summary => self.summary_debt,
        }
    }
}
