//! Debt computation and debt-range verdicts.

use super::rules::{DebtKind, TagRule};
use super::Colour;
use serde::{Deserialize, Serialize};

/// Computes the debt a matched tag contributes for the given amount.
///
/// Missing debt specs, unknown debt types and `threshold_relative` on a rule
/// without a boundary all score zero.
pub fn debt_for(rule: &TagRule, amount: f64) -> f64 {
    let Some(debt) = &rule.debt else {
        return 0.0;
    };

    match &debt.kind {
        Some(DebtKind::Base) => debt.value,
        Some(DebtKind::Relative) => amount * debt.value,
        Some(DebtKind::ThresholdRelative) => match rule.amount {
            Some(boundary) => (amount - boundary) * debt.value,
            None => 0.0,
        },
        Some(DebtKind::Other(_)) | None => 0.0,
    }
}

/// A qualitative verdict for query debt falling in `[low, high)`.
///
/// A missing upper bound leaves the range open-ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtRange {
    pub range: (f64, Option<f64>),
    pub message: String,
    #[serde(default)]
    pub colour: Colour,
}

impl DebtRange {
    pub fn new(low: f64, high: Option<f64>, message: impl Into<String>, colour: Colour) -> Self {
        Self {
            range: (low, high),
            message: message.into(),
            colour,
        }
    }

    /// Returns true if `debt` lies within this half-open range.
    pub fn contains(&self, debt: f64) -> bool {
        let (low, high) = self.range;
        debt >= low && high.map_or(true, |high| debt < high)
    }
}

/// The debt ranges used when none are configured.
pub fn default_debt_ranges() -> Vec<DebtRange> {
    vec![
        DebtRange::new(0.0, Some(200.0), "Good Query", Colour::Green),
        DebtRange::new(200.0, Some(500.0), "Potentially Bad Query", Colour::Yellow),
        DebtRange::new(500.0, None, "Bad Query", Colour::Red),
    ]
}

/// Returns the first range containing `debt`.
pub fn find_debt_range(ranges: &[DebtRange], debt: f64) -> Option<&DebtRange> {
    ranges.iter().find(|range| range.contains(debt))
}
