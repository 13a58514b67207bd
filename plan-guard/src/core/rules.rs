//! Rule document model.
//!
//! A rule document maps plan column names to [`ColumnRule`]s. Each column rule
//! says how to normalize the column's raw value and which tags (value matches)
//! or threshold carry impact, messages and debt.
//!
//! ```yaml
//! select_type:
//!   rules:
//!     SIMPLE:
//!       impact: caution
//!       message: full scan
//!       debt: { type: base, value: 5 }
//! rows:
//!   value_type: number
//!   rules:
//!     threshold:
//!       amount: 100
//!       impact: negative
//!       message: "$amount rows scanned"
//!       debt: { type: threshold_relative, value: 0.01 }
//! ```
//!
//! Documents are parsed leniently: a missing or unknown debt type scores zero
//! and missing messages are empty. [`RuleDocument::validate`] reports unknown
//! debt types for callers that want to reject them up front.

use super::ordered::OrderedMap;
use super::Impact;
use crate::error::{PlanGuardError, Result};
use serde::{Deserialize, Serialize};

/// The reserved tag name holding a column's threshold rule.
pub const THRESHOLD_TAG: &str = "threshold";

/// How a column's raw value is normalized and measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Value is split on the column's delimiter; amount is the element count
    Array,
    /// Value is matched as a single tag; amount is the value parsed as a float
    Number,
    /// Value is matched as a single tag; amount is its length. Unknown type
    /// names fall back to this.
    #[default]
    #[serde(other)]
    String,
}

/// The way a matched tag turns an amount into debt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DebtKind {
    /// Constant debt, independent of the amount
    Base,
    /// Debt proportional to the amount
    Relative,
    /// Debt proportional to how far the amount exceeds the threshold boundary
    ThresholdRelative,
    /// A type name the engine does not know; scores zero
    Other(String),
}

impl DebtKind {
    pub fn as_str(&self) -> &str {
        match self {
            DebtKind::Base => "base",
            DebtKind::Relative => "relative",
            DebtKind::ThresholdRelative => "threshold_relative",
            DebtKind::Other(name) => name,
        }
    }
}

impl From<String> for DebtKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "base" => DebtKind::Base,
            "relative" => DebtKind::Relative,
            "threshold_relative" => DebtKind::ThresholdRelative,
            _ => DebtKind::Other(name),
        }
    }
}

impl From<DebtKind> for String {
    fn from(kind: DebtKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A debt specification: `{type, value}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DebtSpec {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DebtKind>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: f64,
}

impl DebtSpec {
    pub fn base(value: f64) -> Self {
        Self {
            kind: Some(DebtKind::Base),
            value,
        }
    }

    pub fn relative(value: f64) -> Self {
        Self {
            kind: Some(DebtKind::Relative),
            value,
        }
    }

    pub fn threshold_relative(value: f64) -> Self {
        Self {
            kind: Some(DebtKind::ThresholdRelative),
            value,
        }
    }
}

/// A tag rule, or the threshold rule when stored under [`THRESHOLD_TAG`].
///
/// `message` and `suggestion` are templates that may contain `$name`
/// placeholders, expanded when the analysis is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TagRule {
    #[serde(default)]
    pub impact: Impact,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt: Option<DebtSpec>,
    /// Boundary at or above which a threshold rule fires
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<f64>,
}

impl TagRule {
    /// Creates a tag rule with the given impact and message and no debt.
    pub fn new(impact: Impact, message: impl Into<String>) -> Self {
        Self {
            impact,
            message: message.into(),
            ..Self::default()
        }
    }

    /// Creates a threshold rule firing at `amount` and above.
    pub fn threshold(amount: f64, impact: Impact, message: impl Into<String>) -> Self {
        Self {
            amount: Some(amount),
            ..Self::new(impact, message)
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }

    pub fn with_debt(mut self, debt: DebtSpec) -> Self {
        self.debt = Some(debt);
        self
    }
}

/// Configuration for one plan column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ColumnRule {
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub rules: OrderedMap<TagRule>,
}

impl ColumnRule {
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            ..Self::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Adds a tag rule; use [`THRESHOLD_TAG`] as the name to set the threshold.
    pub fn with_tag(mut self, tag: impl Into<String>, rule: TagRule) -> Self {
        self.rules.insert(tag, rule);
        self
    }

    /// The configured delimiter, ignoring an empty one.
    pub fn delimiter(&self) -> Option<&str> {
        self.delimiter.as_deref().filter(|d| !d.is_empty())
    }

    /// Looks up an ordinary tag rule. The reserved threshold tag never matches.
    pub fn tag(&self, tag: &str) -> Option<&TagRule> {
        if tag == THRESHOLD_TAG {
            return None;
        }
        self.rules.get(tag)
    }

    /// The threshold rule and its boundary, if one is configured.
    pub fn threshold(&self) -> Option<(&TagRule, f64)> {
        let rule = self.rules.get(THRESHOLD_TAG)?;
        rule.amount.map(|amount| (rule, amount))
    }
}

/// A full rule document: plan column name to [`ColumnRule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct RuleDocument {
    columns: OrderedMap<ColumnRule>,
}

impl RuleDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, column: impl Into<String>, rule: ColumnRule) -> Self {
        self.columns.insert(column, rule);
        self
    }

    /// Returns the rule configured for `column`.
    pub fn column(&self, column: &str) -> Option<&ColumnRule> {
        self.columns.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnRule)> {
        self.columns.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Parses a rule document from an already-deserialized JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Checks every debt spec names a known debt type.
    ///
    /// Evaluation itself scores unknown types as zero; this lets loaders
    /// reject misspelled types instead of silently losing debt.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        for (column, column_rule) in self.columns.iter() {
            for (tag, tag_rule) in column_rule.rules.iter() {
                let Some(debt) = &tag_rule.debt else {
                    continue;
                };
                match &debt.kind {
                    None => problems.push(format!("{column}/{tag}: missing debt type")),
                    Some(DebtKind::Other(name)) => {
                        problems.push(format!("{column}/{tag}: unknown debt type '{name}'"))
                    }
                    Some(_) => {}
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(PlanGuardError::InvalidRules(problems.join("; ")))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn into_f64(self) -> f64 {
        match self {
            Numeric::Number(n) => n,
            Numeric::Text(text) => super::transform::parse_float(&text),
        }
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Numeric>::deserialize(deserializer)?.map_or(0.0, Numeric::into_f64))
}

fn lenient_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Numeric>::deserialize(deserializer)?.map(Numeric::into_f64))
}
