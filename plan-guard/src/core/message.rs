//! Expansion of `$variable` placeholders in rule messages and suggestions.
//!
//! Well-known names resolve against the tag being rendered:
//!
//! | variable            | value                                   |
//! |---------------------|-----------------------------------------|
//! | `$amount`           | the column's amount                     |
//! | `$value`            | the column's normalized value           |
//! | `$impact`           | the tag's impact                        |
//! | `$debt`, `$score`   | the tag's debt                          |
//! | `$table`            | the table name                          |
//! | `$column`, `$tag`   | the column and tag names                |
//!
//! Any other name refers to another column of the same table: `$key` is that
//! column's value and `$amount_key` its amount. Names that cannot be resolved
//! stay in the text as written. Expansion is a single pass, so a resolved
//! value containing `$` text is inserted literally.

use super::analysis::{Analysis, TableRef};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static VARIABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    // This regex is compile-time constant and known to be valid
    #[allow(clippy::expect_used)]
    Regex::new(r"\$([A-Za-z0-9_]+)").expect("Hard-coded regex pattern should be valid")
});

const AMOUNT_PREFIX: &str = "amount_";

/// Which template of a tag to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Message,
    Suggestion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variable<'a> {
    Amount,
    Value,
    Impact,
    Debt,
    Table,
    Column,
    Tag,
    ColumnAmount(&'a str),
    ColumnValue(&'a str),
}

impl<'a> Variable<'a> {
    fn parse(name: &'a str) -> Self {
        match name {
            "amount" => Variable::Amount,
            "value" => Variable::Value,
            "impact" => Variable::Impact,
            "debt" | "score" => Variable::Debt,
            "table" => Variable::Table,
            "column" => Variable::Column,
            "tag" => Variable::Tag,
            other => match other.strip_prefix(AMOUNT_PREFIX) {
                Some(column) => Variable::ColumnAmount(column),
                None => Variable::ColumnValue(other),
            },
        }
    }
}

impl Analysis {
    /// Expands the message or suggestion of a matched tag.
    ///
    /// Returns an empty string if the tag is not part of this analysis.
    pub fn dynamic_message(
        &self,
        table: TableRef<'_>,
        column: &str,
        tag: &str,
        kind: MessageKind,
    ) -> String {
        let Some(tag_analysis) = self.tag(table, column, tag) else {
            return String::new();
        };
        let template = match kind {
            MessageKind::Message => &tag_analysis.message,
            MessageKind::Suggestion => &tag_analysis.suggestion,
        };
        self.resolve(template, table, column, tag)
    }

    /// Expands every `$variable` in `template` for the given tag.
    pub fn resolve(&self, template: &str, table: TableRef<'_>, column: &str, tag: &str) -> String {
        let mut resolved: HashMap<&str, Option<String>> = HashMap::new();
        for caps in VARIABLE_REGEX.captures_iter(template) {
            if let Some(name) = caps.get(1).map(|m| m.as_str()) {
                resolved
                    .entry(name)
                    .or_insert_with(|| self.variable_value(Variable::parse(name), table, column, tag));
            }
        }

        if resolved.is_empty() {
            return template.to_string();
        }

        VARIABLE_REGEX
            .replace_all(template, |caps: &Captures| {
                match resolved.get(&caps[1]) {
                    Some(Some(value)) => value.clone(),
                    _ => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    fn variable_value(
        &self,
        variable: Variable<'_>,
        table: TableRef<'_>,
        column: &str,
        tag: &str,
    ) -> Option<String> {
        match variable {
            Variable::Amount => self.column(table, column).map(|c| c.amount.to_string()),
            Variable::Value => self.column(table, column).map(|c| c.value.to_string()),
            Variable::Impact => self.tag(table, column, tag).map(|t| t.impact.to_string()),
            Variable::Debt => self.tag(table, column, tag).map(|t| t.debt.to_string()),
            Variable::Table => Some(table.name().to_string()),
            Variable::Column => Some(column.to_string()),
            Variable::Tag => Some(tag.to_string()),
            Variable::ColumnAmount(other) => {
                self.column(table, other).map(|c| c.amount.to_string())
            }
            Variable::ColumnValue(other) => self.column(table, other).map(|c| c.value.to_string()),
        }
    }
}
