//! Report formatting for query analyses.
//!
//! [`HumanFormatter`] renders an [`Analysis`] as impact-filtered, word-wrapped
//! text for consoles and logs. [`JsonFormatter`] serializes it for programmatic
//! consumption.
//!
//! # Examples
//!
//! ```rust
//! use plan_guard::core::{analyse, RuleDocument};
//! use plan_guard::formatters::{AnalysisFormatter, HumanFormatter, ReportOptions};
//!
//! let analysis = analyse(&[], &RuleDocument::new());
//! let formatter = HumanFormatter::with_config(ReportOptions::default().with_colors(false));
//! let output = formatter.format(&analysis).unwrap();
//! assert!(output.starts_with("query debt: 0"));
//! ```

use crate::core::{Analysis, DebtRange, Impact, MessageKind, TableRef};
use crate::prelude::*;
use serde::Serialize;
use std::fmt::Write;

/// Width used when no wrap width is configured.
pub const DEFAULT_WRAP_WIDTH: usize = 100;

const FIELD_INDENT: &str = "  ";

/// Options controlling which parts of an analysis are rendered and how.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub show_negative: bool,
    pub show_positive: bool,
    pub show_caution: bool,
    /// Maximum line width for wrapped values and messages
    pub wrap_width: usize,
    /// Cut wrapped text at the first overflow instead of wrapping
    pub cut: bool,
    /// Omit the footer
    pub skip_footer: bool,
    /// Text appended after the report
    pub footer: String,
    /// Verdict buckets for the query debt; empty disables the verdict
    pub debt_ranges: Vec<DebtRange>,
    /// Whether to use ANSI colours
    pub use_colors: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            show_negative: true,
            show_positive: false,
            show_caution: true,
            wrap_width: DEFAULT_WRAP_WIDTH,
            cut: false,
            skip_footer: false,
            footer: String::new(),
            debt_ranges: crate::core::default_debt_ranges(),
            use_colors: true,
        }
    }
}

impl ReportOptions {
    /// Shows every impact category.
    pub fn all() -> Self {
        Self {
            show_positive: true,
            ..Self::default()
        }
    }

    /// Sets which impact categories are shown.
    pub fn with_impacts(mut self, negative: bool, positive: bool, caution: bool) -> Self {
        self.show_negative = negative;
        self.show_positive = positive;
        self.show_caution = caution;
        self
    }

    pub fn with_wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = width;
        self
    }

    pub fn with_cut(mut self, cut: bool) -> Self {
        self.cut = cut;
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    pub fn with_skip_footer(mut self, skip: bool) -> Self {
        self.skip_footer = skip;
        self
    }

    pub fn with_debt_ranges(mut self, ranges: Vec<DebtRange>) -> Self {
        self.debt_ranges = ranges;
        self
    }

    /// Sets whether to use colorized output.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Returns true if tags with this impact are rendered.
    pub fn shows(&self, impact: Impact) -> bool {
        match impact {
            Impact::Negative => self.show_negative,
            Impact::Positive => self.show_positive,
            Impact::Caution => self.show_caution,
            Impact::Unknown => false,
        }
    }

    fn paint(&self, colour: crate::core::Colour, text: &str) -> String {
        if self.use_colors {
            colour.paint(text)
        } else {
            text.to_string()
        }
    }
}

/// Trait for rendering an analysis into an output format.
pub trait AnalysisFormatter {
    /// Formats an analysis with the formatter's own configuration.
    fn format(&self, analysis: &Analysis) -> Result<String>;

    /// Formats an analysis with explicit options.
    fn format_with_config(&self, analysis: &Analysis, _config: &ReportOptions) -> Result<String> {
        self.format(analysis)
    }
}

/// Renders an analysis as human-readable text.
///
/// The report opens with the query debt and its verdict, then shows one block
/// per impact category and table (the summary pseudo-table last). Tables
/// without a matching tag in a category are left out of that category.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: ReportOptions,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReportOptions) -> Self {
        Self { config }
    }
}

impl AnalysisFormatter for HumanFormatter {
    fn format(&self, analysis: &Analysis) -> Result<String> {
        self.format_with_config(analysis, &self.config)
    }

    fn format_with_config(&self, analysis: &Analysis, config: &ReportOptions) -> Result<String> {
        let mut output = String::new();

        write!(output, "query debt: {}", analysis.query_debt())?;
        if let Some(range) = analysis.query_debt_range(&config.debt_ranges) {
            write!(output, " ({})", config.paint(range.colour, &range.message))?;
        }
        writeln!(output)?;

        for impact in Impact::REPORTED {
            if !config.shows(impact) {
                continue;
            }
            for table in analysis.table_refs() {
                write_table_block(&mut output, analysis, table, impact, config)?;
            }
        }

        if !config.skip_footer && !config.footer.is_empty() {
            writeln!(output)?;
            writeln!(output, "{}", config.footer)?;
        }

        Ok(output)
    }
}

fn write_table_block(
    output: &mut String,
    analysis: &Analysis,
    table: TableRef<'_>,
    impact: Impact,
    config: &ReportOptions,
) -> Result<()> {
    let Some(columns) = analysis.columns(table) else {
        return Ok(());
    };
    if !columns.values().any(|column| column.has_impact(impact)) {
        return Ok(());
    }

    writeln!(output)?;
    writeln!(
        output,
        "[{}] table: {table}",
        config.paint(impact.colour(), impact.as_str())
    )?;
    writeln!(output, "debt: {}", analysis.debt_of(table))?;

    for (column, column_analysis) in columns.iter() {
        if !column_analysis.has_impact(impact) {
            continue;
        }
        writeln!(output, "column: {column}")?;

        for (tag, tag_analysis) in column_analysis.tags.iter() {
            if tag_analysis.impact != impact {
                continue;
            }
            let value = column_analysis.value.to_string();
            let debt = tag_analysis.debt.to_string();
            let message = analysis.dynamic_message(table, column, tag, MessageKind::Message);
            let suggestion = analysis.dynamic_message(table, column, tag, MessageKind::Suggestion);

            write_field(output, "value", &value, config)?;
            writeln!(
                output,
                "{FIELD_INDENT}impact: {}",
                config.paint(impact.colour(), impact.as_str())
            )?;
            writeln!(
                output,
                "{FIELD_INDENT}debt: {}",
                config.paint(impact.colour(), &debt)
            )?;
            write_field(output, "message", &message, config)?;
            if !suggestion.trim().is_empty() {
                write_field(output, "suggestion", &suggestion, config)?;
            }
        }
    }

    Ok(())
}

// Continuation lines align under the first character of the field's text.
fn write_field(output: &mut String, label: &str, text: &str, config: &ReportOptions) -> Result<()> {
    let prefix = format!("{FIELD_INDENT}{label}: ");
    let width = config.wrap_width.saturating_sub(prefix.len()).max(1);
    let wrapped = word_wrap(text, width, config.cut);
    let padding = " ".repeat(prefix.len());

    for (i, line) in wrapped.lines().enumerate() {
        if i == 0 {
            writeln!(output, "{prefix}{line}")?;
        } else {
            writeln!(output, "{padding}{line}")?;
        }
    }
    if wrapped.is_empty() {
        writeln!(output, "{}", prefix.trim_end())?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    query_debt: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    verdict: Option<&'a DebtRange>,
    analysis: &'a Analysis,
}

/// Serializes an analysis, with its query debt and verdict, as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: ReportOptions,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            config: ReportOptions::default(),
            pretty: true,
        }
    }

    pub fn with_config(config: ReportOptions) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisFormatter for JsonFormatter {
    fn format(&self, analysis: &Analysis) -> Result<String> {
        self.format_with_config(analysis, &self.config)
    }

    fn format_with_config(&self, analysis: &Analysis, config: &ReportOptions) -> Result<String> {
        let report = JsonReport {
            query_debt: analysis.query_debt(),
            verdict: analysis.query_debt_range(&config.debt_ranges),
            analysis,
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        json.map_err(|e| PlanGuardError::Serialization(format!("Failed to serialize analysis: {e}")))
    }
}

/// Renders an analysis as text with the given options.
pub fn render(analysis: &Analysis, options: &ReportOptions) -> Result<String> {
    HumanFormatter::new().format_with_config(analysis, options)
}

/// Greedily wraps `text` at whitespace so lines stay within `width` characters.
///
/// Words longer than `width` get a line of their own. With `cut`, output stops
/// at the first line break and ends in `...`.
pub fn word_wrap(text: &str, width: usize, cut: bool) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let line_len = if line.is_empty() {
            0
        } else {
            line.chars().count() + 1
        };

        if line_len + word.chars().count() > width {
            if cut {
                lines.push(line);
                return format!("{}...", lines.join("\n").trim());
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
        }

        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}
