//! Table formatting utilities for CLI list commands
//!
//! One formatter serves every list command so projects, parts and QC tests
//! come out the same way in each format.
//!
//! # Text Wrapping
//!
//! The table formatter supports text wrapping for narrow terminals:
//! - Use `TableConfig::with_wrap(width)` to enable word-wrapped multi-line rows
//! - CSV and ID formats remain single-line for pipability
//! - TSV supports wrapped output

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;
use crate::core::entity::{PartStatus, ProjectStatus};

/// Configuration for table output
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Maximum width for text columns before wrapping (None = truncate instead)
    pub wrap_width: Option<usize>,
    /// Show summary line after table (e.g., "5 part(s) found.")
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            wrap_width: None,
            show_summary: true,
        }
    }
}

impl TableConfig {
    /// Create config with text wrapping enabled at the specified width
    pub fn with_wrap(width: usize) -> Self {
        Self {
            wrap_width: Some(width),
            show_summary: true,
        }
    }

    /// Create config optimized for piping (no wrapping, no summary)
    pub fn for_pipe() -> Self {
        Self {
            wrap_width: None,
            show_summary: false,
        }
    }
}

/// Wrap text to fit within a maximum width, breaking at word boundaries
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    // Don't wrap if text already fits or width is too small to be useful
    if text.chars().count() <= max_width || max_width < 5 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_line.is_empty() {
            if word_len > max_width {
                // Word is longer than max width, force break
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(max_width).peekable();
                while let Some(chunk) = chunks.next() {
                    let piece: String = chunk.iter().collect();
                    if chunks.peek().is_some() {
                        lines.push(piece);
                    } else {
                        current_line = piece;
                    }
                }
            } else {
                current_line = word.to_string();
            }
        } else if current_line.chars().count() + 1 + word_len <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// A typed cell value
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Entity id, shown in cyan
    Id(String),
    Text(String),
    ProjectStatus(ProjectStatus),
    PartStatus(PartStatus),
    Number(usize),
    /// Weight or score in 0..=1, two decimals
    Weight(f64),
    /// Yes/no flag such as an NCR
    Flag(bool),
    Empty,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    pub fn optional(value: Option<&str>) -> Self {
        value.map_or(CellValue::Empty, CellValue::text)
    }

    /// Plain text with no styling or escaping
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) => s.clone(),
            CellValue::ProjectStatus(s) => s.to_string(),
            CellValue::PartStatus(s) => s.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Weight(w) => format!("{:.2}", w),
            CellValue::Flag(true) => "yes".to_string(),
            CellValue::Flag(false) => "no".to_string(),
            CellValue::Empty => String::new(),
        }
    }

    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Empty => 1,
            other => other.raw().chars().count(),
        }
    }

    /// Format for TSV output at the given width
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => format!("{:<width$}", style(truncate_str(id, width)).cyan(), width = width),
            CellValue::PartStatus(PartStatus::Qualified) | CellValue::ProjectStatus(ProjectStatus::Complete) => {
                format!("{:<width$}", style(self.raw()).green(), width = width)
            }
            CellValue::PartStatus(PartStatus::UnderReview) => {
                format!("{:<width$}", style(self.raw()).yellow(), width = width)
            }
            CellValue::Flag(true) => format!("{:<width$}", style("yes").red(), width = width),
            CellValue::Empty => format!("{:<width$}", "-", width = width),
            other => format!("{:<width$}", truncate_str(&other.raw(), width), width = width),
        }
    }

    /// Format for markdown output; pipes are escaped
    pub fn format_md(&self) -> String {
        match self {
            CellValue::Empty => "-".to_string(),
            other => other.raw().replace('|', "\\|"),
        }
    }
}

/// Column definition
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    /// Maximum width; content shrinks the column below this
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of table data
#[derive(Debug, Clone)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    config: TableConfig,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            config: TableConfig::default(),
        }
    }

    /// Configure the formatter with custom settings
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Output rows in a tabular format; JSON and YAML are left to the caller
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Csv => self.output_csv(rows),
            OutputFormat::Md => {
                print!("{}", self.render_md(rows));
                Ok(())
            }
            OutputFormat::Id => {
                for row in rows {
                    println!("{}", row.id);
                }
                Ok(())
            }
            _ => {
                self.output_tsv(rows);
                Ok(())
            }
        }
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(|v| v.display_width())
                    .max()
                    .unwrap_or(0);
                col.header.len().max(max_content.saturating_add(2)).min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = *w))
            .collect();
        println!("{}", header.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total_width));

        for row in rows {
            match self.config.wrap_width {
                Some(wrap_width) => self.output_tsv_row_wrapped(row, &widths, wrap_width),
                None => {
                    let parts: Vec<String> = self
                        .columns
                        .iter()
                        .zip(&widths)
                        .map(|(col, w)| match row.get(col.key) {
                            Some(value) => value.format_tsv(*w),
                            None => format!("{:<width$}", "-", width = *w),
                        })
                        .collect();
                    println!("{}", parts.join(" "));
                }
            }
        }

        if self.config.show_summary {
            println!();
            println!("{} {}(s) found.", style(rows.len()).cyan(), self.entity_name);
        }
    }

    fn output_tsv_row_wrapped(&self, row: &TableRow, widths: &[usize], wrap_width: usize) {
        let wrapped_cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|col| match row.get(col.key) {
                // Only free text wraps
                Some(value @ CellValue::Text(_)) => wrap_text(&value.raw(), wrap_width),
                Some(CellValue::Empty) | None => vec!["-".to_string()],
                Some(value) => vec![value.raw()],
            })
            .collect();

        let max_lines = wrapped_cells.iter().map(Vec::len).max().unwrap_or(1);
        for line_idx in 0..max_lines {
            let parts: Vec<String> = wrapped_cells
                .iter()
                .zip(widths)
                .map(|(lines, w)| {
                    let content = lines.get(line_idx).map(String::as_str).unwrap_or("");
                    format!("{:<width$}", content, width = *w)
                })
                .collect();
            println!("{}", parts.join(" ").trim_end());
        }

        // Blank line between multi-line rows for readability
        if max_lines > 1 {
            println!();
        }
    }

    fn output_csv(&self, rows: &[TableRow]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(std::io::stdout());
        writer
            .write_record(self.columns.iter().map(|c| c.key))
            .into_diagnostic()?;
        for row in rows {
            writer
                .write_record(
                    self.columns
                        .iter()
                        .map(|c| row.get(c.key).map(CellValue::raw).unwrap_or_default()),
                )
                .into_diagnostic()?;
        }
        writer.flush().into_diagnostic()
    }

    /// Markdown table via tabled
    pub fn render_md(&self, rows: &[TableRow]) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().map(|c| c.header.to_string()));
        for row in rows {
            builder.push_record(
                self.columns
                    .iter()
                    .map(|c| row.get(c.key).map_or_else(|| "-".to_string(), CellValue::format_md)),
            );
        }
        let mut table = builder.build().with(Style::markdown()).to_string();
        table.push('\n');
        table
    }
}
