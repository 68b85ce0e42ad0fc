//! Rendering of projected grids and import reports

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::*;
use unicode_width::UnicodeWidthStr;

use crate::import::ImportReport;
use crate::projection::Grid;

/// Output format for listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    Csv,
    Json,
}

/// Render a grid in the requested format
pub fn render(grid: &Grid, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(grid)),
        OutputFormat::Csv => render_csv(grid),
        OutputFormat::Json => render_json(grid),
    }
}

/// Aligned table; columns are padded by display width
pub fn render_table(grid: &Grid) -> String {
    let mut widths: Vec<usize> = grid.headers.iter().map(|h| h.width()).collect();
    for row in &grid.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.width());
            }
        }
    }

    let mut out = String::new();

    let header: Vec<String> = grid
        .headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w).bold().to_string())
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  ").dimmed().to_string());
    out.push('\n');

    for row in &grid.rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad(cell, *w))
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }

    if grid.is_empty() {
        out.push_str(&format!("{}\n", "(no rows)".dimmed()));
    }

    out
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

fn render_csv(grid: &Grid) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(&grid.headers)
        .context("Failed to write CSV header")?;
    for row in &grid.rows {
        writer.write_record(row).context("Failed to write CSV row")?;
    }

    let bytes = writer.into_inner().context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn render_json(grid: &Grid) -> Result<String> {
    let records: Vec<serde_json::Value> = grid
        .rows
        .iter()
        .map(|row| {
            let object = grid
                .headers
                .iter()
                .zip(row)
                .map(|(h, v)| (h.to_string(), serde_json::Value::String(v.clone())))
                .collect();
            serde_json::Value::Object(object)
        })
        .collect();

    serde_json::to_string_pretty(&records).context("Failed to format JSON output")
}

/// Human summary of an import
pub fn render_report(report: &ImportReport) -> String {
    let mut out = format!(
        "{} Imported {} of {} row(s) from {}",
        "✓".green(),
        report.imported.to_string().bold(),
        report.rows_read,
        report.file_name.cyan()
    );

    if report.skipped > 0 {
        out.push_str(&format!(
            "\n  {} row(s) skipped: missing required field",
            report.skipped
        ));
    }
    if report.replaced_fields > 0 {
        out.push_str(&format!(
            "\n  {} malformed value(s) replaced with defaults",
            report.replaced_fields.to_string().yellow()
        ));
    }
    if report.dangling_references > 0 {
        out.push_str(&format!(
            "\n  {} order(s) reference an unknown sales representative",
            report.dangling_references.to_string().yellow()
        ));
    }

    out
}
