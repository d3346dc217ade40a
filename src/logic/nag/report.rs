//! Report rendering
//!
//! Turns a check's result map into display order and prints it either as
//! an aligned text table or as JSON.

use std::collections::HashMap;

use serde::Serialize;

use super::{NagCheck, ReportRow};
use crate::error::NagResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a, R: Serialize> {
    tool: &'a str,
    description: &'a str,
    columns: &'a [&'a str],
    bugs: &'a [R],
}

/// Result rows in the check's display order
pub fn sorted_rows<C: NagCheck>(check: &C, results: HashMap<u64, C::Row>) -> Vec<C::Row> {
    let mut rows: Vec<C::Row> = results.into_values().collect();
    rows.sort_by(check.sort_columns());
    rows
}

pub fn render_report<C: NagCheck>(
    check: &C,
    results: HashMap<u64, C::Row>,
    format: ReportFormat,
) -> NagResult<String> {
    let rows = sorted_rows(check, results);

    match format {
        ReportFormat::Json => {
            let report = JsonReport {
                tool: check.name(),
                description: check.description(),
                columns: check.columns(),
                bugs: &rows,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
        ReportFormat::Text => Ok(render_table(check.description(), check.columns(), &rows)),
    }
}

fn render_table<R: ReportRow>(description: &str, columns: &[&str], rows: &[R]) -> String {
    let mut out = format!("{}\n\n", description);
    if rows.is_empty() {
        out.push_str("No bugs found.\n");
        return out;
    }

    let cells: Vec<Vec<String>> = rows.iter().map(ReportRow::values).collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}
