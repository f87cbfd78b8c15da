use std::io::{self, Write};

use tracing::warn;

use crate::model::Table;

const RULE_WIDTH: usize = 60;

fn format_line(index: &str, index_width: usize, cells: &[&str], widths: &[usize]) -> String {
    let mut line = format!("{index:<index_width$}");
    for (cell, &width) in cells.iter().zip(widths) {
        line.push_str("  ");
        line.push_str(&format!("{cell:>width$}"));
    }
    line.trim_end().to_string()
}

fn render_grid(table: &Table, max_rows: usize) -> Vec<String> {
    let names = table.column_names();
    let shown = &table.rows[..table.rows.len().min(max_rows)];
    let rows = shown
        .iter()
        .map(|row| {
            (0..names.len())
                .map(|column| row.get(column).and_then(Option::as_deref).unwrap_or(""))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let index_width = rows.len().saturating_sub(1).to_string().len();
    let mut widths = names.iter().map(|name| name.chars().count()).collect::<Vec<_>>();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = names.iter().map(String::as_str).collect::<Vec<_>>();
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_line("", index_width, &header, &widths));
    for (index, row) in rows.iter().enumerate() {
        lines.push(format_line(&index.to_string(), index_width, row, &widths));
    }
    lines
}

/// Writes a summary of each table: dimensions, header and the first
/// `max_rows` rows.
///
/// # Errors
///
/// Returns any error raised by `out`.
pub fn preview_to<W: Write>(out: &mut W, tables: &[Table], max_rows: usize) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    for (index, table) in tables.iter().enumerate() {
        writeln!(out, "\n{rule}")?;
        writeln!(
            out,
            "TABLE {} - Dimensions: {} rows x {} columns",
            index + 1,
            table.row_count(),
            table.column_count()
        )?;
        writeln!(out, "{rule}")?;

        if table.column_count() == 0 {
            writeln!(out, "Empty table")?;
        } else {
            for line in render_grid(table, max_rows) {
                writeln!(out, "{line}")?;
            }
        }

        if table.row_count() > max_rows {
            writeln!(
                out,
                "\n... ({} remaining lines)",
                table.row_count() - max_rows
            )?;
        }
    }
    Ok(())
}

/// Prints [`preview_to`] output on stdout.
pub fn preview(tables: &[Table], max_rows: usize) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = preview_to(&mut out, tables, max_rows) {
        warn!("failed to print table preview: {err}");
    }
}
