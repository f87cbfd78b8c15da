use tracing::info;

use crate::model::Table;

fn is_blank(cell: Option<&String>) -> bool {
    cell.is_none_or(|value| value.trim().is_empty())
}

fn drop_blank_rows(table: &mut Table) {
    table
        .rows
        .retain(|row| !row.iter().all(|cell| is_blank(cell.as_ref())));
}

fn drop_blank_columns(table: &mut Table) {
    let width = table.column_count();
    let named = |column: usize| {
        table
            .header
            .as_ref()
            .and_then(|header| header.get(column))
            .is_some_and(|name| !name.trim().is_empty())
    };
    let keep = (0..width)
        .map(|column| {
            named(column)
                || table
                    .rows
                    .iter()
                    .any(|row| !is_blank(row.get(column).and_then(Option::as_ref)))
        })
        .collect::<Vec<_>>();

    if keep.iter().all(|&kept| kept) {
        return;
    }

    for row in &mut table.rows {
        let mut column = 0;
        row.retain(|_| {
            let kept = keep[column];
            column += 1;
            kept
        });
    }
    if let Some(header) = table.header.as_mut() {
        let mut column = 0;
        header.retain(|_| {
            let kept = keep[column];
            column += 1;
            kept
        });
    }
}

fn trim_cells(table: &mut Table) {
    let header = table.header.iter_mut().flatten();
    let cells = table.rows.iter_mut().flatten().flatten();
    for cell in header.chain(cells) {
        let trimmed = cell.trim();
        if trimmed.len() != cell.len() {
            *cell = trimmed.to_string();
        }
    }
}

fn promote_header(table: &mut Table) {
    if table.header.is_some() || table.rows.is_empty() {
        return;
    }

    let first = table.rows.remove(0);
    table.header = Some(first.into_iter().map(Option::unwrap_or_default).collect());
}

/// Cleans one table in place.
///
/// Blank rows go first, then blank columns, then every cell is trimmed, and
/// only then is the first remaining row promoted to the header. A table that
/// already has a header keeps it, so cleaning twice changes nothing.
pub fn clean_table(table: &mut Table) {
    drop_blank_rows(table);
    drop_blank_columns(table);
    trim_cells(table);
    promote_header(table);
}

pub fn clean_tables(tables: &mut [Table]) {
    for (index, table) in tables.iter_mut().enumerate() {
        info!("Clearing table {}...", index + 1);
        clean_table(table);
    }
}
