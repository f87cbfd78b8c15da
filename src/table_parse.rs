/// Splits a line on tabs and on runs of two or more spaces.
pub(crate) fn split_line_into_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut whitespace_run = 0_usize;

    let flush = |current: &mut String, cells: &mut Vec<String>| {
        let cell = current.trim();
        if !cell.is_empty() {
            cells.push(cell.to_string());
        }
        current.clear();
    };

    for ch in trimmed.chars() {
        if ch == '\t' {
            flush(&mut current, &mut cells);
            whitespace_run = 0;
            continue;
        }

        if ch.is_whitespace() {
            whitespace_run += 1;
            if whitespace_run >= 2 {
                flush(&mut current, &mut cells);
            } else {
                current.push(' ');
            }
            continue;
        }

        whitespace_run = 0;
        current.push(ch);
    }

    flush(&mut current, &mut cells);
    cells
}

pub(crate) fn soft_split_line_into_cells(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Accepts a single-space split only for short or numeric lines that do not
/// end like a sentence.
pub(crate) fn soft_split_if_tabular(line: &str, min_cols: usize) -> Option<Vec<String>> {
    let cells = soft_split_line_into_cells(line);
    if cells.len() < min_cols {
        return None;
    }

    let has_numeric = cells
        .iter()
        .any(|cell| cell.chars().any(|ch| ch.is_ascii_digit()));
    let looks_like_sentence = ['.', '!', '?', ':']
        .iter()
        .any(|punctuation| line.trim_end().ends_with(*punctuation));

    (!looks_like_sentence && (has_numeric || cells.len() <= 6)).then_some(cells)
}

/// Pads ragged rows with missing cells up to the widest row.
pub(crate) fn pad_rows(rows: Vec<Vec<String>>) -> Vec<Vec<Option<String>>> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    rows.into_iter()
        .map(|row| {
            let mut out = row.into_iter().map(Some).collect::<Vec<_>>();
            out.resize(width, None);
            out
        })
        .collect()
}
