/// Text of one PDF page plus whether the page draws ruling lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageText {
    pub page_number: u32,
    pub text: String,
    pub ruled: bool,
}

/// A grid of cells detected on one page. `None` marks a missing cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub page: u32,
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    #[must_use]
    pub fn new(page: u32, rows: Vec<Vec<Option<String>>>) -> Self {
        Self {
            page,
            header: None,
            rows,
        }
    }

    /// Builds a headerless table from plain text rows.
    #[must_use]
    pub fn from_text_rows<R, C>(page: u32, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| Some(cell.into())).collect())
            .collect();
        Self::new(page, rows)
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        let widest_row = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        self.header.as_ref().map_or(0, Vec::len).max(widest_row)
    }

    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    /// Column names, falling back to positional names when there is no header.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        let width = self.column_count();
        let mut names = self.header.clone().unwrap_or_default();
        let start = names.len();
        names.extend((start..width).map(|index| index.to_string()));
        names
    }
}
