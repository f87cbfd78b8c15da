//! Table detection over page text.
//!
//! The extractor only sees the [`TableDetector`] trait. The bundled
//! [`TextLayoutDetector`] groups consecutive multi-cell text lines into
//! tables. `Lattice` restricts itself to pages that draw ruling and to strict
//! cell separators; `Stream` scans every page and also accepts single-space
//! separated lines that look tabular.

use std::path::Path;

use tracing::debug;

use crate::error::ExtractError;
use crate::model::{PageText, Table};
use crate::options::{Flavor, PageSelection};
use crate::pdf_reader::read_pdf_pages;
use crate::table_parse::{pad_rows, soft_split_if_tabular, split_line_into_cells};

/// Finds tables in a document. Returning no tables is not an error.
pub trait TableDetector {
    /// # Errors
    ///
    /// Returns an error when the document cannot be read or the page
    /// selection matches no page.
    fn detect(
        &self,
        pdf_path: &Path,
        pages: &PageSelection,
        flavor: Flavor,
    ) -> Result<Vec<Table>, ExtractError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLayoutDetector {
    /// Minimum cells a line needs to count as a table row.
    pub min_cols: usize,
    /// Minimum consecutive rows that make a table.
    pub min_rows: usize,
}

impl Default for TextLayoutDetector {
    fn default() -> Self {
        Self {
            min_cols: 2,
            min_rows: 2,
        }
    }
}

impl TextLayoutDetector {
    fn split_row(&self, line: &str, flavor: Flavor) -> Option<Vec<String>> {
        let cells = split_line_into_cells(line);
        if cells.len() >= self.min_cols {
            return Some(cells);
        }

        match flavor {
            Flavor::Lattice => None,
            Flavor::Stream => soft_split_if_tabular(line, self.min_cols),
        }
    }

    pub(crate) fn detect_in_page(&self, page: &PageText, flavor: Flavor) -> Vec<Table> {
        if flavor == Flavor::Lattice && !page.ruled {
            debug!("page {} draws no ruling, skipping", page.page_number);
            return Vec::new();
        }

        let mut tables = Vec::new();
        let mut current_rows: Vec<Vec<String>> = Vec::new();

        let min_rows = self.min_rows.max(1);
        let flush_current = |rows: &mut Vec<Vec<String>>, tables: &mut Vec<Table>| {
            if rows.len() >= min_rows {
                tables.push(Table::new(page.page_number, pad_rows(std::mem::take(rows))));
            } else {
                rows.clear();
            }
        };

        for line in page.text.lines() {
            match self.split_row(line, flavor) {
                Some(cells) => current_rows.push(cells),
                None => flush_current(&mut current_rows, &mut tables),
            }
        }
        flush_current(&mut current_rows, &mut tables);

        tables
    }
}

impl TableDetector for TextLayoutDetector {
    fn detect(
        &self,
        pdf_path: &Path,
        pages: &PageSelection,
        flavor: Flavor,
    ) -> Result<Vec<Table>, ExtractError> {
        let page_texts = read_pdf_pages(pdf_path, pages)?;
        Ok(page_texts
            .iter()
            .flat_map(|page| self.detect_in_page(page, flavor))
            .collect())
    }
}
