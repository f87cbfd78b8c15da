//! Melts a wide spreadsheet matrix into a long `(id, key, y, xy)` table.
//!
//! The first column of the first worksheet holds the row keys, the header
//! row holds the column keys, and every other cell becomes one record.

use std::fmt;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::error::ReshapeError;

pub const DEFAULT_INPUT: &str = "Assunto_categoria.xlsx";
pub const DEFAULT_OUTPUT: &str = "table.xlsx";
pub const ID_COLUMN: &str = "id";
pub const COLUMN_KEY_COLUMN: &str = "y";
pub const VALUE_COLUMN: &str = "xy";
const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    /// Spreadsheet date serial, written back with a date format.
    DateTime(f64),
    Bool(bool),
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Self::Empty,
            Data::String(text) => Self::Text(text.clone()),
            Data::Float(value) => Self::Number(*value),
            #[allow(clippy::cast_precision_loss)]
            Data::Int(value) => Self::Number(*value as f64),
            Data::Bool(value) => Self::Bool(*value),
            Data::DateTime(value) => Self::DateTime(value.as_f64()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(text) => f.write_str(text),
            Self::Number(value) | Self::DateTime(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// A wide matrix: one key column followed by value columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix {
    pub key_header: String,
    pub column_keys: Vec<String>,
    pub rows: Vec<(String, Vec<CellValue>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReshapeRecord {
    pub id: u32,
    pub row_key: String,
    pub column_key: String,
    pub value: CellValue,
}

impl Matrix {
    /// Builds a matrix from a header row followed by data rows.
    ///
    /// # Errors
    ///
    /// Returns [`ReshapeError::MissingHeader`] when there is no header row.
    pub fn from_rows<I>(mut rows: I) -> Result<Self, ReshapeError>
    where
        I: Iterator<Item = Vec<CellValue>>,
    {
        let header = rows
            .next()
            .filter(|header| !header.is_empty())
            .ok_or(ReshapeError::MissingHeader)?;

        let key_header = header[0].to_string();
        let column_keys = header[1..].iter().map(ToString::to_string).collect::<Vec<_>>();

        let rows = rows
            .filter(|row| row.iter().any(|cell| *cell != CellValue::Empty))
            .map(|mut row| {
                row.resize(column_keys.len() + 1, CellValue::Empty);
                let values = row.split_off(1);
                (row[0].to_string(), values)
            })
            .collect();

        Ok(Self {
            key_header,
            column_keys,
            rows,
        })
    }
}

/// Reads the first worksheet of a workbook.
///
/// # Errors
///
/// Returns an error when the workbook cannot be opened, has no worksheet, or
/// the worksheet has no header row.
pub fn read_matrix(path: &Path) -> Result<Matrix, ReshapeError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| ReshapeError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReshapeError::NoWorksheet(path.to_path_buf()))?
        .map_err(|source| ReshapeError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    Matrix::from_rows(range.rows().map(|row| row.iter().map(CellValue::from).collect()))
}

/// Melts column by column: every row of the first value column, then every
/// row of the second, and so on. Ids count up from 1 in that order.
#[must_use]
pub fn melt(matrix: &Matrix) -> Vec<ReshapeRecord> {
    let mut records = Vec::with_capacity(matrix.rows.len() * matrix.column_keys.len());
    let mut next_id = 1_u32;

    for (column, column_key) in matrix.column_keys.iter().enumerate() {
        for (row_key, values) in &matrix.rows {
            records.push(ReshapeRecord {
                id: next_id,
                row_key: row_key.clone(),
                column_key: column_key.clone(),
                value: values.get(column).cloned().unwrap_or_default(),
            });
            next_id += 1;
        }
    }

    records
}

/// Writes `id, <key header>, y, xy` plus one row per record.
///
/// # Errors
///
/// Returns an error when the workbook cannot be written.
pub fn write_records(
    path: &Path,
    key_header: &str,
    records: &[ReshapeRecord],
) -> Result<(), ReshapeError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format(DATE_FORMAT);

    let header = [ID_COLUMN, key_header, COLUMN_KEY_COLUMN, VALUE_COLUMN];
    for (column, name) in (0_u16..).zip(header) {
        worksheet.write_string(0, column, name)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row =
            u32::try_from(index + 1).map_err(|_| ReshapeError::TooManyRows(records.len()))?;
        worksheet.write_number(row, 0, f64::from(record.id))?;
        worksheet.write_string(row, 1, &record.row_key)?;
        worksheet.write_string(row, 2, &record.column_key)?;
        match &record.value {
            CellValue::Empty => {}
            CellValue::Text(text) => {
                worksheet.write_string(row, 3, text)?;
            }
            CellValue::Number(value) => {
                worksheet.write_number(row, 3, *value)?;
            }
            CellValue::DateTime(serial) => {
                worksheet.write_number_with_format(row, 3, *serial, &date_format)?;
            }
            CellValue::Bool(value) => {
                worksheet.write_boolean(row, 3, *value)?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Reads `input`, melts it and writes the long table to `output`.
///
/// # Errors
///
/// Propagates read and write errors.
pub fn reshape_file(input: &Path, output: &Path) -> Result<Vec<ReshapeRecord>, ReshapeError> {
    let matrix = read_matrix(input)?;
    let records = melt(&matrix);
    write_records(output, &matrix.key_header, &records)?;
    info!(
        "{} record(s) from {} row(s) x {} column(s) written to {}",
        records.len(),
        matrix.rows.len(),
        matrix.column_keys.len(),
        output.display()
    );
    Ok(records)
}
