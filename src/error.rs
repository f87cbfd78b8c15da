use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("no pages available after applying selection")]
    NoPagesSelected,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("columns must be unique for record output, '{0}' appears twice")]
    DuplicateColumn(String),

    #[error("table has {0} columns, more than a worksheet can hold")]
    TooManyColumns(usize),
}

#[derive(Debug, Error)]
pub enum ReshapeError {
    #[error("failed to open workbook '{path}': {source}")]
    Open {
        path: PathBuf,
        source: calamine::Error,
    },

    #[error("workbook '{0}' has no worksheet")]
    NoWorksheet(PathBuf),

    #[error("worksheet has no header row")]
    MissingHeader,

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("{0} records do not fit in one worksheet")]
    TooManyRows(usize),
}
