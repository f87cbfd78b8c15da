mod clean;
mod error;
mod export;
mod extractor;
mod model;
mod options;
mod pdf_reader;
mod preview;
pub mod reshape;
mod table_detect;
mod table_parse;

pub use clean::{clean_table, clean_tables};
pub use error::{ExportError, ExtractError, ReshapeError};
pub use export::{SaveSummary, read_delimited, save_tables, table_file_name};
pub use extractor::{RunOutcome, TableExtractor, run_with_fallback};
pub use model::Table;
pub use options::{
    DEFAULT_OUTPUT_FOLDER, DEFAULT_PREVIEW_ROWS, ExportFormat, Flavor, PageSelection, RunOptions,
};
pub use preview::{preview, preview_to};
pub use table_detect::{TableDetector, TextLayoutDetector};
