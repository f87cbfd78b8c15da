use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::clean::clean_tables;
use crate::export::{SaveSummary, save_tables};
use crate::model::Table;
use crate::options::{ExportFormat, Flavor, PageSelection, RunOptions};
use crate::preview::preview;
use crate::table_detect::{TableDetector, TextLayoutDetector};

/// Holds one document and the tables most recently detected in it.
pub struct TableExtractor {
    pdf_path: PathBuf,
    detector: Box<dyn TableDetector>,
    tables: Vec<Table>,
}

impl TableExtractor {
    #[must_use]
    pub fn new(pdf_path: impl Into<PathBuf>) -> Self {
        Self::with_detector(pdf_path, TextLayoutDetector::default())
    }

    #[must_use]
    pub fn with_detector(
        pdf_path: impl Into<PathBuf>,
        detector: impl TableDetector + 'static,
    ) -> Self {
        Self {
            pdf_path: pdf_path.into(),
            detector: Box::new(detector),
            tables: Vec::new(),
        }
    }

    #[must_use]
    pub fn pdf_path(&self) -> &Path {
        &self.pdf_path
    }

    /// File stem used to name exported tables.
    #[must_use]
    pub fn document_stem(&self) -> String {
        self.pdf_path
            .file_stem()
            .map_or_else(
                || "document".to_string(),
                |stem| stem.to_string_lossy().into_owned(),
            )
    }

    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    #[must_use]
    pub fn into_tables(self) -> Vec<Table> {
        self.tables
    }

    /// Runs the detector once. A detector error is logged and reported as an
    /// empty result so the caller can try another strategy.
    pub fn extract_tables(&mut self, pages: &PageSelection, flavor: Flavor) -> &[Table] {
        info!("Extracting tables from {}...", self.pdf_path.display());

        match self.detector.detect(&self.pdf_path, pages, flavor) {
            Ok(tables) => {
                info!("{} table(s) found", tables.len());
                self.tables = tables;
            }
            Err(err) => {
                error!("Error extracting tables: {err}");
                self.tables.clear();
            }
        }

        &self.tables
    }

    pub fn clean_tables(&mut self) -> &[Table] {
        clean_tables(&mut self.tables);
        &self.tables
    }

    pub fn save_tables(&self, format: ExportFormat, output_folder: &Path) -> SaveSummary {
        save_tables(&self.tables, &self.document_stem(), format, output_folder)
    }

    pub fn view_tables(&self, max_rows: usize) {
        preview(&self.tables, max_rows);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    NoTables,
    Exported(SaveSummary),
}

/// Tries `lattice`, falls back to `stream` once, then cleans, previews and
/// saves whatever was found.
pub fn run_with_fallback(extractor: &mut TableExtractor, options: &RunOptions) -> RunOutcome {
    let mut found = extractor.extract_tables(&options.pages, Flavor::Lattice).len();

    if found == 0 {
        info!("Trying with the '{}' method...", Flavor::Stream);
        found = extractor.extract_tables(&options.pages, Flavor::Stream).len();
    }

    if found == 0 {
        warn!("No tables found in the PDF.");
        return RunOutcome::NoTables;
    }

    extractor.clean_tables();
    if let Some(max_rows) = options.preview_rows {
        extractor.view_tables(max_rows);
    }
    RunOutcome::Exported(extractor.save_tables(options.format, &options.output_folder))
}
