use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_OUTPUT_FOLDER: &str = "extracted_tables/separate_tables";
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Which pages of the document the detector should look at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    #[default]
    All,
    /// Inclusive 1-based page ranges.
    Pages(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        match self {
            Self::All => true,
            Self::Pages(ranges) => ranges.iter().any(|range| range.contains(&page)),
        }
    }
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        let mut ranges = Vec::new();
        for token in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start: u32 = start
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range start: '{start}'"))?;
                let end: u32 = end
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range end: '{end}'"))?;
                if start == 0 || end == 0 {
                    return Err("pages are 1-based".to_string());
                }
                if end < start {
                    return Err(format!(
                        "invalid range '{token}': end is smaller than start"
                    ));
                }
                ranges.push(start..=end);
            } else {
                let page: u32 = token
                    .parse()
                    .map_err(|_| format!("invalid page number: '{token}'"))?;
                if page == 0 {
                    return Err("pages are 1-based".to_string());
                }
                ranges.push(page..=page);
            }
        }

        if ranges.is_empty() {
            return Err("page selection cannot be empty".to_string());
        }

        Ok(Self::Pages(ranges))
    }
}

/// Table detection strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flavor {
    /// Tables drawn with visible ruling lines.
    #[default]
    Lattice,
    /// Tables whose fields are separated only by whitespace.
    Stream,
}

impl Flavor {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lattice => "lattice",
            Self::Stream => "stream",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flavor {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lattice" => Ok(Self::Lattice),
            "stream" => Ok(Self::Stream),
            other => Err(format!(
                "unknown method '{other}', expected 'lattice' or 'stream'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xlsx",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "excel" | "xlsx" => Ok(Self::Excel),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown format '{other}', expected 'csv', 'excel' or 'json'"
            )),
        }
    }
}

/// Settings for one lattice-then-stream extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub pages: PageSelection,
    pub format: ExportFormat,
    pub output_folder: PathBuf,
    /// Rows shown per table on the console; `None` disables the preview.
    pub preview_rows: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            pages: PageSelection::All,
            format: ExportFormat::Csv,
            output_folder: PathBuf::from(DEFAULT_OUTPUT_FOLDER),
            preview_rows: Some(DEFAULT_PREVIEW_ROWS),
        }
    }
}
