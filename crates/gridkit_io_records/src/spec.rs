//! Flat-record store models and errors.

use std::path::PathBuf;

use gridkit_io_xlsx::GridError;

/// One JSON object as stored by the JSON and JSON-lines stores.
pub type DictRecord = serde_json::Map<String, serde_json::Value>;

////////////////////////////////////////////////////////////////////////////////
// #region ImportSource

/// Source formats understood by [`crate::import::import_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumImportSource {
    Csv,
    /// Spreadsheet containers read through calamine (`.xlsx`, `.xls`).
    Workbook,
}

impl EnumImportSource {
    /// Pick the source format from the file extension (case-insensitive).
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        let c_ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match c_ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Workbook),
            _ => None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// `save(existing_ok = false)` over a store that already holds data.
    #[error("Store already contains data: {}", .0.display())]
    ExistingData(PathBuf),
    #[error("Unsupported source: {} (expected .csv, .xlsx or .xls)", .0.display())]
    UnsupportedSource(PathBuf),
    #[error("Column {0:?} not found.")]
    MissingColumn(String),
    #[error("Sheet {0:?} not found.")]
    MissingSheet(String),
    #[error("Workbook read error: {0}")]
    Workbook(#[from] calamine::Error),
    #[error(transparent)]
    Grid(#[from] GridError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
