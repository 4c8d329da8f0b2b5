//! Output dispatch models and errors.

use std::path::{Path, PathBuf};

use gridkit_io_records::RecordError;
use gridkit_io_xlsx::GridError;

/// Destination family picked from the output extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumOutputKind {
    Xlsx,
    Csv,
}

impl EnumOutputKind {
    /// `.xlsx`/`.xls` map to the workbook path, `.csv` to the flat path
    /// (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, OutputError> {
        let c_ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match c_ext.as_str() {
            "xlsx" | "xls" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            _ => Err(OutputError::UnsupportedDestination(path.to_path_buf())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("Unsupported output: {} (expected .xlsx, .xls or .csv)", .0.display())]
    UnsupportedDestination(PathBuf),
    /// CSV output holds exactly one sheet.
    #[error("CSV output already has a sheet; cannot add {0:?}.")]
    MultipleSheetsForCsv(String),
    #[error("No sheets to export.")]
    NoSheets,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_kind_from_path() {
        assert_eq!(
            EnumOutputKind::from_path(Path::new("r.XLSX")).unwrap(),
            EnumOutputKind::Xlsx
        );
        assert_eq!(
            EnumOutputKind::from_path(Path::new("r.xls")).unwrap(),
            EnumOutputKind::Xlsx
        );
        assert_eq!(
            EnumOutputKind::from_path(Path::new("r.csv")).unwrap(),
            EnumOutputKind::Csv
        );
        assert!(matches!(
            EnumOutputKind::from_path(Path::new("r.txt")).unwrap_err(),
            OutputError::UnsupportedDestination(_)
        ));
        assert!(EnumOutputKind::from_path(Path::new("noext")).is_err());
    }
}
