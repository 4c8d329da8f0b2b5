//! Extension-driven output dispatch over the workbook and CSV writers.

use std::path::{Path, PathBuf};

use gridkit_io_records::write_grid_csv;
use gridkit_io_xlsx::{
    EnumHeaderLabels, SpecDataSheet, SpecDataTable, SpecSheetReport, SpecXlsxExportOptions, SpecXlsxReport,
    XlsxExporter,
};

use crate::spec::{EnumOutputKind, OutputError};

/// Sheet name used when the caller does not name one.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet1";

/// Single-sheet CSV destination. Cell formats are dropped on export.
#[derive(Debug, Clone)]
pub struct CsvSheetWriter {
    path_file_out: PathBuf,
    sheet: Option<(String, SpecDataSheet)>,
}

impl CsvSheetWriter {
    pub fn new(path_file_out: impl Into<PathBuf>) -> Self {
        Self {
            path_file_out: path_file_out.into(),
            sheet: None,
        }
    }

    /// Register the only sheet; a second sheet is rejected.
    pub fn add_sheet(
        &mut self,
        sheet_name: &str,
        data_sheet: SpecDataSheet,
    ) -> Result<(), OutputError> {
        if self.sheet.is_some() {
            return Err(OutputError::MultipleSheetsForCsv(sheet_name.to_string()));
        }
        self.sheet = Some((sheet_name.to_string(), data_sheet));
        Ok(())
    }

    pub fn export(&self) -> Result<SpecXlsxReport, OutputError> {
        let (sheet_name, data_sheet) = self.sheet.as_ref().ok_or(OutputError::NoSheets)?;

        let mut report = SpecXlsxReport::default();
        let n_formatted = data_sheet.merge_format_registries()?.len();
        if n_formatted > 0 {
            tracing::warn!(
                path = %self.path_file_out.display(),
                n_formatted,
                "csv output ignores cell formats"
            );
            report.warn(format!(
                "Sheet {sheet_name:?}: {n_formatted} cell formats ignored for CSV output."
            ));
        }

        let grid = data_sheet.flatten_to_grid();
        write_grid_csv(&self.path_file_out, &grid)?;

        let (n_rows, n_cols) = grid.shape();
        report.sheets.push(SpecSheetReport {
            sheet_name: sheet_name.clone(),
            n_rows,
            n_cols,
            n_cells_written: n_rows * n_cols,
            n_cells_formatted: 0,
        });
        Ok(report)
    }
}

/// Output destination picked once from the file extension.
#[derive(Debug, Clone)]
pub enum OutputManager {
    Xlsx(XlsxExporter),
    Csv(CsvSheetWriter),
}

impl OutputManager {
    /// Bind to `path_file_out`; unsupported extensions fail here, not at export.
    pub fn new(path_file_out: impl Into<PathBuf>) -> Result<Self, OutputError> {
        let path_file_out = path_file_out.into();
        let manager = match EnumOutputKind::from_path(&path_file_out)? {
            EnumOutputKind::Xlsx => Self::Xlsx(XlsxExporter::new(&path_file_out)?),
            EnumOutputKind::Csv => Self::Csv(CsvSheetWriter::new(&path_file_out)),
        };
        tracing::debug!(path = %path_file_out.display(), kind = ?manager.kind(), "output manager created");
        Ok(manager)
    }

    pub fn kind(&self) -> EnumOutputKind {
        match self {
            Self::Xlsx(_) => EnumOutputKind::Xlsx,
            Self::Csv(_) => EnumOutputKind::Csv,
        }
    }

    pub fn is_excel(&self) -> bool {
        matches!(self, Self::Xlsx(_))
    }

    pub fn is_csv(&self) -> bool {
        matches!(self, Self::Csv(_))
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        match self {
            Self::Xlsx(exporter) => exporter.file_out(),
            Self::Csv(writer) => writer.path_file_out.to_string_lossy().to_string(),
        }
    }

    pub fn add_sheet(
        &mut self,
        sheet_name: &str,
        data_sheet: SpecDataSheet,
    ) -> Result<&mut Self, OutputError> {
        match self {
            Self::Xlsx(exporter) => exporter.add_sheet(sheet_name, data_sheet)?,
            Self::Csv(writer) => writer.add_sheet(sheet_name, data_sheet)?,
        }
        Ok(self)
    }

    /// Write every registered sheet. `options` only apply to workbooks.
    pub fn export(&self, options: &SpecXlsxExportOptions) -> Result<SpecXlsxReport, OutputError> {
        match self {
            Self::Xlsx(exporter) => {
                if exporter.sheet_names().next().is_none() {
                    return Err(OutputError::NoSheets);
                }
                Ok(exporter.export(options)?)
            }
            Self::Csv(writer) => writer.export(),
        }
    }
}

/// Write one table to `.csv` or `.xlsx`, anchored at the top-left corner.
///
/// No label row is written, so the table's header row lands on row 0 and the
/// file reads back through [`gridkit_io_records::import_table`] unchanged.
pub fn easy_export(
    path_file_out: &Path,
    table: SpecDataTable,
    sheet_name: Option<&str>,
) -> Result<SpecXlsxReport, OutputError> {
    let mut data_sheet = SpecDataSheet::new();
    data_sheet.insert_data_table(table, 0, 0);

    let mut manager = OutputManager::new(path_file_out)?;
    manager.add_sheet(sheet_name.unwrap_or(C_SHEET_NAME_DEFAULT), data_sheet)?;
    manager.export(&SpecXlsxExportOptions {
        header_labels: EnumHeaderLabels::Omit,
        ..Default::default()
    })
}
