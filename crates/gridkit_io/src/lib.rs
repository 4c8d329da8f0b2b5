//! `gridkit_io` v1:
//! Facade over sheet composition, workbook/CSV output and flat-record stores.
//!
//! Modules:
//! - `spec`   : output kinds/errors
//! - `output` : extension-driven `OutputManager` and `easy_export`
pub mod output;
pub mod spec;

pub use gridkit_io_records::{
    CsvStore, DictRecord, JsonStore, JsonlStore, RecordError, import_table, import_table_columns,
    write_grid_csv, write_table_csv,
};
pub use gridkit_io_xlsx::{
    EnumCellValue, EnumHeaderLabels, EnumTextAlign, GridError, SpecAutofitCellsPolicy,
    SpecCellFormat, SpecCellFormatMap, SpecDataSheet, SpecDataTable, SpecHexColor, SpecSheetGrid,
    SpecXlsxExportOptions, SpecXlsxReport, SpecXlsxValuePolicy, WorkbookSink, XlsxExporter,
    XlsxWorkbookSink, derive_default_cell_formats,
};
pub use gridkit_log::init_logging;
pub use output::{C_SHEET_NAME_DEFAULT, CsvSheetWriter, OutputManager, easy_export};
pub use spec::{EnumOutputKind, OutputError};
