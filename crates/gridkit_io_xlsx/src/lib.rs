//! `gridkit_io_xlsx` v1:
//! Sheet composition and `.xlsx` export kernel.
//!
//! Modules:
//! - `conf`       : constants and default presets
//! - `spec`       : formats/values/options/errors
//! - `util`       : pure helper functions
//! - `format_map` : sparse per-cell format store
//! - `table`      : data table with table-local formats
//! - `sheet`      : anchored tables, flattening and format merging
//! - `sink`       : workbook writer collaborator
//! - `writer`     : workbook exporter
pub mod conf;
pub mod format_map;
pub mod sheet;
pub mod sink;
pub mod spec;
pub mod table;
pub mod util;
pub mod writer;

pub use conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, N_ROWS_HEADER_OFFSET,
    TUP_EXCEL_ILLEGAL, derive_default_cell_formats, derive_default_export_options,
};
pub use format_map::SpecCellFormatMap;
pub use sheet::{SpecAnchoredTable, SpecDataSheet, SpecSheetGrid};
pub use sink::{StyleHandle, WorkbookSink, XlsxWorkbookSink};
pub use spec::{
    EnumCellFormatValue, EnumCellValue, EnumHeaderLabels, EnumTextAlign, GridError,
    SpecAutofitCellsPolicy, SpecCellFormat, SpecHexColor, SpecSheetReport,
    SpecXlsxExportOptions, SpecXlsxReport, SpecXlsxValuePolicy,
};
pub use table::SpecDataTable;
pub use util::{derive_header_labels, validate_sheet_name};
pub use writer::{XlsxExporter, derive_column_widths};
