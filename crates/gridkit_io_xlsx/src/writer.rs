//! Workbook exporter that flushes named sheets through a [`WorkbookSink`].

use std::collections::HashMap;
use std::path::PathBuf;

use crate::sheet::{SpecDataSheet, SpecSheetGrid};
use crate::sink::{StyleHandle, WorkbookSink, XlsxWorkbookSink};
use crate::spec::{
    EnumCellValue, EnumHeaderLabels, GridError, SpecAutofitCellsPolicy, SpecCellFormat,
    SpecSheetReport, SpecXlsxExportOptions, SpecXlsxReport,
};
use crate::util::{
    convert_export_value, derive_header_labels, estimate_width_len, validate_sheet_extent,
    validate_sheet_name, validate_xlsx_destination,
};

/// Named sheets bound to one `.xlsx` destination.
#[derive(Debug, Clone)]
pub struct XlsxExporter {
    path_file_out: PathBuf,
    l_sheets: Vec<(String, SpecDataSheet)>,
}

impl XlsxExporter {
    /// Bind an exporter to `path_file_out`.
    ///
    /// The extension is checked here, not at export time.
    pub fn new(path_file_out: impl Into<PathBuf>) -> Result<Self, GridError> {
        let path_file_out = path_file_out.into();
        validate_xlsx_destination(&path_file_out)?;
        Ok(Self {
            path_file_out,
            l_sheets: Vec::new(),
        })
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Registered sheet names in registration order.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.l_sheets.iter().map(|(c_name, _)| c_name.as_str())
    }

    /// Register `data_sheet` under `sheet_name`.
    ///
    /// Names are compared case-insensitively, as Excel does.
    pub fn add_sheet(
        &mut self,
        sheet_name: &str,
        data_sheet: SpecDataSheet,
    ) -> Result<(), GridError> {
        validate_sheet_name(sheet_name)?;
        let c_name_lower = sheet_name.to_lowercase();
        if self
            .l_sheets
            .iter()
            .any(|(c_name, _)| c_name.to_lowercase() == c_name_lower)
        {
            return Err(GridError::DuplicateSheetName(sheet_name.to_string()));
        }
        self.l_sheets.push((sheet_name.to_string(), data_sheet));
        Ok(())
    }

    /// Write every sheet and save the workbook.
    ///
    /// The workbook is assembled in memory and saved only after every sheet was
    /// written; on error the destination is left untouched.
    pub fn export(&self, options: &SpecXlsxExportOptions) -> Result<SpecXlsxReport, GridError> {
        let mut sink = XlsxWorkbookSink::new(self.path_file_out.clone());
        let report = self.export_to_sink(&mut sink, options)?;
        sink.close()?;
        tracing::debug!(
            path = %self.path_file_out.display(),
            n_sheets = report.sheets.len(),
            n_styles = report.n_styles,
            "workbook export finished"
        );
        Ok(report)
    }

    /// Write every sheet into `sink` without closing it.
    pub fn export_to_sink<S: WorkbookSink>(
        &self,
        sink: &mut S,
        options: &SpecXlsxExportOptions,
    ) -> Result<SpecXlsxReport, GridError> {
        validate_policy_autofit(&options.policy_autofit)?;

        let mut report = SpecXlsxReport::default();
        let mut dict_style_handles: HashMap<SpecCellFormat, StyleHandle> = HashMap::new();

        for (sheet_name, data_sheet) in &self.l_sheets {
            let sheet_report = write_sheet(
                sink,
                sheet_name,
                data_sheet,
                options,
                &mut dict_style_handles,
            )?;
            if !data_sheet.derive_overlapping_pairs().is_empty() {
                report.warn(format!(
                    "Sheet {sheet_name:?}: overlapping tables, later tables overwrite earlier cells."
                ));
            }
            report.sheets.push(sheet_report);
        }

        report.n_styles = dict_style_handles.len();
        Ok(report)
    }
}

fn write_sheet<S: WorkbookSink>(
    sink: &mut S,
    sheet_name: &str,
    data_sheet: &SpecDataSheet,
    options: &SpecXlsxExportOptions,
    dict_style_handles: &mut HashMap<SpecCellFormat, StyleHandle>,
) -> Result<SpecSheetReport, GridError> {
    let fmt_map = data_sheet.merge_format_registries()?;
    let n_row_offset = options.header_labels.row_offset();

    // Limits are checked on the computed shape so no oversized grid is built.
    let (n_rows_shape, n_cols_shape) = data_sheet.compute_shape();
    let (n_rows_fmt, n_cols_fmt) = fmt_map.extent();
    validate_sheet_extent(
        sheet_name,
        usize::max(n_rows_shape, n_rows_fmt).saturating_add(n_row_offset),
        usize::max(n_cols_shape, n_cols_fmt),
    )?;

    let grid = data_sheet.flatten_to_grid();
    let (n_rows_grid, n_cols_grid) = grid.shape();

    tracing::debug!(
        sheet = sheet_name,
        n_rows = n_rows_grid,
        n_cols = n_cols_grid,
        n_formatted = fmt_map.len(),
        "writing sheet"
    );

    sink.add_worksheet(sheet_name)?;
    let l_labels = derive_header_labels(n_cols_grid, options.header_labels);
    if options.header_labels != EnumHeaderLabels::Omit {
        sink.write_header(sheet_name, &l_labels)?;
    }

    let mut sheet_report = SpecSheetReport {
        sheet_name: sheet_name.to_string(),
        n_rows: n_rows_grid,
        n_cols: n_cols_grid,
        ..Default::default()
    };

    for (row_idx, row_values) in grid.rows().iter().enumerate() {
        for (col_idx, value_raw) in row_values.iter().enumerate() {
            let value =
                convert_export_value(value_raw, options.keep_missing_values, &options.value_policy);
            let cell_format = fmt_map.get(row_idx, col_idx);
            if cell_format.is_none() && value.is_missing() {
                continue;
            }
            write_cell(
                sink,
                sheet_name,
                row_idx + n_row_offset,
                col_idx,
                &value,
                cell_format,
                dict_style_handles,
                &mut sheet_report,
            )?;
        }
    }

    // Formats declared past the data still get a styled blank cell.
    for (row_idx, col_idx, cell_format) in fmt_map.iter_cells() {
        if row_idx < n_rows_grid && col_idx < n_cols_grid {
            continue;
        }
        write_cell(
            sink,
            sheet_name,
            row_idx + n_row_offset,
            col_idx,
            &EnumCellValue::None,
            Some(cell_format),
            dict_style_handles,
            &mut sheet_report,
        )?;
    }

    if options.autofit_column_widths {
        let l_widths = derive_column_widths(&grid, &l_labels, options);
        for (col_idx, width) in l_widths.into_iter().enumerate() {
            sink.set_column_width(sheet_name, col_idx, width as f64)?;
        }
    }

    Ok(sheet_report)
}

#[allow(clippy::too_many_arguments)]
/// Write one cell at physical `row_idx`, resolving its style handle.
fn write_cell<S: WorkbookSink>(
    sink: &mut S,
    sheet_name: &str,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    cell_format: Option<&SpecCellFormat>,
    dict_style_handles: &mut HashMap<SpecCellFormat, StyleHandle>,
    sheet_report: &mut SpecSheetReport,
) -> Result<(), GridError> {
    let style = match cell_format {
        Some(fmt) => Some(resolve_style_handle(sink, dict_style_handles, fmt)?),
        None => None,
    };
    sink.write_cell(sheet_name, row_idx, col_idx, value, style)?;
    sheet_report.n_cells_written += 1;
    if style.is_some() {
        sheet_report.n_cells_formatted += 1;
    }
    Ok(())
}

fn resolve_style_handle<S: WorkbookSink>(
    sink: &mut S,
    dict_style_handles: &mut HashMap<SpecCellFormat, StyleHandle>,
    cell_format: &SpecCellFormat,
) -> Result<StyleHandle, GridError> {
    if let Some(handle) = dict_style_handles.get(cell_format) {
        return Ok(*handle);
    }
    let handle = sink.register_style(cell_format)?;
    dict_style_handles.insert(cell_format.clone(), handle);
    Ok(handle)
}

/// Column widths: widest rendered value or label, plus padding, clamped.
pub fn derive_column_widths(
    grid: &SpecSheetGrid,
    labels: &[EnumCellValue],
    options: &SpecXlsxExportOptions,
) -> Vec<usize> {
    let policy = &options.policy_autofit;
    let n_min = usize::max(1, policy.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, policy.width_cell_max));
    let (_, n_cols) = grid.shape();

    (0..n_cols)
        .map(|col_idx| {
            let n_width_body = grid
                .column(col_idx)
                .map(|value| {
                    estimate_width_len(&convert_export_value(
                        value,
                        options.keep_missing_values,
                        &options.value_policy,
                    ))
                })
                .max()
                .unwrap_or(0);
            let n_width_label = labels
                .get(col_idx)
                .map_or(0, estimate_width_len);
            let n_width_recorded = usize::max(n_width_body, n_width_label);
            usize::min(n_max, usize::max(n_min, n_width_recorded + policy.width_cell_padding))
        })
        .collect()
}

fn validate_policy_autofit(policy_autofit: &SpecAutofitCellsPolicy) -> Result<(), GridError> {
    if policy_autofit.width_cell_max < policy_autofit.width_cell_min {
        return Err(GridError::MalformedFormat(
            "policy_autofit.width_cell_max must be >= policy_autofit.width_cell_min.".to_string(),
        ));
    }
    Ok(())
}
