//! Stateless helper utilities used by the composition engine and exporter.

use std::path::Path;

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
    TUP_XLSX_EXTENSIONS,
};
use crate::spec::{EnumCellValue, EnumHeaderLabels, GridError, SpecXlsxValuePolicy};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Normalize a grid value before it reaches the workbook sink.
///
/// Missing values and non-finite numbers become blank (`None`) unless
/// `if_keep_missing_values` is set, in which case they become policy text.
pub fn convert_export_value(
    value: &EnumCellValue,
    if_keep_missing_values: bool,
    value_policy: &SpecXlsxValuePolicy,
) -> EnumCellValue {
    match value {
        EnumCellValue::None => {
            if if_keep_missing_values {
                EnumCellValue::String(value_policy.missing_value_str.clone())
            } else {
                EnumCellValue::None
            }
        }
        EnumCellValue::Number(n) if !n.is_finite() => {
            if !if_keep_missing_values {
                return EnumCellValue::None;
            }
            let c_text = if n.is_nan() {
                &value_policy.nan_str
            } else if n.is_sign_positive() {
                &value_policy.posinf_str
            } else {
                &value_policy.neginf_str
            };
            EnumCellValue::String(c_text.clone())
        }
        other => other.clone(),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WidthEstimation

/// Estimate displayed width units for one export-normalized cell value.
pub fn estimate_width_len(value: &EnumCellValue) -> usize {
    match value {
        EnumCellValue::None => 0,
        other => estimate_unicode_string_width(&other.to_display_string()),
    }
}

/// Count ASCII chars as one unit and wider chars as 1.6 units.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// Label row cells: positional numbers for `Index`, missing otherwise.
pub fn derive_header_labels(n_cols: usize, rule: EnumHeaderLabels) -> Vec<EnumCellValue> {
    match rule {
        EnumHeaderLabels::Index => (0..n_cols)
            .map(|n_idx| EnumCellValue::Number(n_idx as f64))
            .collect(),
        EnumHeaderLabels::Blank | EnumHeaderLabels::Omit => vec![EnumCellValue::None; n_cols],
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Check a sheet name against Excel naming rules without altering it.
pub fn validate_sheet_name(name: &str) -> Result<(), GridError> {
    let derive_err = |reason: &str| GridError::InvalidSheetName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.trim().is_empty() {
        return Err(derive_err("name must not be empty"));
    }
    if name.chars().count() > N_LEN_EXCEL_SHEET_NAME_MAX {
        return Err(derive_err(&format!(
            "name must be at most {N_LEN_EXCEL_SHEET_NAME_MAX} characters"
        )));
    }
    if let Some(c_illegal) = TUP_EXCEL_ILLEGAL.iter().find(|c| name.contains(**c)) {
        return Err(derive_err(&format!("name must not contain {c_illegal:?}")));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(derive_err("name must not start or end with an apostrophe"));
    }
    Ok(())
}

/// Reject sheets (label row included) that exceed worksheet limits.
pub fn validate_sheet_extent(
    sheet_name: &str,
    n_rows_total: usize,
    n_cols_total: usize,
) -> Result<(), GridError> {
    if n_rows_total > N_NROWS_EXCEL_MAX || n_cols_total > N_NCOLS_EXCEL_MAX {
        return Err(GridError::SheetTooLarge {
            sheet: sheet_name.to_string(),
            rows: n_rows_total,
            cols: n_cols_total,
        });
    }
    Ok(())
}

/// Accept only destinations the workbook engine writes (`.xlsx`).
pub fn validate_xlsx_destination(path: &Path) -> Result<(), GridError> {
    let c_ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if TUP_XLSX_EXTENSIONS.contains(&c_ext.as_str()) {
        Ok(())
    } else {
        Err(GridError::UnsupportedDestination(path.to_path_buf()))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Geometry

/// `true` when two half-open rectangles `(row, col, n_rows, n_cols)` intersect.
pub fn is_overlap(
    rect_a: (usize, usize, usize, usize),
    rect_b: (usize, usize, usize, usize),
) -> bool {
    let (row_a, col_a, height_a, width_a) = rect_a;
    let (row_b, col_b, height_b, width_b) = rect_b;
    if height_a == 0 || width_a == 0 || height_b == 0 || width_b == 0 {
        return false;
    }
    row_a < row_b.saturating_add(height_b)
        && row_b < row_a.saturating_add(height_a)
        && col_a < col_b.saturating_add(width_b)
        && col_b < col_a.saturating_add(width_a)
}

pub fn cast_row_num(value: usize) -> Result<u32, GridError> {
    u32::try_from(value).map_err(|_| GridError::IndexOverflow(format!("row index overflow: {value}")))
}

pub fn cast_col_num(value: usize) -> Result<u16, GridError> {
    u16::try_from(value)
        .map_err(|_| GridError::IndexOverflow(format!("column index overflow: {value}")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
