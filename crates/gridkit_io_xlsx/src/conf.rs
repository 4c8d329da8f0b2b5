//! Worksheet limits and default preset factories.

use std::collections::BTreeMap;

use crate::spec::{EnumTextAlign, SpecCellFormat, SpecHexColor, SpecXlsxExportOptions};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// Extensions accepted by the workbook exporter.
pub const TUP_XLSX_EXTENSIONS: [&str; 1] = ["xlsx"];
/// Rows occupied by the label row above every flattened grid.
pub const N_ROWS_HEADER_OFFSET: usize = 1;

/// Build named format presets for common table regions.
///
/// `header` is meant for row 0 of a table, `title` for a standalone caption
/// cell, `highlight` for emphasized body rows.
pub fn derive_default_cell_formats() -> BTreeMap<String, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_size: Some(11),
        align: Some(EnumTextAlign::Left),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert("text".to_string(), cfg_base_fmt_spec.clone());
    dict_fmt.insert(
        "header".to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            fill_color: Some(SpecHexColor::DARK_BLUE),
            align: Some(EnumTextAlign::Center),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        "title".to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            font_size: Some(14),
            bold: Some(true),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        "highlight".to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            fill_color: Some(SpecHexColor::LIGHT_BLUE),
            ..Default::default()
        }),
    );

    dict_fmt
}

/// Build default export options.
pub fn derive_default_export_options() -> SpecXlsxExportOptions {
    SpecXlsxExportOptions::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_presets_share_base() {
        let dict_fmt = derive_default_cell_formats();
        let fmt_header = &dict_fmt["header"];

        assert_eq!(fmt_header.bold, Some(true));
        assert_eq!(fmt_header.font_size, Some(11));
        assert_eq!(fmt_header.align, Some(EnumTextAlign::Center));
        assert_eq!(dict_fmt["title"].font_size, Some(14));
        assert_eq!(dict_fmt["text"].bold, None);
    }
}
