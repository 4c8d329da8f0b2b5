//! Workbook writer collaborator: the calls the exporter makes per sheet/cell,
//! and the `rust_xlsxwriter` implementation behind them.

use std::path::PathBuf;

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};

use crate::spec::{EnumCellValue, EnumTextAlign, GridError, SpecCellFormat};
use crate::util::{cast_col_num, cast_row_num};

/// Opaque reference to a style registered with a [`WorkbookSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleHandle(usize);

impl StyleHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Destination for flattened sheets.
///
/// Rows passed to [`WorkbookSink::write_cell`] are physical rows: the exporter
/// has already applied the label-row offset.
pub trait WorkbookSink {
    /// Create an empty worksheet named `sheet_name`.
    fn add_worksheet(&mut self, sheet_name: &str) -> Result<(), GridError>;

    /// Write the label row (physical row 0). Missing labels are skipped.
    fn write_header(
        &mut self,
        sheet_name: &str,
        labels: &[EnumCellValue],
    ) -> Result<(), GridError>;

    /// Write one value; `EnumCellValue::None` writes a blank (styled) cell.
    fn write_cell(
        &mut self,
        sheet_name: &str,
        row_idx: usize,
        col_idx: usize,
        value: &EnumCellValue,
        style: Option<StyleHandle>,
    ) -> Result<(), GridError>;

    /// Register a reusable style and return its handle.
    fn register_style(&mut self, cell_format: &SpecCellFormat) -> Result<StyleHandle, GridError>;

    fn set_column_width(
        &mut self,
        sheet_name: &str,
        col_idx: usize,
        width: f64,
    ) -> Result<(), GridError>;

    /// Flush the workbook to its destination. Idempotent.
    fn close(&mut self) -> Result<(), GridError>;
}

/// [`WorkbookSink`] buffering an `rust_xlsxwriter` workbook in memory.
///
/// Nothing touches the destination until [`WorkbookSink::close`]; dropping an
/// unclosed sink discards the buffered workbook.
pub struct XlsxWorkbookSink {
    path_file_out: PathBuf,
    workbook: Workbook,
    l_formats: Vec<Format>,
    if_closed: bool,
}

impl XlsxWorkbookSink {
    pub fn new(path_file_out: PathBuf) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            l_formats: Vec::new(),
            if_closed: false,
        }
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    fn ensure_open(&self) -> Result<(), GridError> {
        if self.if_closed {
            return Err(GridError::SinkClosed);
        }
        Ok(())
    }
}

impl WorkbookSink for XlsxWorkbookSink {
    fn add_worksheet(&mut self, sheet_name: &str) -> Result<(), GridError> {
        self.ensure_open()?;
        self.workbook.add_worksheet().set_name(sheet_name)?;
        Ok(())
    }

    fn write_header(
        &mut self,
        sheet_name: &str,
        labels: &[EnumCellValue],
    ) -> Result<(), GridError> {
        self.ensure_open()?;
        let worksheet = self.workbook.worksheet_from_name(sheet_name)?;
        for (col_idx, label) in labels.iter().enumerate() {
            let n_col = cast_col_num(col_idx)?;
            match label {
                EnumCellValue::None => {}
                EnumCellValue::String(val) => {
                    worksheet.write_string(0, n_col, val)?;
                }
                EnumCellValue::Number(val) => {
                    worksheet.write_number(0, n_col, *val)?;
                }
                EnumCellValue::Boolean(val) => {
                    worksheet.write_boolean(0, n_col, *val)?;
                }
            }
        }
        Ok(())
    }

    fn write_cell(
        &mut self,
        sheet_name: &str,
        row_idx: usize,
        col_idx: usize,
        value: &EnumCellValue,
        style: Option<StyleHandle>,
    ) -> Result<(), GridError> {
        self.ensure_open()?;
        let n_row = cast_row_num(row_idx)?;
        let n_col = cast_col_num(col_idx)?;
        let format = match style {
            Some(handle) => Some(self.l_formats.get(handle.index()).ok_or_else(|| {
                GridError::MalformedFormat(format!("Unknown style handle: {}", handle.index()))
            })?),
            None => None,
        };
        let worksheet = self.workbook.worksheet_from_name(sheet_name)?;

        match (value, format) {
            (EnumCellValue::None, Some(fmt)) => {
                worksheet.write_blank(n_row, n_col, fmt)?;
            }
            (EnumCellValue::None, None) => {}
            (EnumCellValue::String(val), Some(fmt)) => {
                worksheet.write_string_with_format(n_row, n_col, val, fmt)?;
            }
            (EnumCellValue::String(val), None) => {
                worksheet.write_string(n_row, n_col, val)?;
            }
            (EnumCellValue::Number(val), Some(fmt)) => {
                worksheet.write_number_with_format(n_row, n_col, *val, fmt)?;
            }
            (EnumCellValue::Number(val), None) => {
                worksheet.write_number(n_row, n_col, *val)?;
            }
            (EnumCellValue::Boolean(val), Some(fmt)) => {
                worksheet.write_boolean_with_format(n_row, n_col, *val, fmt)?;
            }
            (EnumCellValue::Boolean(val), None) => {
                worksheet.write_boolean(n_row, n_col, *val)?;
            }
        }
        Ok(())
    }

    fn register_style(&mut self, cell_format: &SpecCellFormat) -> Result<StyleHandle, GridError> {
        cell_format.validate()?;
        self.l_formats.push(derive_rust_xlsx_format(cell_format));
        Ok(StyleHandle::new(self.l_formats.len() - 1))
    }

    fn set_column_width(
        &mut self,
        sheet_name: &str,
        col_idx: usize,
        width: f64,
    ) -> Result<(), GridError> {
        self.ensure_open()?;
        self.workbook
            .worksheet_from_name(sheet_name)?
            .set_column_width(cast_col_num(col_idx)?, width)?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), GridError> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook.save(&self.path_file_out)?;
        self.if_closed = true;
        tracing::debug!(path = %self.path_file_out.display(), "workbook saved");
        Ok(())
    }
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = spec.font_size {
        format = format.set_font_size(f64::from(val));
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if let Some(val) = spec.align {
        format = format.set_align(derive_format_align(val));
    }
    if let Some(val) = spec.fill_color {
        format = format.set_background_color(Color::RGB(val.rgb()));
    }
    if let Some(val) = spec.font_color {
        format = format.set_font_color(Color::RGB(val.rgb()));
    }

    format
}

fn derive_format_align(align: EnumTextAlign) -> FormatAlign {
    match align {
        EnumTextAlign::Left => FormatAlign::Left,
        EnumTextAlign::Center => FormatAlign::Center,
        EnumTextAlign::Right => FormatAlign::Right,
        EnumTextAlign::Fill => FormatAlign::Fill,
        EnumTextAlign::Justify => FormatAlign::Justify,
        EnumTextAlign::CenterAcross => FormatAlign::CenterAcross,
        EnumTextAlign::Distributed => FormatAlign::Distributed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SpecHexColor;

    #[test]
    fn test_register_style_returns_sequential_handles() {
        let mut sink = XlsxWorkbookSink::new(PathBuf::from("unused.xlsx"));
        let handle_a = sink
            .register_style(&SpecCellFormat::default().with_bold(true))
            .unwrap();
        let handle_b = sink
            .register_style(&SpecCellFormat::default().with_fill_color(SpecHexColor::BLUE))
            .unwrap();

        assert_eq!(handle_a.index(), 0);
        assert_eq!(handle_b.index(), 1);
    }

    #[test]
    fn test_write_cell_unknown_sheet_fails() {
        let mut sink = XlsxWorkbookSink::new(PathBuf::from("unused.xlsx"));
        let err = sink
            .write_cell("Missing", 1, 0, &EnumCellValue::from("x"), None)
            .unwrap_err();
        assert!(matches!(err, GridError::Xlsx(_)));
    }

    #[test]
    fn test_write_cell_unknown_style_fails() {
        let mut sink = XlsxWorkbookSink::new(PathBuf::from("unused.xlsx"));
        sink.add_worksheet("Sheet1").unwrap();
        let err = sink
            .write_cell("Sheet1", 1, 0, &EnumCellValue::from(1i64), Some(StyleHandle::new(7)))
            .unwrap_err();
        assert!(matches!(err, GridError::MalformedFormat(_)));
    }

    #[test]
    fn test_close_writes_file_once() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.xlsx");
        let mut sink = XlsxWorkbookSink::new(path.clone());
        sink.add_worksheet("Data").unwrap();
        sink.write_cell("Data", 1, 0, &EnumCellValue::from("v"), None)
            .unwrap();

        sink.close().unwrap();
        sink.close().unwrap();

        assert!(path.exists());
        assert!(sink.add_worksheet("Late").is_err());
    }

    #[test]
    fn test_write_header_keeps_numeric_labels_numeric() {
        use calamine::{Data, Reader, Xlsx, open_workbook};

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("labels.xlsx");
        let mut sink = XlsxWorkbookSink::new(path.clone());
        sink.add_worksheet("Data").unwrap();
        sink.write_header(
            "Data",
            &[
                EnumCellValue::Number(0.0),
                EnumCellValue::None,
                EnumCellValue::from("tag"),
            ],
        )
        .unwrap();
        sink.close().unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range("Data").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::Float(0.0)));
        assert_eq!(range.get_value((0, 1)), Some(&Data::Empty));
        assert_eq!(range.get_value((0, 2)), Some(&Data::String("tag".to_string())));
    }
}
