//! Rectangular data table with its own table-local format map.
//!
//! Coordinates are table-local: row 0 is the synthesized header row holding the
//! column names, body row `i` sits at local row `i + 1`.

use std::io::Cursor;

use polars::prelude::{AnyValue, DataFrame, IpcReader, SerReader};

use crate::format_map::SpecCellFormatMap;
use crate::spec::{EnumCellValue, GridError, SpecCellFormat};

/// Header + body block plus the formats declared against it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecDataTable {
    l_colnames: Vec<Option<String>>,
    l_rows: Vec<Vec<EnumCellValue>>,
    format_map: SpecCellFormatMap,
}

impl SpecDataTable {
    /// Build from column names and row-major body values.
    ///
    /// Every row must have exactly one value per column.
    pub fn new<I, S>(columns: I, rows: Vec<Vec<EnumCellValue>>) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let l_colnames: Vec<Option<String>> =
            columns.into_iter().map(|c| Some(c.into())).collect();
        validate_rectangular(l_colnames.len(), &rows)?;
        Ok(Self {
            l_colnames,
            l_rows: rows,
            format_map: SpecCellFormatMap::new(),
        })
    }

    /// Build from `(name, values)` columns of equal length.
    pub fn from_columns(columns: Vec<(String, Vec<EnumCellValue>)>) -> Result<Self, GridError> {
        let n_height = columns.first().map_or(0, |(_, values)| values.len());
        if let Some((c_name, values)) = columns.iter().find(|(_, v)| v.len() != n_height) {
            return Err(GridError::MalformedTable(format!(
                "column {c_name:?} has {} values, expected {n_height}",
                values.len()
            )));
        }

        let mut l_colnames = Vec::with_capacity(columns.len());
        let mut l_rows = vec![Vec::with_capacity(columns.len()); n_height];
        for (c_name, values) in columns {
            l_colnames.push(Some(c_name));
            for (row, value) in l_rows.iter_mut().zip(values) {
                row.push(value);
            }
        }

        Ok(Self {
            l_colnames,
            l_rows,
            format_map: SpecCellFormatMap::new(),
        })
    }

    /// Build from an in-memory Polars dataframe.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self, GridError> {
        let l_colnames: Vec<String> = df
            .get_column_names_str()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        let l_cols = df.get_columns();

        let mut l_rows = Vec::with_capacity(df.height());
        for n_idx_row in 0..df.height() {
            let mut row = Vec::with_capacity(l_cols.len());
            for col in l_cols {
                let value = col.get(n_idx_row).map_err(|err| {
                    GridError::MalformedTable(format!("Failed to access cell value: {err}"))
                })?;
                row.push(derive_cell_value_from_any_value(value));
            }
            l_rows.push(row);
        }

        Self::new(l_colnames, l_rows)
    }

    /// Build from IPC-serialized dataframe bytes.
    pub fn from_ipc_bytes(v_ipc_df: &[u8]) -> Result<Self, GridError> {
        let df = IpcReader::new(Cursor::new(v_ipc_df))
            .finish()
            .map_err(|err| {
                GridError::MalformedTable(format!("Failed to read IPC DataFrame bytes: {err}"))
            })?;
        Self::from_dataframe(&df)
    }

    /// Column names; appended empty columns are unnamed.
    pub fn column_names(&self) -> &[Option<String>] {
        &self.l_colnames
    }

    /// Body rows (header excluded).
    pub fn rows(&self) -> &[Vec<EnumCellValue>] {
        &self.l_rows
    }

    pub fn format_map(&self) -> &SpecCellFormatMap {
        &self.format_map
    }

    /// Header row as cell values; unnamed columns are blank.
    pub fn header_row(&self) -> Vec<EnumCellValue> {
        self.l_colnames
            .iter()
            .map(|c_name| EnumCellValue::from(c_name.clone()))
            .collect()
    }

    /// Body rows plus the header row.
    pub fn total_rows(&self) -> usize {
        self.l_rows.len() + 1
    }

    pub fn total_columns(&self) -> usize {
        self.l_colnames.len()
    }

    /// `(body rows, columns)`.
    pub fn body_shape(&self) -> (usize, usize) {
        (self.l_rows.len(), self.l_colnames.len())
    }

    /// Append `how_many` all-missing rows below the body.
    pub fn insert_empty_rows(&mut self, how_many: usize) {
        let n_width = self.total_columns();
        self.l_rows
            .extend((0..how_many).map(|_| vec![EnumCellValue::None; n_width]));
    }

    /// Append `how_many` unnamed all-missing columns at the right edge.
    pub fn insert_empty_columns(&mut self, how_many: usize) {
        self.l_colnames.extend((0..how_many).map(|_| None));
        for row in &mut self.l_rows {
            row.extend((0..how_many).map(|_| EnumCellValue::None));
        }
    }

    /// Attach a format to one table-local cell.
    pub fn format_cell(
        &mut self,
        row_idx: usize,
        col_idx: usize,
        cell_format: &SpecCellFormat,
        exist_ok: bool,
    ) -> Result<(), GridError> {
        self.format_map
            .format_cell(row_idx, col_idx, cell_format, exist_ok)
    }

    /// Format every column of each listed row.
    ///
    /// Not transactional: on error, cells formatted before the failing one keep
    /// their new format.
    pub fn format_rows(
        &mut self,
        row_indices: &[usize],
        cell_format: &SpecCellFormat,
        exist_ok: bool,
    ) -> Result<(), GridError> {
        for row_idx in row_indices {
            for col_idx in 0..self.total_columns() {
                self.format_map
                    .format_cell(*row_idx, col_idx, cell_format, exist_ok)?;
            }
        }
        Ok(())
    }

    /// Format every row (header included) of each listed column.
    ///
    /// Not transactional, see [`Self::format_rows`].
    pub fn format_columns(
        &mut self,
        col_indices: &[usize],
        cell_format: &SpecCellFormat,
        exist_ok: bool,
    ) -> Result<(), GridError> {
        for col_idx in col_indices {
            for row_idx in 0..self.total_rows() {
                self.format_map
                    .format_cell(row_idx, *col_idx, cell_format, exist_ok)?;
            }
        }
        Ok(())
    }
}

fn validate_rectangular(n_width: usize, rows: &[Vec<EnumCellValue>]) -> Result<(), GridError> {
    match rows.iter().position(|row| row.len() != n_width) {
        Some(n_idx_row) => Err(GridError::MalformedTable(format!(
            "body row {n_idx_row} has {} values, expected {n_width}",
            rows[n_idx_row].len()
        ))),
        None => Ok(()),
    }
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::UInt8(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt16(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int16(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SpecHexColor;

    fn derive_score_table() -> SpecDataTable {
        SpecDataTable::new(
            ["name", "score"],
            vec![
                vec!["a".into(), 1i64.into()],
                vec!["b".into(), 2i64.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_total_rows_counts_header() {
        let table = derive_score_table();
        assert_eq!(table.total_rows(), 3);
        assert_eq!(table.total_columns(), 2);
        assert_eq!(table.body_shape(), (2, 2));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = SpecDataTable::new(["a", "b"], vec![vec![1i64.into()]]).unwrap_err();
        assert!(matches!(err, GridError::MalformedTable(_)));

        let err = SpecDataTable::from_columns(vec![
            ("a".to_string(), vec![1i64.into(), 2i64.into()]),
            ("b".to_string(), vec![3i64.into()]),
        ])
        .unwrap_err();
        assert!(matches!(err, GridError::MalformedTable(_)));
    }

    #[test]
    fn test_from_columns_transposes() {
        let table = SpecDataTable::from_columns(vec![
            ("x".to_string(), vec![1i64.into(), 2i64.into()]),
            ("y".to_string(), vec!["p".into(), "q".into()]),
        ])
        .unwrap();
        assert_eq!(table.rows()[1], vec![EnumCellValue::Number(2.0), "q".into()]);
    }

    #[test]
    fn test_insert_empty_rows_keeps_formats() {
        let mut table = derive_score_table();
        let fmt = SpecCellFormat::default().with_bold(true);
        table.format_rows(&[0], &fmt, false).unwrap();
        let fmt_map_before = table.format_map().clone();

        table.insert_empty_rows(3);

        assert_eq!(table.body_shape(), (5, 2));
        assert_eq!(table.rows()[4], vec![EnumCellValue::None, EnumCellValue::None]);
        assert_eq!(table.format_map(), &fmt_map_before);
    }

    #[test]
    fn test_insert_empty_columns_are_unnamed() {
        let mut table = derive_score_table();
        table.insert_empty_columns(2);

        assert_eq!(table.body_shape(), (2, 4));
        assert_eq!(table.column_names()[2], None);
        assert!(table.rows().iter().all(|row| row.len() == 4));
        assert_eq!(table.header_row()[3], EnumCellValue::None);
    }

    #[test]
    fn test_format_rows_and_columns_cover_orthogonal_range() {
        let mut table = derive_score_table();
        let fmt_fill = SpecCellFormat::default().with_fill_color(SpecHexColor::BLUE);
        let fmt_bold = SpecCellFormat::default().with_bold(true);

        table.format_columns(&[1], &fmt_fill, false).unwrap();
        assert_eq!(table.format_map().len(), 3);

        let err = table.format_rows(&[0], &fmt_bold, false).unwrap_err();
        assert!(matches!(err, GridError::DuplicateCellFormat { row: 0, col: 1 }));
        // (0, 0) was applied before the conflict.
        assert_eq!(table.format_map().get(0, 0), Some(&fmt_bold));

        table.format_rows(&[0], &fmt_bold, true).unwrap();
        assert_eq!(
            table.format_map().get(0, 1),
            Some(&fmt_fill.merge(&fmt_bold))
        );
    }

    #[test]
    fn test_from_dataframe() {
        let df = polars::df!(
            "name" => ["a", "b"],
            "score" => [1i64, 2],
            "flag" => [true, false],
        )
        .unwrap();

        let table = SpecDataTable::from_dataframe(&df).unwrap();

        assert_eq!(
            table.column_names(),
            &[
                Some("name".to_string()),
                Some("score".to_string()),
                Some("flag".to_string())
            ]
        );
        assert_eq!(
            table.rows()[1],
            vec!["b".into(), EnumCellValue::Number(2.0), false.into()]
        );
    }

    #[test]
    fn test_from_ipc_bytes_rejects_garbage() {
        let err = SpecDataTable::from_ipc_bytes(b"not ipc").unwrap_err();
        assert!(matches!(err, GridError::MalformedTable(_)));
    }
}
