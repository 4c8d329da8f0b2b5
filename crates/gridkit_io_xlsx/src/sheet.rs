//! Anchored-table sheet model: shape, grid flattening and format-map merging.

use crate::format_map::SpecCellFormatMap;
use crate::spec::{EnumCellValue, GridError};
use crate::table::SpecDataTable;
use crate::util::is_overlap;

/// One table placed at `(row_idx_start, col_idx_start)` of a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecAnchoredTable {
    /// Sheet row of the table's header row.
    pub row_idx_start: usize,
    /// Sheet column of the table's first column.
    pub col_idx_start: usize,
    /// Anchored table.
    pub table: SpecDataTable,
}

impl SpecAnchoredTable {
    /// Header-inclusive footprint `(row, col, n_rows, n_cols)`.
    pub fn footprint(&self) -> (usize, usize, usize, usize) {
        (
            self.row_idx_start,
            self.col_idx_start,
            self.table.total_rows(),
            self.table.total_columns(),
        )
    }
}

/// Dense row-major grid produced by [`SpecDataSheet::flatten_to_grid`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetGrid {
    n_rows: usize,
    n_cols: usize,
    l_cells: Vec<Vec<EnumCellValue>>,
}

impl SpecSheetGrid {
    fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            l_cells: vec![vec![EnumCellValue::None; n_cols]; n_rows],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Value at `(row_idx, col_idx)`; `None` outside the grid.
    pub fn get(&self, row_idx: usize, col_idx: usize) -> Option<&EnumCellValue> {
        self.l_cells.get(row_idx).and_then(|row| row.get(col_idx))
    }

    pub fn rows(&self) -> &[Vec<EnumCellValue>] {
        &self.l_cells
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, col_idx: usize) -> impl Iterator<Item = &EnumCellValue> + '_ {
        self.l_cells.iter().filter_map(move |row| row.get(col_idx))
    }
}

/// Ordered collection of anchored tables sharing one coordinate space.
///
/// Anchors are not checked for overlap: on flattening, later tables overwrite
/// earlier ones cell by cell, and on format merging later tables win
/// attribute-wise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecDataSheet {
    l_tables: Vec<SpecAnchoredTable>,
}

impl SpecDataSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `data_table` with its header row at `(row_idx_start, col_idx_start)`.
    pub fn insert_data_table(
        &mut self,
        data_table: SpecDataTable,
        row_idx_start: usize,
        col_idx_start: usize,
    ) {
        self.l_tables.push(SpecAnchoredTable {
            row_idx_start,
            col_idx_start,
            table: data_table,
        });
    }

    pub fn iter_tables(&self) -> impl Iterator<Item = &SpecAnchoredTable> + '_ {
        self.l_tables.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.l_tables.is_empty()
    }

    /// Bounding `(rows, cols)` of all header-inclusive footprints.
    ///
    /// Saturates at `usize::MAX`; callers check the result against sheet
    /// limits before allocating a grid.
    pub fn compute_shape(&self) -> (usize, usize) {
        self.l_tables
            .iter()
            .fold((0, 0), |(n_rows, n_cols), anchored| {
                (
                    usize::max(
                        n_rows,
                        anchored.row_idx_start.saturating_add(anchored.table.total_rows()),
                    ),
                    usize::max(
                        n_cols,
                        anchored.col_idx_start.saturating_add(anchored.table.total_columns()),
                    ),
                )
            })
    }

    /// Index pairs `(earlier, later)` of tables whose footprints intersect.
    pub fn derive_overlapping_pairs(&self) -> Vec<(usize, usize)> {
        let mut l_pairs = Vec::new();
        for (n_idx_a, table_a) in self.l_tables.iter().enumerate() {
            for (n_idx_b, table_b) in self.l_tables.iter().enumerate().skip(n_idx_a + 1) {
                if is_overlap(table_a.footprint(), table_b.footprint()) {
                    l_pairs.push((n_idx_a, n_idx_b));
                }
            }
        }
        l_pairs
    }

    /// Materialize all tables into one dense grid of [`Self::compute_shape`].
    ///
    /// Each table contributes its header row at the anchor row and its body
    /// rows below it. Overlapping tables are logged; the later table's values
    /// replace the earlier one's.
    pub fn flatten_to_grid(&self) -> SpecSheetGrid {
        for (n_idx_a, n_idx_b) in self.derive_overlapping_pairs() {
            tracing::warn!(
                table_earlier = n_idx_a,
                table_later = n_idx_b,
                "anchored tables overlap; later table overwrites shared cells"
            );
        }

        let (n_rows, n_cols) = self.compute_shape();
        let mut grid = SpecSheetGrid::new(n_rows, n_cols);

        for anchored in &self.l_tables {
            let l_rows_table = std::iter::once(anchored.table.header_row())
                .chain(anchored.table.rows().iter().cloned());
            for (n_row_local, row_values) in l_rows_table.enumerate() {
                let row_dst = &mut grid.l_cells[anchored.row_idx_start + n_row_local];
                for (n_col_local, value) in row_values.into_iter().enumerate() {
                    row_dst[anchored.col_idx_start + n_col_local] = value;
                }
            }
        }

        grid
    }

    /// Merge every table's format map into one sheet-level map.
    ///
    /// Table-local coordinates are shifted by the table's anchor and merged in
    /// insertion order, so later tables override earlier ones attribute-wise.
    pub fn merge_format_registries(&self) -> Result<SpecCellFormatMap, GridError> {
        let mut fmt_map_master = SpecCellFormatMap::new();
        for anchored in &self.l_tables {
            for (row_idx, col_idx, cell_format) in anchored.table.format_map().iter_cells() {
                fmt_map_master.format_cell(
                    anchored.row_idx_start.saturating_add(row_idx),
                    anchored.col_idx_start.saturating_add(col_idx),
                    cell_format,
                    true,
                )?;
            }
        }
        Ok(fmt_map_master)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{EnumTextAlign, SpecCellFormat, SpecHexColor};

    fn derive_table(columns: [&str; 2], n_body_rows: usize, tag: &str) -> SpecDataTable {
        let l_rows = (0..n_body_rows)
            .map(|n_idx| {
                vec![
                    EnumCellValue::from(format!("{tag}{n_idx}")),
                    EnumCellValue::from(n_idx as i64),
                ]
            })
            .collect();
        SpecDataTable::new(columns, l_rows).unwrap()
    }

    #[test]
    fn test_empty_sheet_shape() {
        let sheet = SpecDataSheet::new();
        assert_eq!(sheet.compute_shape(), (0, 0));
        assert_eq!(sheet.flatten_to_grid().shape(), (0, 0));
        assert!(sheet.merge_format_registries().unwrap().is_empty());
    }

    #[test]
    fn test_non_overlapping_tables() {
        let mut sheet = SpecDataSheet::new();
        sheet.insert_data_table(derive_table(["a", "b"], 2, "t1_"), 0, 0);
        sheet.insert_data_table(derive_table(["c", "d"], 1, "t2_"), 5, 0);

        assert_eq!(sheet.compute_shape(), (7, 2));
        assert!(sheet.derive_overlapping_pairs().is_empty());

        let grid = sheet.flatten_to_grid();
        assert_eq!(grid.shape(), (7, 2));
        assert_eq!(grid.rows()[0], vec!["a".into(), "b".into()]);
        assert_eq!(grid.rows()[1], vec!["t1_0".into(), 0i64.into()]);
        assert_eq!(grid.rows()[2], vec!["t1_1".into(), 1i64.into()]);
        assert_eq!(grid.rows()[3], vec![EnumCellValue::None, EnumCellValue::None]);
        assert_eq!(grid.rows()[4], vec![EnumCellValue::None, EnumCellValue::None]);
        assert_eq!(grid.rows()[5], vec!["c".into(), "d".into()]);
        assert_eq!(grid.rows()[6], vec!["t2_0".into(), 0i64.into()]);
    }

    #[test]
    fn test_column_offset_anchor() {
        let mut sheet = SpecDataSheet::new();
        sheet.insert_data_table(derive_table(["a", "b"], 1, "x"), 1, 3);

        assert_eq!(sheet.compute_shape(), (3, 5));
        let grid = sheet.flatten_to_grid();
        assert_eq!(grid.get(1, 3), Some(&"a".into()));
        assert_eq!(grid.get(2, 4), Some(&0i64.into()));
        assert_eq!(grid.get(0, 0), Some(&EnumCellValue::None));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.column(3).count(), 3);
    }

    #[test]
    fn test_overlapping_tables_later_wins() {
        let mut table_1 = derive_table(["a", "b"], 1, "t1_");
        let mut table_2 = derive_table(["c", "d"], 1, "t2_");
        table_1
            .format_cell(
                1,
                0,
                &SpecCellFormat::default()
                    .with_bold(true)
                    .with_fill_color(SpecHexColor::RED),
                false,
            )
            .unwrap();
        table_2
            .format_cell(
                1,
                0,
                &SpecCellFormat::default()
                    .with_bold(false)
                    .with_align(EnumTextAlign::Right),
                false,
            )
            .unwrap();

        let mut sheet = SpecDataSheet::new();
        sheet.insert_data_table(table_1, 0, 0);
        sheet.insert_data_table(table_2, 0, 0);

        assert_eq!(sheet.derive_overlapping_pairs(), vec![(0, 1)]);

        let grid = sheet.flatten_to_grid();
        assert_eq!(grid.rows()[0], vec!["c".into(), "d".into()]);
        assert_eq!(grid.rows()[1], vec!["t2_0".into(), 0i64.into()]);

        let fmt_map = sheet.merge_format_registries().unwrap();
        let fmt_merged = fmt_map.get(1, 0).unwrap();
        assert_eq!(fmt_merged.bold, Some(false));
        assert_eq!(fmt_merged.align, Some(EnumTextAlign::Right));
        assert_eq!(fmt_merged.fill_color, Some(SpecHexColor::RED));
    }

    #[test]
    fn test_format_map_translated_by_anchor() {
        let mut table = derive_table(["a", "b"], 2, "x");
        let fmt = SpecCellFormat::default().with_bold(true);
        table.format_rows(&[0], &fmt, false).unwrap();

        let mut sheet = SpecDataSheet::new();
        sheet.insert_data_table(table, 4, 2);

        let fmt_map = sheet.merge_format_registries().unwrap();
        let l_coords: Vec<_> = fmt_map.iter_cells().map(|(r, c, _)| (r, c)).collect();
        assert_eq!(l_coords, vec![(4, 2), (4, 3)]);
    }

    #[test]
    fn test_wider_later_table_extends_shape() {
        let mut table_wide = derive_table(["a", "b"], 0, "w");
        table_wide.insert_empty_columns(3);

        let mut sheet = SpecDataSheet::new();
        sheet.insert_data_table(derive_table(["a", "b"], 4, "t"), 0, 0);
        sheet.insert_data_table(table_wide, 2, 1);

        assert_eq!(sheet.compute_shape(), (5, 6));
        let grid = sheet.flatten_to_grid();
        assert_eq!(grid.get(2, 1), Some(&"a".into()));
        assert_eq!(grid.get(2, 0), Some(&"t1".into()));
        assert_eq!(grid.get(2, 5), Some(&EnumCellValue::None));
    }

    #[test]
    fn test_compute_shape_saturates_far_anchor() {
        let mut table = derive_table(["a", "b"], 2, "x");
        table
            .format_cell(1, 1, &SpecCellFormat::default().with_bold(true), false)
            .unwrap();

        let mut sheet = SpecDataSheet::new();
        sheet.insert_data_table(table, usize::MAX, usize::MAX - 1);

        assert_eq!(sheet.compute_shape(), (usize::MAX, usize::MAX));
        assert!(sheet.derive_overlapping_pairs().is_empty());

        let fmt_map = sheet.merge_format_registries().unwrap();
        assert_eq!(fmt_map.extent(), (usize::MAX, usize::MAX));
    }
}
