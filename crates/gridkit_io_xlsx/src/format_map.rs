//! Sparse `(row, col) -> format` registry with a per-insert conflict policy.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::spec::{GridError, SpecCellFormat};

/// Cell formats keyed by coordinate.
///
/// Formats are stored by value: inserting clones the caller's format, so later
/// changes to the caller's copy never reach the stored one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecCellFormatMap {
    dict_cell_fmt: BTreeMap<(usize, usize), SpecCellFormat>,
}

impl SpecCellFormatMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `cell_format` to `(row_idx, col_idx)`.
    ///
    /// An occupied coordinate fails with [`GridError::DuplicateCellFormat`]
    /// unless `exist_ok` is set, in which case `cell_format` is merged into the
    /// stored format (set attributes win, unset ones are ignored).
    pub fn format_cell(
        &mut self,
        row_idx: usize,
        col_idx: usize,
        cell_format: &SpecCellFormat,
        exist_ok: bool,
    ) -> Result<(), GridError> {
        cell_format.validate()?;

        match self.dict_cell_fmt.entry((row_idx, col_idx)) {
            Entry::Vacant(entry) => {
                entry.insert(cell_format.clone());
            }
            Entry::Occupied(mut entry) => {
                if !exist_ok {
                    return Err(GridError::DuplicateCellFormat {
                        row: row_idx,
                        col: col_idx,
                    });
                }
                entry.get_mut().update(cell_format);
            }
        }
        Ok(())
    }

    pub fn get(&self, row_idx: usize, col_idx: usize) -> Option<&SpecCellFormat> {
        self.dict_cell_fmt.get(&(row_idx, col_idx))
    }

    /// Iterate `(row, col, format)` in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, &SpecCellFormat)> + '_ {
        self.dict_cell_fmt
            .iter()
            .map(|((row_idx, col_idx), cell_format)| (*row_idx, *col_idx, cell_format))
    }

    pub fn len(&self) -> usize {
        self.dict_cell_fmt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict_cell_fmt.is_empty()
    }

    /// Smallest `(rows, cols)` rectangle from the origin covering every entry.
    pub fn extent(&self) -> (usize, usize) {
        self.dict_cell_fmt
            .keys()
            .fold((0, 0), |(n_rows, n_cols), (row_idx, col_idx)| {
                (
                    usize::max(n_rows, row_idx.saturating_add(1)),
                    usize::max(n_cols, col_idx.saturating_add(1)),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{EnumTextAlign, SpecHexColor};

    #[test]
    fn test_format_cell_twice_without_exist_ok_fails() {
        let mut fmt_map = SpecCellFormatMap::new();
        let fmt = SpecCellFormat::default().with_bold(true);

        fmt_map.format_cell(1, 2, &fmt, false).unwrap();
        let err = fmt_map.format_cell(1, 2, &fmt, false).unwrap_err();

        assert!(matches!(err, GridError::DuplicateCellFormat { row: 1, col: 2 }));
        assert_eq!(fmt_map.len(), 1);
    }

    #[test]
    fn test_format_cell_twice_with_exist_ok_merges() {
        let mut fmt_map = SpecCellFormatMap::new();
        let fmt_a = SpecCellFormat::default()
            .with_bold(true)
            .with_font_size(12);
        let fmt_b = SpecCellFormat::default()
            .with_font_size(16)
            .with_fill_color(SpecHexColor::BLUE);

        fmt_map.format_cell(0, 0, &fmt_a, true).unwrap();
        fmt_map.format_cell(0, 0, &fmt_b, true).unwrap();

        assert_eq!(fmt_map.get(0, 0), Some(&fmt_a.merge(&fmt_b)));
    }

    #[test]
    fn test_stored_format_is_independent_of_caller_copy() {
        let mut fmt_map = SpecCellFormatMap::new();
        let mut fmt = SpecCellFormat::default().with_align(EnumTextAlign::Right);

        fmt_map.format_cell(3, 3, &fmt, false).unwrap();
        fmt.align = Some(EnumTextAlign::Left);
        fmt.bold = Some(true);

        let fmt_stored = fmt_map.get(3, 3).unwrap();
        assert_eq!(fmt_stored.align, Some(EnumTextAlign::Right));
        assert_eq!(fmt_stored.bold, None);
    }

    #[test]
    fn test_iter_cells_is_restartable_and_ordered() {
        let mut fmt_map = SpecCellFormatMap::new();
        let fmt = SpecCellFormat::default().with_bold(true);
        fmt_map.format_cell(2, 0, &fmt, false).unwrap();
        fmt_map.format_cell(0, 5, &fmt, false).unwrap();
        fmt_map.format_cell(0, 1, &fmt, false).unwrap();

        let l_first: Vec<_> = fmt_map.iter_cells().map(|(r, c, _)| (r, c)).collect();
        let l_second: Vec<_> = fmt_map.iter_cells().map(|(r, c, _)| (r, c)).collect();

        assert_eq!(l_first, vec![(0, 1), (0, 5), (2, 0)]);
        assert_eq!(l_first, l_second);
        assert_eq!(fmt_map.extent(), (3, 6));
    }

    #[test]
    fn test_format_cell_rejects_invalid_format() {
        let mut fmt_map = SpecCellFormatMap::new();
        let err = fmt_map
            .format_cell(0, 0, &SpecCellFormat::default().with_font_size(0), false)
            .unwrap_err();
        assert!(matches!(err, GridError::MalformedFormat(_)));
        assert!(fmt_map.is_empty());
    }
}
