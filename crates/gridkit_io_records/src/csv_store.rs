//! CSV record store and table/grid CSV writers.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use gridkit_io_xlsx::{EnumCellValue, SpecDataTable, SpecSheetGrid};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::spec::RecordError;
use crate::util::{ensure_file, truncate_file};

/// Append-only CSV file of serde records.
///
/// The header line is written by the first `save` into an empty file.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    /// Bind to `path`, creating an empty file if it is missing.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let path = path.into();
        ensure_file(&path, "")?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_empty_file(&self) -> Result<bool, RecordError> {
        Ok(std::fs::metadata(&self.path)?.len() == 0)
    }

    /// Append `items`; returns the number of records written.
    pub fn save<T, I>(&self, items: I) -> Result<usize, RecordError>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        let if_write_header = self.is_empty_file()?;
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(if_write_header)
            .from_writer(file);

        let mut n_written = 0usize;
        for item in items {
            writer.serialize(item)?;
            n_written += 1;
        }
        writer.flush()?;
        tracing::debug!(path = %self.path.display(), n_written, "csv records appended");
        Ok(n_written)
    }

    /// All records; a malformed record makes the read return empty after
    /// logging the failure.
    pub fn read_as<T: DeserializeOwned>(&self) -> Result<Vec<T>, RecordError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(File::open(&self.path)?);

        let mut l_items = Vec::new();
        for result in reader.deserialize::<T>() {
            match result {
                Ok(item) => l_items.push(item),
                Err(err) => {
                    tracing::error!(
                        path = %self.path.display(),
                        error = %err,
                        "malformed csv record; returning no records"
                    );
                    return Ok(Vec::new());
                }
            }
        }
        Ok(l_items)
    }

    /// Records as a table with inferred cell types.
    pub fn read_into_table(&self) -> Result<SpecDataTable, RecordError> {
        crate::import::import_table(&self.path, None)
    }

    /// Truncate the file; the next `save` writes a fresh header.
    pub fn delete_all_data(&self) -> Result<(), RecordError> {
        truncate_file(&self.path)
    }
}

fn derive_csv_field(value: &EnumCellValue) -> String {
    value.to_display_string()
}

/// Write `table` (header line, then body rows) to `path`, replacing it.
pub fn write_table_csv(path: &Path, table: &SpecDataTable) -> Result<(), RecordError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(
        table
            .column_names()
            .iter()
            .map(|c_name| c_name.as_deref().unwrap_or("")),
    )?;
    for row in table.rows() {
        writer.write_record(row.iter().map(derive_csv_field))?;
    }
    writer.flush()?;
    tracing::debug!(path = %path.display(), n_rows = table.rows().len(), "table written to csv");
    Ok(())
}

/// Write a flattened sheet grid to `path` row by row, replacing it.
///
/// Table headers are already part of the grid; no extra label line is added.
pub fn write_grid_csv(path: &Path, grid: &SpecSheetGrid) -> Result<(), RecordError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    for row in grid.rows() {
        writer.write_record(row.iter().map(derive_csv_field))?;
    }
    writer.flush()?;
    tracing::debug!(path = %path.display(), n_rows = grid.rows().len(), "grid written to csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use gridkit_io_xlsx::SpecDataSheet;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: u32,
        label: String,
        ratio: f64,
    }

    fn derive_rows(n: u32) -> Vec<Row> {
        (0..n)
            .map(|id| Row {
                id,
                label: format!("label, {id}"),
                ratio: f64::from(id) / 4.0,
            })
            .collect()
    }

    #[test]
    fn test_round_trip_sizes() {
        for n in [0, 1, 1000] {
            let tmp = tempfile::tempdir().unwrap();
            let store = CsvStore::new(tmp.path().join("rows.csv")).unwrap();
            let l_rows = derive_rows(n);

            assert_eq!(store.save(&l_rows).unwrap(), n as usize);
            assert_eq!(store.read_as::<Row>().unwrap(), l_rows);
        }
    }

    #[test]
    fn test_header_written_once() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rows.csv");
        let store = CsvStore::new(&path).unwrap();

        store.save(derive_rows(1)).unwrap();
        store.save(derive_rows(2)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("id,label,ratio").count(), 1);
        assert_eq!(store.read_as::<Row>().unwrap().len(), 3);
    }

    #[test]
    fn test_delete_all_data_resets_header() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CsvStore::new(tmp.path().join("rows.csv")).unwrap();
        store.save(derive_rows(3)).unwrap();

        store.delete_all_data().unwrap();
        assert!(store.read_as::<Row>().unwrap().is_empty());

        store.save(derive_rows(1)).unwrap();
        assert_eq!(store.read_as::<Row>().unwrap(), derive_rows(1));
    }

    #[test]
    fn test_malformed_record_reads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rows.csv");
        std::fs::write(&path, "id,label,ratio\n1,a,0.5\nx,b,oops\n").unwrap();
        let store = CsvStore::new(&path).unwrap();

        assert!(store.read_as::<Row>().unwrap().is_empty());
    }

    #[test]
    fn test_write_table_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("table.csv");
        let mut table = SpecDataTable::new(
            ["name", "score"],
            vec![
                vec!["a".into(), 1i64.into()],
                vec!["b".into(), EnumCellValue::Number(f64::NAN)],
            ],
        )
        .unwrap();
        table.insert_empty_columns(1);

        write_table_csv(&path, &table).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "name,score,\na,1,\nb,,\n"
        );
    }

    #[test]
    fn test_write_grid_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("grid.csv");
        let mut sheet = SpecDataSheet::new();
        sheet.insert_data_table(
            SpecDataTable::new(["x"], vec![vec![true.into()]]).unwrap(),
            0,
            1,
        );

        write_grid_csv(&path, &sheet.flatten_to_grid()).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), ",x\n,true\n");
    }
}
