//! Tabular import from `.csv` and `.xlsx` files.

use std::path::Path;

use calamine::{Reader, open_workbook_auto};
use gridkit_io_xlsx::{EnumCellValue, SpecDataTable};

use crate::spec::{EnumImportSource, RecordError};
use crate::util::{convert_calamine_data, infer_cell_value};

/// Read the table stored at `path`.
///
/// CSV fields go through basic type inference. For `.xlsx`/`.xls`, `sheet_name`
/// selects the worksheet (first sheet when `None`) and its first used row is
/// the header.
pub fn import_table(path: &Path, sheet_name: Option<&str>) -> Result<SpecDataTable, RecordError> {
    let source = EnumImportSource::from_path(path)
        .ok_or_else(|| RecordError::UnsupportedSource(path.to_path_buf()))?;
    let table = match source {
        EnumImportSource::Csv => import_csv_table(path)?,
        EnumImportSource::Workbook => import_workbook_table(path, sheet_name)?,
    };
    tracing::debug!(
        path = %path.display(),
        n_rows = table.rows().len(),
        n_cols = table.total_columns(),
        "table imported"
    );
    Ok(table)
}

/// Import a table keeping only `columns`, in the given order.
///
/// Column names are lowercased on read and matched against the lowercased
/// requested names.
pub fn import_table_columns(path: &Path, columns: &[&str]) -> Result<SpecDataTable, RecordError> {
    let table = import_table(path, None)?;
    let l_colnames_lower: Vec<String> = table
        .column_names()
        .iter()
        .map(|c_name| c_name.as_deref().unwrap_or("").to_lowercase())
        .collect();

    let mut l_selected = Vec::with_capacity(columns.len());
    for c_column in columns {
        let c_column_lower = c_column.to_lowercase();
        let n_idx = l_colnames_lower
            .iter()
            .position(|c_name| *c_name == c_column_lower)
            .ok_or_else(|| RecordError::MissingColumn(c_column.to_string()))?;
        l_selected.push((c_column_lower, n_idx));
    }

    let l_rows = table
        .rows()
        .iter()
        .map(|row| {
            l_selected
                .iter()
                .map(|(_, n_idx)| row[*n_idx].clone())
                .collect()
        })
        .collect();
    Ok(SpecDataTable::new(
        l_selected.into_iter().map(|(c_name, _)| c_name),
        l_rows,
    )?)
}

fn import_csv_table(path: &Path) -> Result<SpecDataTable, RecordError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let l_colnames: Vec<String> = reader.headers()?.iter().map(ToString::to_string).collect();

    let mut l_rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        l_rows.push(record.iter().map(infer_cell_value).collect());
    }
    Ok(SpecDataTable::new(l_colnames, l_rows)?)
}

fn import_workbook_table(path: &Path, sheet_name: Option<&str>) -> Result<SpecDataTable, RecordError> {
    let mut workbook = open_workbook_auto(path)?;
    let l_sheet_names = workbook.sheet_names();
    let c_sheet = match sheet_name {
        Some(name) if l_sheet_names.iter().any(|c_name| c_name == name) => name.to_string(),
        Some(name) => return Err(RecordError::MissingSheet(name.to_string())),
        None => l_sheet_names
            .first()
            .cloned()
            .ok_or_else(|| RecordError::MissingSheet(String::new()))?,
    };

    let range = workbook.worksheet_range(&c_sheet)?;
    let mut iter_rows = range.rows();
    let Some(row_header) = iter_rows.next() else {
        return Ok(SpecDataTable::new(Vec::<String>::new(), Vec::new())?);
    };
    let l_colnames: Vec<String> = row_header.iter().map(ToString::to_string).collect();
    let l_rows: Vec<Vec<EnumCellValue>> = iter_rows
        .map(|row| row.iter().map(convert_calamine_data).collect())
        .collect();
    Ok(SpecDataTable::new(l_colnames, l_rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("input.csv");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_import_csv_infers_types() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_csv(tmp.path(), "name,score,ok\na,1.5,true\nb,,FALSE\n");

        let table = import_table(&path, None).unwrap();

        assert_eq!(table.body_shape(), (2, 3));
        assert_eq!(
            table.rows()[0],
            vec!["a".into(), EnumCellValue::Number(1.5), true.into()]
        );
        assert_eq!(
            table.rows()[1],
            vec!["b".into(), EnumCellValue::None, false.into()]
        );
    }

    #[test]
    fn test_import_unsupported_extension() {
        let err = import_table(Path::new("input.parquet"), None).unwrap_err();
        assert!(matches!(err, RecordError::UnsupportedSource(_)));
    }

    #[test]
    fn test_import_table_columns_lowercases_and_selects() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_csv(tmp.path(), "Name,Score,Extra\na,1,x\n");

        let table = import_table_columns(&path, &["score", "NAME"]).unwrap();

        assert_eq!(
            table.column_names(),
            &[Some("score".to_string()), Some("name".to_string())]
        );
        assert_eq!(table.rows()[0], vec![EnumCellValue::Number(1.0), "a".into()]);

        let err = import_table_columns(&path, &["missing"]).unwrap_err();
        assert!(matches!(err, RecordError::MissingColumn(c) if c == "missing"));
    }

    #[test]
    fn test_import_xls_routes_to_workbook_reader() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("legacy.xls");
        std::fs::write(&path, b"not a compound document").unwrap();

        let err = import_table(&path, None).unwrap_err();
        assert!(matches!(err, RecordError::Workbook(_)));
    }

    #[test]
    fn test_import_ragged_csv_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_csv(tmp.path(), "a,b\n1\n");

        assert!(matches!(
            import_table(&path, None).unwrap_err(),
            RecordError::Csv(_)
        ));
    }
}
