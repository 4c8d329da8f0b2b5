//! Value conversion helpers shared by the stores and importers.

use std::fs::OpenOptions;
use std::path::Path;

use calamine::Data;
use gridkit_io_xlsx::{EnumCellValue, SpecDataTable};
use serde_json::Value;

use crate::spec::{DictRecord, RecordError};

/// Infer a cell value from one text field.
///
/// Empty is missing; `true`/`false` (any case) are booleans; finite numbers are
/// numbers; everything else stays text.
pub fn infer_cell_value(field: &str) -> EnumCellValue {
    if field.is_empty() {
        return EnumCellValue::None;
    }
    if field.eq_ignore_ascii_case("true") {
        return EnumCellValue::Boolean(true);
    }
    if field.eq_ignore_ascii_case("false") {
        return EnumCellValue::Boolean(false);
    }
    match field.trim().parse::<f64>() {
        Ok(val) if val.is_finite() => EnumCellValue::Number(val),
        _ => EnumCellValue::String(field.to_string()),
    }
}

/// Convert one JSON value into a cell value. Arrays and objects keep their
/// compact JSON text.
pub fn convert_json_to_cell_value(value: &Value) -> EnumCellValue {
    match value {
        Value::Null => EnumCellValue::None,
        Value::Bool(val) => EnumCellValue::Boolean(*val),
        Value::Number(val) => val
            .as_f64()
            .map_or_else(|| EnumCellValue::String(val.to_string()), EnumCellValue::Number),
        Value::String(val) => EnumCellValue::String(val.clone()),
        other => EnumCellValue::String(other.to_string()),
    }
}

pub fn convert_calamine_data(data: &Data) -> EnumCellValue {
    match data {
        Data::Empty => EnumCellValue::None,
        Data::String(val) if val.is_empty() => EnumCellValue::None,
        Data::String(val) => EnumCellValue::String(val.clone()),
        Data::Float(val) => EnumCellValue::Number(*val),
        Data::Int(val) => EnumCellValue::Number(*val as f64),
        Data::Bool(val) => EnumCellValue::Boolean(*val),
        // Excel serial number.
        Data::DateTime(val) => EnumCellValue::Number(val.as_f64()),
        Data::DateTimeIso(val) | Data::DurationIso(val) => EnumCellValue::String(val.clone()),
        Data::Error(val) => EnumCellValue::String(val.to_string()),
    }
}

/// Build a table from JSON records over the union of their keys.
///
/// Columns follow first-seen key order; records lacking a key get a missing
/// value there.
pub fn derive_table_from_records(l_records: &[DictRecord]) -> Result<SpecDataTable, RecordError> {
    let mut l_colnames: Vec<String> = Vec::new();
    for record in l_records {
        for c_key in record.keys() {
            if !l_colnames.contains(c_key) {
                l_colnames.push(c_key.clone());
            }
        }
    }

    let l_rows = l_records
        .iter()
        .map(|record| {
            l_colnames
                .iter()
                .map(|c_key| {
                    record
                        .get(c_key)
                        .map_or(EnumCellValue::None, convert_json_to_cell_value)
                })
                .collect()
        })
        .collect();

    Ok(SpecDataTable::new(l_colnames, l_rows)?)
}

/// Create `path` as an empty file (or with `content`) if it does not exist.
pub(crate) fn ensure_file(path: &Path, content: &str) -> Result<(), RecordError> {
    if path.exists() {
        return Ok(());
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Truncate `path` to zero length, creating it if needed.
pub(crate) fn truncate_file(path: &Path) -> Result<(), RecordError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    Ok(())
}
