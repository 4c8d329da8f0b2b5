//! JSON-lines record store: one JSON object per line, appended.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use gridkit_io_xlsx::SpecDataTable;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::spec::{DictRecord, RecordError};
use crate::util::{derive_table_from_records, ensure_file, truncate_file};

/// Append-only JSON-lines file.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    /// Bind to `path`, creating an empty file if it is missing.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let path = path.into();
        ensure_file(&path, "")?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append each item as one compact JSON line.
    pub fn save<T, I>(&self, items: I) -> Result<usize, RecordError>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        let mut n_written = 0usize;
        for item in items {
            serde_json::to_writer(&mut writer, &item)?;
            writer.write_all(b"\n")?;
            n_written += 1;
        }
        writer.flush()?;
        tracing::debug!(path = %self.path.display(), n_written, "jsonl records appended");
        Ok(n_written)
    }

    /// All records as JSON objects.
    ///
    /// A malformed line (invalid UTF-8, bad JSON or a non-object) makes the
    /// whole read return empty after logging the failure.
    pub fn read(&self) -> Result<Vec<DictRecord>, RecordError> {
        self.read_as::<DictRecord>()
    }

    /// All records deserialized into `T`, with the same leniency as [`Self::read`].
    pub fn read_as<T: DeserializeOwned>(&self) -> Result<Vec<T>, RecordError> {
        let content = std::fs::read(&self.path)?;
        let mut l_items = Vec::new();
        for (n_idx_line, line) in content.split(|byte| *byte == b'\n').enumerate() {
            let line = line.trim_ascii();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_slice::<T>(line) {
                Ok(item) => l_items.push(item),
                Err(err) => {
                    tracing::error!(
                        path = %self.path.display(),
                        line = n_idx_line + 1,
                        error = %err,
                        "malformed jsonl record; returning no records"
                    );
                    return Ok(Vec::new());
                }
            }
        }
        Ok(l_items)
    }

    /// Records as a table over the union of their keys.
    pub fn read_into_table(&self) -> Result<SpecDataTable, RecordError> {
        derive_table_from_records(&self.read()?)
    }

    /// Truncate the file to zero records.
    pub fn delete_all_data(&self) -> Result<(), RecordError> {
        truncate_file(&self.path)
    }
}
