//! Single-object JSON store.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::spec::{DictRecord, RecordError};
use crate::util::ensure_file;

const C_EMPTY_OBJECT: &str = "{}";

/// One JSON object persisted to one file, pretty-printed with 4-space indent.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Bind to `path`, writing `{}` if the file is missing.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let path = path.into();
        ensure_file(&path, C_EMPTY_OBJECT)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the stored object with `data`.
    ///
    /// With `existing_ok = false`, fails when the store already holds a
    /// non-empty object.
    pub fn save<T: Serialize + ?Sized>(&self, data: &T, existing_ok: bool) -> Result<(), RecordError> {
        if !existing_ok && self.has_data()? {
            return Err(RecordError::ExistingData(self.path.clone()));
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);
        let mut ser =
            serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        data.serialize(&mut ser)?;
        writer.flush()?;
        tracing::info!(path = %self.path.display(), "saved json");
        Ok(())
    }

    /// Stored object; empty, corrupt (including invalid UTF-8) or non-object
    /// content reads as `{}`.
    pub fn read(&self) -> Result<DictRecord, RecordError> {
        let content = std::fs::read(&self.path)?;
        let content = content.trim_ascii();
        if content.is_empty() {
            return Ok(DictRecord::new());
        }
        match serde_json::from_slice::<DictRecord>(content) {
            Ok(data) => Ok(data),
            Err(err) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %err,
                    "json decode error; returning empty object"
                );
                Ok(DictRecord::new())
            }
        }
    }

    pub fn has_data(&self) -> Result<bool, RecordError> {
        Ok(!self.read()?.is_empty())
    }

    /// Reset the file to `{}`.
    pub fn delete_all_data(&self) -> Result<(), RecordError> {
        std::fs::write(&self.path, C_EMPTY_OBJECT)?;
        tracing::info!(path = %self.path.display(), "cleared json");
        Ok(())
    }
}
