//! `gridkit_io_records` v1:
//! Flat-record stores and tabular import.
//!
//! Modules:
//! - `spec`        : record types/errors
//! - `util`        : value inference and conversion helpers
//! - `jsonl_store` : append-only JSON-lines store
//! - `json_store`  : single-object JSON store
//! - `csv_store`   : CSV record store and table/grid CSV writers
//! - `import`      : `.csv`/`.xlsx`/`.xls` table import
pub mod csv_store;
pub mod import;
pub mod json_store;
pub mod jsonl_store;
pub mod spec;
pub mod util;

pub use csv_store::{CsvStore, write_grid_csv, write_table_csv};
pub use import::{import_table, import_table_columns};
pub use json_store::JsonStore;
pub use jsonl_store::JsonlStore;
pub use spec::{DictRecord, EnumImportSource, RecordError};
pub use util::{convert_json_to_cell_value, derive_table_from_records, infer_cell_value};
