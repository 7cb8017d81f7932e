//! Lookup index: part key to alternate identifier and description.
//!
//! Built once per run from a CSV export. Keys are the trimmed raw value of the
//! key column and match case-sensitively; a repeated key keeps the last row.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::Encoding;
use log::{debug, warn};

use crate::{error::LookupMiss, io_utils};

pub const DEFAULT_KEY_COLUMN: &str = "Part #";
pub const DEFAULT_ALTERNATE_ID_COLUMN: &str = "Part ID";
pub const DEFAULT_DESCRIPTION_COLUMN: &str = "Description";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRecord {
    pub key: String,
    pub alternate_id: String,
    pub description: String,
}

/// Which CSV headers feed each [`LookupRecord`] field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupColumns {
    pub key: String,
    pub alternate_id: String,
    pub description: String,
}

impl Default for LookupColumns {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY_COLUMN.to_string(),
            alternate_id: DEFAULT_ALTERNATE_ID_COLUMN.to_string(),
            description: DEFAULT_DESCRIPTION_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LookupIndex {
    records: HashMap<String, LookupRecord>,
}

impl LookupIndex {
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = LookupRecord>,
    {
        let mut index = LookupIndex::default();
        for record in records {
            index.insert(record);
        }
        index
    }

    fn insert(&mut self, mut record: LookupRecord) {
        record.key = record.key.trim().to_string();
        if record.key.is_empty() {
            return;
        }
        if self.records.contains_key(&record.key) {
            debug!("Lookup key '{}' repeated; keeping the later row", record.key);
        }
        self.records.insert(record.key.clone(), record);
    }

    pub fn load(path: &Path, columns: &LookupColumns, encoding: &'static Encoding) -> Result<Self> {
        let delimiter = io_utils::resolve_input_delimiter(path, None);
        let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
        let headers = io_utils::reader_headers(&mut reader, encoding)
            .with_context(|| format!("Reading lookup headers from {path:?}"))?;
        let position = |name: &str| headers.iter().position(|h| h == name.trim());

        let key_idx = position(&columns.key)
            .ok_or_else(|| anyhow!("Lookup file {path:?} has no '{}' column", columns.key))?;
        let alternate_idx = position(&columns.alternate_id);
        let description_idx = position(&columns.description);
        if alternate_idx.is_none() {
            warn!(
                "Lookup file {path:?} has no '{}' column; alternate ids will be blank",
                columns.alternate_id
            );
        }
        if description_idx.is_none() {
            warn!(
                "Lookup file {path:?} has no '{}' column; descriptions will be blank",
                columns.description
            );
        }

        let mut index = LookupIndex::default();
        let mut record = csv::ByteRecord::new();
        while reader
            .read_byte_record(&mut record)
            .with_context(|| format!("Reading lookup rows from {path:?}"))?
        {
            let fields = io_utils::decode_record(&record, encoding)?;
            let field = |idx: Option<usize>| {
                idx.and_then(|idx| fields.get(idx))
                    .map(|value| value.trim().to_string())
                    .unwrap_or_default()
            };
            index.insert(LookupRecord {
                key: field(Some(key_idx)),
                alternate_id: field(alternate_idx),
                description: field(description_idx),
            });
        }
        Ok(index)
    }

    pub fn get(&self, key: &str) -> Option<&LookupRecord> {
        self.records.get(key.trim())
    }

    /// Trims `key` and looks it up, naming why nothing was found.
    pub fn resolve(&self, key: &str) -> Result<&LookupRecord, LookupMiss> {
        let key = key.trim();
        if key.is_empty() {
            return Err(LookupMiss::EmptyKey);
        }
        self.records
            .get(key)
            .ok_or_else(|| LookupMiss::UnknownKey(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A lookup path may be a CSV file or a directory holding one; in a
/// directory the first `*.csv` by name is used.
pub fn discover_lookup_file(path: &Path) -> Result<Option<PathBuf>> {
    if path.is_file() {
        return Ok(Some(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Ok(None);
    }
    let mut candidates = fs::read_dir(path)
        .with_context(|| format!("Listing lookup directory {path:?}"))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|candidate| {
            candidate.is_file()
                && candidate
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect::<Vec<_>>();
    candidates.sort();
    Ok(candidates.into_iter().next())
}
