//! Schema model: per-template layout entries and their persistence.
//!
//! A schema file is a list of [`SchemaEntry`] records, one per template
//! workbook. Each entry names the template by its path relative to the input
//! root, the first row to write, and the ordered output columns with the
//! source expression that fills each of them.
//!
//! Files are JSON or YAML depending on the extension, using the field names
//! `filename`, `starting_row`, `columns[].columnname` and
//! `columns[].dfcolumnname`.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use log::warn;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::SchemaError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    #[serde(rename = "columnname")]
    pub output_name: String,
    /// Empty means the column is resolved but never written for data rows.
    #[serde(
        rename = "dfcolumnname",
        default,
        deserialize_with = "deserialize_optional_string"
    )]
    pub source_expression: String,
}

impl ColumnDescriptor {
    pub fn new(output_name: impl Into<String>, source_expression: impl Into<String>) -> Self {
        Self {
            output_name: output_name.into(),
            source_expression: source_expression.into(),
        }
    }

    pub fn has_expression(&self) -> bool {
        !self.source_expression.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub filename: String,
    #[serde(
        default = "default_starting_row",
        deserialize_with = "deserialize_starting_row"
    )]
    pub starting_row: u32,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
}

fn default_starting_row() -> u32 {
    1
}

fn deserialize_starting_row<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = u32::deserialize(deserializer)?;
    if value == 0 {
        return Err(de::Error::custom("starting_row must be a positive integer"));
    }
    Ok(value)
}

fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl SchemaEntry {
    pub fn new(filename: impl Into<String>, starting_row: u32, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            filename: filename.into(),
            starting_row: starting_row.max(1),
            columns,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaFormat {
    Json,
    Yaml,
}

impl SchemaFormat {
    fn from_path(path: &Path) -> Result<Self, SchemaError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(SchemaFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                Ok(SchemaFormat::Yaml)
            }
            _ => Err(SchemaError::UnsupportedExtension(path.to_path_buf())),
        }
    }
}

/// Immutable, ordered collection of schema entries for one run.
#[derive(Debug, Clone, Default)]
pub struct SchemaStore {
    entries: Vec<SchemaEntry>,
    by_filename: HashMap<String, usize>,
}

impl SchemaStore {
    pub fn new(entries: Vec<SchemaEntry>) -> Self {
        let mut by_filename = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if by_filename.contains_key(&entry.filename) {
                warn!(
                    "Duplicate schema entry for '{}' ignored; the first entry wins",
                    entry.filename
                );
                continue;
            }
            by_filename.insert(entry.filename.clone(), idx);
        }
        Self {
            entries,
            by_filename,
        }
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        if !path.exists() {
            return Err(SchemaError::Missing(path.to_path_buf()));
        }
        let format = SchemaFormat::from_path(path)?;
        let raw = fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let entries = parse_entries(&raw, format).map_err(|message| SchemaError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact match on a `/`-separated path relative to the input root.
    pub fn find(&self, relative_path: &str) -> Option<&SchemaEntry> {
        self.by_filename
            .get(&normalize_relative_path(relative_path))
            .and_then(|idx| self.entries.get(*idx))
    }
}

fn parse_entries(raw: &str, format: SchemaFormat) -> Result<Vec<SchemaEntry>, String> {
    match format {
        SchemaFormat::Json => serde_json::from_str(raw).map_err(|err| err.to_string()),
        SchemaFormat::Yaml => serde_yaml::from_str(raw).map_err(|err| err.to_string()),
    }
}

/// Writes entries as JSON or YAML according to the destination extension.
pub fn save_entries(path: &Path, entries: &[SchemaEntry]) -> Result<(), SchemaError> {
    let format = SchemaFormat::from_path(path)?;
    let serialized = match format {
        SchemaFormat::Json => serde_json::to_string_pretty(entries).map_err(|err| err.to_string()),
        SchemaFormat::Yaml => serde_yaml::to_string(entries).map_err(|err| err.to_string()),
    }
    .map_err(|message| SchemaError::Write {
        path: path.to_path_buf(),
        message,
    })?;
    fs::write(path, serialized).map_err(|err| SchemaError::Write {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

pub fn normalize_relative_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Relative path of `path` under `root`, `/`-separated.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative: PathBuf = path.strip_prefix(root).ok()?.to_path_buf();
    let joined = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    Some(normalize_relative_path(&joined))
}
