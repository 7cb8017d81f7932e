//! Result set providers: where the population rows come from.
//!
//! The engine only needs an ordered list of rows keyed by lowercase field
//! name. The bundled provider reads a query result exported as CSV.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::info;

use crate::{
    data::{FieldIndex, ResultRow, ResultSet, parse_raw_value},
    io_utils,
};

pub trait ResultSetProvider {
    fn fetch(&self) -> Result<ResultSet>;
}

/// A query result exported as delimited text with a header row.
#[derive(Debug, Clone)]
pub struct CsvResultSet {
    pub path: PathBuf,
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
}

impl CsvResultSet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: None,
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl ResultSetProvider for CsvResultSet {
    fn fetch(&self) -> Result<ResultSet> {
        let delimiter = io_utils::resolve_input_delimiter(&self.path, self.delimiter);
        let mut reader = io_utils::open_csv_reader_from_path(&self.path, delimiter)?;
        let headers = io_utils::reader_headers(&mut reader, self.encoding)
            .with_context(|| format!("Reading result headers from {:?}", self.path))?;
        let fields = Arc::new(FieldIndex::new(&headers));

        let mut rows = Vec::new();
        let mut record = csv::ByteRecord::new();
        while reader
            .read_byte_record(&mut record)
            .with_context(|| format!("Reading result rows from {:?}", self.path))?
        {
            let values = io_utils::decode_record(&record, self.encoding)
                .with_context(|| format!("Decoding result row {}", rows.len() + 1))?
                .iter()
                .map(|raw| parse_raw_value(raw))
                .collect();
            rows.push(ResultRow::new(Arc::clone(&fields), values));
        }
        info!(
            "Loaded {} result row(s) with {} field(s) from {:?}",
            rows.len(),
            fields.names().len(),
            self.path
        );
        Ok(ResultSet::new(rows))
    }
}
