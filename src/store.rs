//! Spreadsheet document store: the cell-level surface the engine writes through.
//!
//! [`Worksheet`] is all the population engine needs from a document: read a
//! cell as text, write a typed value (or a blank), and report the widest used
//! column. [`DocumentStore`] opens and saves whole documents. The workbook
//! implementation edits the active sheet of an `.xlsx` file in place through
//! `umya-spreadsheet`, leaving every cell it does not write untouched.

use std::{
    collections::BTreeMap,
    fs,
    path::Path,
};

use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use umya_spreadsheet::Spreadsheet;

use crate::{data::Value, error::StoreError};

const DATE_FORMAT_CODE: &str = "yyyy-mm-dd";
const DATETIME_FORMAT_CODE: &str = "yyyy-mm-dd hh:mm:ss";

/// Row and column indices are 1-based.
pub trait Worksheet {
    /// Cell contents as text; `None` for a missing or empty cell.
    fn cell_text(&self, row: u32, column: u32) -> Option<String>;

    /// Writes `value`, or blanks the cell when `value` is absent.
    fn set_cell(&mut self, row: u32, column: u32, value: Option<&Value>);

    fn max_column(&self) -> u32;

    /// Trimmed text of every cell in `row` up to [`Worksheet::max_column`].
    fn row_texts(&self, row: u32) -> Vec<String> {
        (1..=self.max_column())
            .map(|column| {
                self.cell_text(row, column)
                    .map(|text| text.trim().to_string())
                    .unwrap_or_default()
            })
            .collect()
    }
}

pub trait DocumentStore {
    type Document: Worksheet;

    fn open(&self, path: &Path) -> Result<Self::Document, StoreError>;

    /// Saves to `dest`, creating parent directories as needed.
    fn save(&self, document: &Self::Document, dest: &Path) -> Result<(), StoreError>;
}

/// In-memory grid, used for dry runs and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySheet {
    cells: BTreeMap<(u32, u32), Option<Value>>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a sheet from text rows starting at row 1; empty strings leave
    /// the cell unset.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let mut sheet = Self::new();
        for (row_idx, row) in rows.into_iter().enumerate() {
            for (col_idx, text) in row.into_iter().enumerate() {
                let text = text.as_ref();
                if text.is_empty() {
                    continue;
                }
                sheet.cells.insert(
                    (row_idx as u32 + 1, col_idx as u32 + 1),
                    Some(Value::Text(text.to_string())),
                );
            }
        }
        sheet
    }

    pub fn value(&self, row: u32, column: u32) -> Option<&Value> {
        self.cells.get(&(row, column)).and_then(|value| value.as_ref())
    }

    /// Whether the cell exists, even as a blank.
    pub fn is_touched(&self, row: u32, column: u32) -> bool {
        self.cells.contains_key(&(row, column))
    }
}

impl Worksheet for MemorySheet {
    fn cell_text(&self, row: u32, column: u32) -> Option<String> {
        self.value(row, column)
            .map(Value::as_display)
            .filter(|text| !text.is_empty())
    }

    fn set_cell(&mut self, row: u32, column: u32, value: Option<&Value>) {
        self.cells.insert((row, column), value.cloned());
    }

    fn max_column(&self) -> u32 {
        self.cells.keys().map(|(_, column)| *column).max().unwrap_or(0)
    }
}

/// A workbook opened from disk; reads and writes go to its active sheet.
pub struct XlsxDocument {
    book: Spreadsheet,
}

impl XlsxDocument {
    pub fn new(book: Spreadsheet) -> Self {
        Self { book }
    }

    pub fn book(&self) -> &Spreadsheet {
        &self.book
    }
}

impl Worksheet for XlsxDocument {
    fn cell_text(&self, row: u32, column: u32) -> Option<String> {
        self.book
            .get_active_sheet()
            .get_cell((column, row))
            .map(|cell| cell.get_value().into_owned())
            .filter(|text| !text.is_empty())
    }

    fn set_cell(&mut self, row: u32, column: u32, value: Option<&Value>) {
        let cell = self.book.get_active_sheet_mut().get_cell_mut((column, row));
        match value {
            None => {
                cell.set_blank();
            }
            Some(Value::Text(text)) => {
                cell.set_value_string(text.clone());
            }
            Some(Value::Number(number)) => {
                cell.set_value_number(*number);
            }
            Some(Value::Date(date)) => {
                cell.set_value_number(date_serial(*date));
                cell.get_style_mut()
                    .get_number_format_mut()
                    .set_format_code(DATE_FORMAT_CODE);
            }
            Some(Value::DateTime(dt)) => {
                cell.set_value_number(datetime_serial(*dt));
                cell.get_style_mut()
                    .get_number_format_mut()
                    .set_format_code(DATETIME_FORMAT_CODE);
            }
        }
    }

    fn max_column(&self) -> u32 {
        self.book.get_active_sheet().get_highest_column()
    }
}

/// `.xlsx`/`.xlsm` workbooks on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxStore;

impl XlsxStore {
    pub fn supports(path: &Path) -> bool {
        matches!(
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_ascii_lowercase())
                .as_deref(),
            Some("xlsx") | Some("xlsm")
        )
    }
}

impl DocumentStore for XlsxStore {
    type Document = XlsxDocument;

    fn open(&self, path: &Path) -> Result<XlsxDocument, StoreError> {
        if !Self::supports(path) {
            return Err(StoreError::UnsupportedFormat(path.to_path_buf()));
        }
        debug!("Opening workbook {path:?}");
        let book = umya_spreadsheet::reader::xlsx::read(path).map_err(|err| StoreError::Open {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Ok(XlsxDocument::new(book))
    }

    fn save(&self, document: &XlsxDocument, dest: &Path) -> Result<(), StoreError> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        umya_spreadsheet::writer::xlsx::write(&document.book, dest).map_err(|err| {
            StoreError::Save {
                path: dest.to_path_buf(),
                message: err.to_string(),
            }
        })
    }
}

fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

/// Days since the 1900 date system epoch, as Excel stores dates.
pub fn date_serial(date: NaiveDate) -> f64 {
    (date - excel_epoch()).num_days() as f64
}

pub fn datetime_serial(dt: NaiveDateTime) -> f64 {
    let seconds = (dt - excel_epoch().and_time(chrono::NaiveTime::MIN)).num_seconds();
    seconds as f64 / 86_400.0
}
