#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use price_lists::store::{DocumentStore, Worksheet, XlsxDocument, XlsxStore};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write temp file contents");
        path
    }

    /// Writes a single-sheet workbook whose rows start at row 1; empty
    /// strings leave the cell unset.
    pub fn write_template(&self, name: &str, rows: &[&[&str]]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_active_sheet_mut();
        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, text) in row.iter().enumerate() {
                if text.is_empty() {
                    continue;
                }
                sheet
                    .get_cell_mut((col_idx as u32 + 1, row_idx as u32 + 1))
                    .set_value(*text);
            }
        }
        umya_spreadsheet::writer::xlsx::write(&book, &path).expect("write template workbook");
        path
    }
}

/// Opens a workbook written by the generator.
pub fn open_workbook(path: &Path) -> XlsxDocument {
    XlsxStore.open(path).expect("open workbook")
}

/// Text of every cell in `row`, from column 1 through `columns`.
pub fn row_text(document: &XlsxDocument, row: u32, columns: u32) -> Vec<String> {
    (1..=columns)
        .map(|column| document.cell_text(row, column).unwrap_or_default())
        .collect()
}
