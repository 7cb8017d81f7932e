//! Schema scaffolding from existing templates.
//!
//! Reads the first row of every CSV or workbook under a folder and writes a
//! schema entry per file with each title as a column and no source
//! expression, ready to be filled in by hand.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{debug, info};

use crate::{
    cli::SchemaArgs,
    io_utils,
    schema::{ColumnDescriptor, SchemaEntry, relative_key, save_entries},
    store::{DocumentStore, Worksheet, XlsxStore},
};

/// Scaffolded entries assume titles on row 1 and data from row 2.
const SCAFFOLD_STARTING_ROW: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TemplateKind {
    Csv,
    Workbook,
}

fn template_kind(path: &Path) -> Option<TemplateKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(TemplateKind::Csv),
        "xlsx" | "xlsm" => Some(TemplateKind::Workbook),
        _ => None,
    }
}

/// Non-empty, trimmed titles from the first row; empty when the file
/// cannot be parsed.
pub fn read_titles(path: &Path) -> Option<Vec<String>> {
    let kind = template_kind(path)?;
    let titles = match kind {
        TemplateKind::Csv => read_csv_titles(path),
        TemplateKind::Workbook => XlsxStore
            .open(path)
            .map(|document| document.row_texts(1))
            .map_err(anyhow::Error::from),
    };
    match titles {
        Ok(titles) => Some(titles.into_iter().filter(|t| !t.is_empty()).collect()),
        Err(err) => {
            debug!("Cannot read titles from {path:?}: {err:#}");
            Some(Vec::new())
        }
    }
}

fn read_csv_titles(path: &Path) -> Result<Vec<String>> {
    let delimiter = io_utils::resolve_input_delimiter(path, None);
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    io_utils::reader_headers(&mut reader, encoding_rs::UTF_8)
}

pub fn scan_dir(root: &Path, include_empty: bool) -> Vec<SchemaEntry> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();

    let mut entries = Vec::new();
    for path in files {
        let Some(titles) = read_titles(&path) else {
            continue;
        };
        if titles.is_empty() && !include_empty {
            continue;
        }
        let Some(filename) = relative_key(root, &path) else {
            continue;
        };
        let columns = titles
            .into_iter()
            .map(|title| ColumnDescriptor::new(title, ""))
            .collect();
        entries.push(SchemaEntry::new(filename, SCAFFOLD_STARTING_ROW, columns));
    }
    entries
}

pub fn execute(args: &SchemaArgs) -> Result<()> {
    if !args.path.is_dir() {
        bail!(
            "Provided path does not exist or is not a directory: {:?}",
            args.path
        );
    }
    let entries = scan_dir(&args.path, args.include_empty);
    save_entries(&args.output, &entries)
        .with_context(|| format!("Writing schema to {:?}", args.output))?;
    info!("Wrote {} entries to {:?}", entries.len(), args.output);
    Ok(())
}
