//! Population driver: write result rows into one located template.
//!
//! For each source row, in result-set order, every descriptor with an
//! expression is evaluated and written at its mapped column; then the lookup
//! pass may overwrite the alternate-id and description cells. The write
//! cursor advances by one per source row whether or not anything was written.

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;

use crate::{
    data::{ResultRow, Value},
    error::{LookupMiss, StoreError},
    expr::Expression,
    header::{ColumnPositionMap, locate},
    lookup::LookupIndex,
    schema::{ColumnDescriptor, SchemaEntry},
    store::{DocumentStore, Worksheet},
};

pub const DEFAULT_KEY_FIELD: &str = "partid";

/// Cells touched by lookup enrichment, as 1-based columns of the output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentColumns {
    pub key: u32,
    pub alternate_id: u32,
    pub description: u32,
    /// Result field used when the key cell is empty.
    pub key_field: String,
}

impl Default for EnrichmentColumns {
    fn default() -> Self {
        Self {
            key: 1,
            alternate_id: 2,
            description: 3,
            key_field: DEFAULT_KEY_FIELD.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopulateReport {
    pub rows_written: usize,
    pub enriched: usize,
    pub lookup_misses: usize,
    /// Row the next source row would have been written to.
    pub next_row: u32,
}

struct CompiledColumn<'a> {
    descriptor: &'a ColumnDescriptor,
    expression: Option<Expression>,
}

fn compile(entry: &SchemaEntry) -> Vec<CompiledColumn<'_>> {
    entry
        .columns
        .iter()
        .map(|descriptor| CompiledColumn {
            descriptor,
            expression: descriptor
                .has_expression()
                .then(|| Expression::parse(&descriptor.source_expression)),
        })
        .collect()
}

pub fn populate<W: Worksheet + ?Sized>(
    sheet: &mut W,
    entry: &SchemaEntry,
    positions: &mut ColumnPositionMap,
    rows: &[ResultRow],
    lookup: Option<&LookupIndex>,
    enrichment: &EnrichmentColumns,
) -> PopulateReport {
    let columns = compile(entry);
    let mut report = PopulateReport {
        next_row: entry.starting_row,
        ..PopulateReport::default()
    };

    for row in rows {
        let cursor = report.next_row;
        for column in &columns {
            let position = positions.resolve_or_append(&column.descriptor.output_name, &*sheet);
            let Some(expression) = &column.expression else {
                continue;
            };
            let value = expression.evaluate(row);
            sheet.set_cell(cursor, position, value.as_ref());
        }

        match enrich_row(sheet, cursor, row, lookup, enrichment) {
            Ok(key) => {
                debug!("Row {cursor}: enriched from lookup key '{key}'");
                report.enriched += 1;
            }
            Err(LookupMiss::NoTable) => {}
            Err(miss) => {
                debug!("Row {cursor}: lookup skipped: {miss}");
                report.lookup_misses += 1;
            }
        }

        report.rows_written += 1;
        report.next_row += 1;
    }
    report
}

/// Overwrites the alternate-id and description cells of `row_idx` from the
/// lookup table, returning the key that matched.
pub fn enrich_row<W: Worksheet + ?Sized>(
    sheet: &mut W,
    row_idx: u32,
    row: &ResultRow,
    lookup: Option<&LookupIndex>,
    enrichment: &EnrichmentColumns,
) -> Result<String, LookupMiss> {
    let lookup = lookup.ok_or(LookupMiss::NoTable)?;
    let key = sheet
        .cell_text(row_idx, enrichment.key)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .or_else(|| row.get(&enrichment.key_field).map(Value::as_display))
        .unwrap_or_default();
    let record = lookup.resolve(&key)?;

    sheet.set_cell(
        row_idx,
        enrichment.alternate_id,
        text_value(&record.alternate_id).as_ref(),
    );
    sheet.set_cell(
        row_idx,
        enrichment.description,
        text_value(&record.description).as_ref(),
    );
    Ok(record.key.clone())
}

fn text_value(text: &str) -> Option<Value> {
    (!text.is_empty()).then(|| Value::Text(text.to_string()))
}

/// What happened to one template that had a schema entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub destination: PathBuf,
    pub header_row: Option<u32>,
    #[serde(flatten)]
    pub populate: PopulateReport,
}

/// Opens `source`, locates its header, writes every row and saves once to
/// `destination`.
pub fn populate_document<S: DocumentStore>(
    store: &S,
    source: &Path,
    destination: &Path,
    entry: &SchemaEntry,
    rows: &[ResultRow],
    lookup: Option<&LookupIndex>,
    enrichment: &EnrichmentColumns,
) -> Result<DocumentReport, StoreError> {
    let mut document = store.open(source)?;
    let location = locate(&document, entry);
    match location.header_row {
        Some(header_row) => debug!(
            "Header for '{}' found on row {header_row} ({} of {} column(s) matched)",
            entry.filename,
            location.score,
            entry.columns.len()
        ),
        None => info!(
            "No header row found for '{}' in rows 1..={}; mapping columns by schema order",
            entry.filename, entry.starting_row
        ),
    }

    let mut positions = location.positions;
    let report = populate(
        &mut document,
        entry,
        &mut positions,
        rows,
        lookup,
        enrichment,
    );
    store.save(&document, destination)?;
    Ok(DocumentReport {
        destination: destination.to_path_buf(),
        header_row: location.header_row,
        populate: report,
    })
}
