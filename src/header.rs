//! Header location: find which template row carries the schema's column titles.
//!
//! Templates do not always put their titles where the schema expects, so
//! every row from 1 through `starting_row` is scored by how many descriptor
//! names it contains verbatim. The best row wins, the earliest on ties. When
//! no row scores at all, columns are assigned positionally in schema order.

use std::collections::HashMap;

use itertools::Itertools;

use crate::{schema::SchemaEntry, store::Worksheet};

/// Output column name to 1-based spreadsheet column, for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPositionMap {
    positions: HashMap<String, u32>,
}

impl ColumnPositionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, output_name: &str) -> Option<u32> {
        self.positions.get(output_name).copied()
    }

    pub fn insert(&mut self, output_name: &str, column: u32) {
        self.positions.insert(output_name.to_string(), column);
    }

    /// Existing position, or a new trailing column recorded for later rows.
    ///
    /// Appended columns go after both the sheet's widest column and any
    /// position already handed out, so two unwritten appends never collide.
    pub fn resolve_or_append<W: Worksheet + ?Sized>(&mut self, output_name: &str, sheet: &W) -> u32 {
        if let Some(column) = self.get(output_name) {
            return column;
        }
        let column = sheet.max_column().max(self.max_position()) + 1;
        self.insert(output_name, column);
        column
    }

    pub fn max_position(&self) -> u32 {
        self.positions.values().copied().max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Entries ordered by column, then name.
    pub fn sorted(&self) -> Vec<(&str, u32)> {
        self.positions
            .iter()
            .map(|(name, column)| (name.as_str(), *column))
            .sorted_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLocation {
    /// `None` when the positional fallback was used.
    pub header_row: Option<u32>,
    pub score: usize,
    pub positions: ColumnPositionMap,
}

pub fn locate<W: Worksheet + ?Sized>(sheet: &W, entry: &SchemaEntry) -> HeaderLocation {
    let mut best: Option<(u32, usize, Vec<String>)> = None;
    for row in 1..=entry.starting_row {
        let texts = sheet.row_texts(row);
        let score = score_row(&texts, entry);
        // Strict comparison keeps the earliest row on ties.
        if best.as_ref().is_none_or(|(_, best_score, _)| score > *best_score) {
            best = Some((row, score, texts));
        }
    }

    match best {
        Some((row, score, texts)) if score > 0 => HeaderLocation {
            header_row: Some(row),
            score,
            positions: positions_from_header(&texts, entry),
        },
        _ => HeaderLocation {
            header_row: None,
            score: 0,
            positions: positional_fallback(entry),
        },
    }
}

fn score_row(texts: &[String], entry: &SchemaEntry) -> usize {
    entry
        .columns
        .iter()
        .filter(|column| {
            let name = column.output_name.trim();
            !name.is_empty() && texts.iter().any(|text| text == name)
        })
        .count()
}

/// Scans left to right, so a title repeated in the row maps to its rightmost cell.
fn positions_from_header(texts: &[String], entry: &SchemaEntry) -> ColumnPositionMap {
    let mut positions = ColumnPositionMap::new();
    for (idx, text) in texts.iter().enumerate() {
        if text.is_empty() {
            continue;
        }
        for column in &entry.columns {
            if column.output_name.trim() == text {
                positions.insert(&column.output_name, idx as u32 + 1);
            }
        }
    }
    positions
}

fn positional_fallback(entry: &SchemaEntry) -> ColumnPositionMap {
    let mut positions = ColumnPositionMap::new();
    for (idx, column) in entry.columns.iter().enumerate() {
        positions.insert(&column.output_name, idx as u32 + 1);
    }
    positions
}
