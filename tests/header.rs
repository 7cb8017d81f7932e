use price_lists::header::locate;
use price_lists::schema::{ColumnDescriptor, SchemaEntry};
use price_lists::store::MemorySheet;

fn entry(starting_row: u32, names: &[&str]) -> SchemaEntry {
    SchemaEntry::new(
        "list.xlsx",
        starting_row,
        names
            .iter()
            .map(|name| ColumnDescriptor::new(*name, ""))
            .collect(),
    )
}

#[test]
fn earliest_full_match_wins_ties() {
    let sheet = MemorySheet::from_rows([
        vec!["Price List 2024"],
        vec![""],
        vec!["", "SKU", "Price"],
        vec![""],
        vec!["Price", "SKU"],
    ]);
    let location = locate(&sheet, &entry(6, &["SKU", "Price"]));
    assert_eq!(location.header_row, Some(3));
    assert_eq!(location.score, 2);
    assert_eq!(location.positions.get("SKU"), Some(2));
    assert_eq!(location.positions.get("Price"), Some(3));
}

#[test]
fn higher_score_later_row_beats_partial_earlier_row() {
    let sheet = MemorySheet::from_rows([
        vec!["SKU"],
        vec!["SKU", "Description", "Price"],
    ]);
    let location = locate(&sheet, &entry(3, &["SKU", "Description", "Price"]));
    assert_eq!(location.header_row, Some(2));
    assert_eq!(location.score, 3);
}

#[test]
fn rows_after_starting_row_are_not_considered() {
    let sheet = MemorySheet::from_rows([vec!["Title"], vec![""], vec!["SKU", "Price"]]);
    let location = locate(&sheet, &entry(2, &["SKU", "Price"]));
    assert_eq!(location.header_row, None);
}

#[test]
fn blank_header_region_falls_back_to_schema_order() {
    let sheet = MemorySheet::new();
    let location = locate(&sheet, &entry(4, &["SKU", "Description", "Price"]));
    assert_eq!(location.header_row, None);
    assert_eq!(location.score, 0);
    assert_eq!(
        location.positions.sorted(),
        vec![("SKU", 1), ("Description", 2), ("Price", 3)]
    );
}

#[test]
fn header_cells_and_names_are_compared_trimmed() {
    let sheet = MemorySheet::from_rows([vec!["  SKU ", "Price  "]]);
    let location = locate(&sheet, &entry(1, &[" SKU", "Price"]));
    assert_eq!(location.header_row, Some(1));
    assert_eq!(location.positions.get(" SKU"), Some(1));
    assert_eq!(location.positions.get("Price"), Some(2));
}

#[test]
fn repeated_title_maps_to_rightmost_cell() {
    let sheet = MemorySheet::from_rows([vec!["Price", "SKU", "Price"]]);
    let location = locate(&sheet, &entry(1, &["SKU", "Price"]));
    assert_eq!(location.positions.get("Price"), Some(3));
    assert_eq!(location.positions.get("SKU"), Some(2));
}

#[test]
fn names_missing_from_header_row_stay_unmapped() {
    let sheet = MemorySheet::from_rows([vec!["SKU", "Price"]]);
    let location = locate(&sheet, &entry(2, &["SKU", "Price", "Notes"]));
    assert_eq!(location.header_row, Some(1));
    assert_eq!(location.positions.get("Notes"), None);
    assert_eq!(location.positions.len(), 2);
}

#[test]
fn resolve_or_append_appends_once_after_widest_column() {
    let sheet = MemorySheet::from_rows([vec!["SKU", "Price", "", "Misc"]]);
    let mut location = locate(&sheet, &entry(1, &["SKU", "Price", "Notes", "Extra"]));
    let notes = location.positions.resolve_or_append("Notes", &sheet);
    assert_eq!(notes, 5);
    assert_eq!(location.positions.resolve_or_append("Notes", &sheet), 5);
    // Not yet written, but must not reuse the column handed to "Notes".
    assert_eq!(location.positions.resolve_or_append("Extra", &sheet), 6);
}
