mod common;

use common::TestWorkspace;
use price_lists::error::SchemaError;
use price_lists::schema::{ColumnDescriptor, SchemaEntry, SchemaStore, save_entries};

#[test]
fn loads_yaml_schema_with_defaults() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "schema.yml",
        "- filename: retail/list.xlsx\n  columns:\n    - columnname: Part\n      dfcolumnname: partid\n    - columnname: ID\n",
    );

    let store = SchemaStore::load(&path).expect("load yaml");

    let entry = store.find("retail\\list.xlsx").expect("entry");
    assert_eq!(entry.starting_row, 1);
    assert_eq!(entry.columns.len(), 2);
    assert!(entry.columns[0].has_expression());
    assert!(!entry.columns[1].has_expression());
}

#[test]
fn saved_entries_load_back_in_order() {
    let workspace = TestWorkspace::new();
    let path = workspace.path().join("schema.json");
    let entries = vec![
        SchemaEntry::new("b.xlsx", 4, vec![ColumnDescriptor::new("Retail", "[RTL-1]/0.9")]),
        SchemaEntry::new("a.xlsx", 2, vec![ColumnDescriptor::new("SKU", "sku")]),
    ];

    save_entries(&path, &entries).expect("save schema");
    let store = SchemaStore::load(&path).expect("load schema");

    assert_eq!(store.entries(), entries.as_slice());
}

#[test]
fn load_failures_are_typed() {
    let workspace = TestWorkspace::new();

    let missing = SchemaStore::load(&workspace.path().join("absent.json"));
    assert!(matches!(missing, Err(SchemaError::Missing(_))));

    let toml = workspace.write("schema.toml", "");
    assert!(matches!(
        SchemaStore::load(&toml),
        Err(SchemaError::UnsupportedExtension(_))
    ));

    let broken = workspace.write("broken.json", "[{\"filename\": 3}");
    assert!(matches!(
        SchemaStore::load(&broken),
        Err(SchemaError::Parse { .. })
    ));

    let zero = workspace.write("zero.json", r#"[{"filename": "a.xlsx", "starting_row": 0}]"#);
    let err = SchemaStore::load(&zero).expect_err("zero starting row");
    assert!(err.to_string().contains("starting_row"));
}
