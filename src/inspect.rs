use anyhow::{Context, Result, bail};
use log::{info, warn};

use crate::{
    cli::InspectArgs,
    generate::discover_templates,
    header::locate,
    schema::{SchemaStore, relative_key},
    store::{DocumentStore, XlsxStore},
    table,
};

/// Prints the header row and column positions the generator would use.
pub fn execute(args: &InspectArgs) -> Result<()> {
    let root = &args.templates.input;
    if !root.is_dir() {
        bail!("Input folder does not exist or is not a directory: {root:?}");
    }
    let schema = SchemaStore::load(&args.templates.schema)
        .with_context(|| format!("Loading schema from {:?}", args.templates.schema))?;

    let mut rows = Vec::new();
    for source in discover_templates(root) {
        let Some(relative) = relative_key(root, &source) else {
            continue;
        };
        let Some(entry) = schema.find(&relative) else {
            info!("No schema entry for '{relative}'");
            continue;
        };
        let document = match XlsxStore.open(&source) {
            Ok(document) => document,
            Err(err) => {
                warn!("Cannot inspect '{relative}': {err}");
                continue;
            }
        };
        let location = locate(&document, entry);
        let header = location
            .header_row
            .map(|row| row.to_string())
            .unwrap_or_else(|| "positional".to_string());
        for (name, column) in location.positions.sorted() {
            rows.push(vec![
                relative.clone(),
                header.clone(),
                column.to_string(),
                name.to_string(),
            ]);
        }
    }

    let headers = vec![
        "template".to_string(),
        "header_row".to_string(),
        "column".to_string(),
        "name".to_string(),
    ];
    table::print_table(&headers, &rows);
    Ok(())
}
