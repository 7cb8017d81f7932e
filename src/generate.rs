//! Batch generation: discover templates, match schema entries, populate each
//! one and collect a per-document outcome.
//!
//! A document that has no schema entry is skipped and left uncopied. A
//! document the store cannot open or save fails on its own; the run carries
//! on with the next one. Only an unusable input folder or result set aborts
//! the whole run.

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result, bail};
use log::{info, warn};
use serde::Serialize;

use crate::{
    cli::GenerateArgs,
    data::ResultSet,
    error::SchemaError,
    io_utils,
    lookup::{LookupColumns, LookupIndex, discover_lookup_file},
    populate::{DocumentReport, EnrichmentColumns, populate_document},
    results::{CsvResultSet, ResultSetProvider},
    schema::{SchemaStore, relative_key},
    store::{DocumentStore, XlsxStore},
    table,
};

const TEMPLATE_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls"];

pub struct GenerationPlan {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    /// A schema that failed to load skips every document with that reason.
    pub schema: Result<SchemaStore, SchemaError>,
    pub rows: ResultSet,
    pub lookup: Option<LookupIndex>,
    pub enrichment: EnrichmentColumns,
    pub time_budget: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedDocument {
    pub path: String,
    #[serde(flatten)]
    pub report: DocumentReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDocument {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDocument {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub processed: Vec<ProcessedDocument>,
    pub skipped: Vec<SkippedDocument>,
    pub failed: Vec<FailedDocument>,
}

impl RunSummary {
    pub fn rows_written(&self) -> usize {
        self.processed
            .iter()
            .map(|doc| doc.report.populate.rows_written)
            .sum()
    }

    pub fn table_rows(&self) -> Vec<Vec<String>> {
        let processed = self.processed.iter().map(|doc| {
            vec![
                "processed".to_string(),
                doc.path.clone(),
                format!(
                    "{} row(s), header {}, {} enriched, {} lookup miss(es)",
                    doc.report.populate.rows_written,
                    doc.report
                        .header_row
                        .map(|row| format!("row {row}"))
                        .unwrap_or_else(|| "positional".to_string()),
                    doc.report.populate.enriched,
                    doc.report.populate.lookup_misses
                ),
            ]
        });
        let skipped = self
            .skipped
            .iter()
            .map(|doc| vec!["skipped".to_string(), doc.path.clone(), doc.reason.clone()]);
        let failed = self
            .failed
            .iter()
            .map(|doc| vec!["failed".to_string(), doc.path.clone(), doc.reason.clone()]);
        processed.chain(skipped).chain(failed).collect()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = fs::File::create(path).with_context(|| format!("Creating summary file {path:?}"))?;
        serde_json::to_writer_pretty(file, self).context("Writing run summary JSON")
    }
}

/// Template workbooks under `root`, sorted by path.
pub fn discover_templates(root: &Path) -> Vec<PathBuf> {
    let mut files = walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    TEMPLATE_EXTENSIONS
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
                })
        })
        .collect::<Vec<_>>();
    files.sort();
    files
}

pub fn run_generation<S: DocumentStore>(store: &S, plan: &GenerationPlan) -> Result<RunSummary> {
    if !plan.input_root.is_dir() {
        bail!(
            "Input folder does not exist or is not a directory: {:?}",
            plan.input_root
        );
    }
    fs::create_dir_all(&plan.output_root)
        .with_context(|| format!("Creating output folder {:?}", plan.output_root))?;
    if plan.lookup.is_none() {
        info!("No lookup table loaded; enrichment is disabled for this run");
    }

    let started = Instant::now();
    let mut summary = RunSummary::default();
    for source in discover_templates(&plan.input_root) {
        let Some(relative) = relative_key(&plan.input_root, &source) else {
            continue;
        };
        info!("Processing template '{relative}'");

        if plan
            .time_budget
            .is_some_and(|budget| started.elapsed() >= budget)
        {
            warn!("Skipping '{relative}': time budget exhausted");
            summary.skipped.push(SkippedDocument {
                path: relative,
                reason: "time budget exhausted".to_string(),
            });
            continue;
        }

        let entry = match &plan.schema {
            Ok(schema) => schema.find(&relative),
            Err(err) => {
                warn!("Skipping '{relative}': {err}");
                summary.skipped.push(SkippedDocument {
                    path: relative,
                    reason: format!("schema unavailable: {err}"),
                });
                continue;
            }
        };
        let Some(entry) = entry else {
            warn!("No schema entry for '{relative}'; skipping");
            summary.skipped.push(SkippedDocument {
                path: relative,
                reason: "no schema entry".to_string(),
            });
            continue;
        };

        let destination = plan.output_root.join(&relative);
        match populate_document(
            store,
            &source,
            &destination,
            entry,
            plan.rows.rows(),
            plan.lookup.as_ref(),
            &plan.enrichment,
        ) {
            Ok(report) => {
                info!(
                    "Wrote {} row(s) to {:?}",
                    report.populate.rows_written, report.destination
                );
                summary.processed.push(ProcessedDocument {
                    path: relative,
                    report,
                });
            }
            Err(err) => {
                warn!("Failed to populate '{relative}': {err}");
                summary.failed.push(FailedDocument {
                    path: relative,
                    reason: err.to_string(),
                });
            }
        }
    }
    Ok(summary)
}

/// Loads the lookup table; any problem disables enrichment instead of
/// failing the run.
pub fn load_lookup(
    path: &Path,
    columns: &LookupColumns,
    encoding: Option<&str>,
) -> Option<LookupIndex> {
    let loaded = io_utils::resolve_encoding(encoding).and_then(|encoding| {
        match discover_lookup_file(path)? {
            Some(file) => LookupIndex::load(&file, columns, encoding)
                .map(|index| Some((file, index))),
            None => Ok(None),
        }
    });
    match loaded {
        Ok(Some((file, index))) => {
            info!("Loaded lookup file {file:?} ({} entries)", index.len());
            Some(index)
        }
        Ok(None) => {
            info!("No lookup CSV found at {path:?}; continuing without lookup");
            None
        }
        Err(err) => {
            warn!("Failed to load lookup CSV from {path:?}: {err:#}");
            None
        }
    }
}

pub fn execute(args: &GenerateArgs) -> Result<()> {
    let schema = SchemaStore::load(&args.templates.schema);
    match &schema {
        Ok(store) => info!(
            "Loaded {} schema entr(ies) from {:?}",
            store.len(),
            args.templates.schema
        ),
        Err(err) => warn!("{err}; every template will be skipped"),
    }

    let provider = CsvResultSet {
        path: args.rows.clone(),
        delimiter: args.rows_delimiter,
        encoding: io_utils::resolve_encoding(args.rows_encoding.as_deref())?,
    };
    let rows = provider
        .fetch()
        .with_context(|| format!("Loading result rows from {:?}", args.rows))?;

    let lookup_columns = LookupColumns {
        key: args.lookup_key.clone(),
        alternate_id: args.lookup_alternate_id.clone(),
        description: args.lookup_description.clone(),
    };
    let lookup = load_lookup(&args.lookup, &lookup_columns, args.lookup_encoding.as_deref());

    let plan = GenerationPlan {
        input_root: args.templates.input.clone(),
        output_root: args.output.clone(),
        schema,
        rows,
        lookup,
        enrichment: EnrichmentColumns {
            key: args.key_column,
            alternate_id: args.alternate_id_column,
            description: args.description_column,
            key_field: args.key_field.trim().to_lowercase(),
        },
        time_budget: args.time_budget_secs.map(Duration::from_secs),
    };

    let summary = run_generation(&XlsxStore, &plan)?;
    let headers = vec![
        "status".to_string(),
        "template".to_string(),
        "detail".to_string(),
    ];
    table::print_table(&headers, &summary.table_rows());
    info!(
        "Generated {} document(s) with {} row(s); {} skipped, {} failed",
        summary.processed.len(),
        summary.rows_written(),
        summary.skipped.len(),
        summary.failed.len()
    );
    if let Some(path) = &args.summary {
        summary.save(path)?;
        info!("Run summary written to {path:?}");
    }
    Ok(())
}
