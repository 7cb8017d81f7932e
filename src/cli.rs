use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{lookup, populate::DEFAULT_KEY_FIELD};

#[derive(Debug, Parser)]
#[command(author, version, about = "Populate price-list templates from query results", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fill every template that has a schema entry and write it to the output folder
    Generate(GenerateArgs),
    /// Scaffold a schema file from the first row of each template
    Schema(SchemaArgs),
    /// Report where each template's header row was found, without writing anything
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct TemplateArgs {
    /// Folder containing template workbooks
    #[arg(short = 'i', long = "input", env = "PREP_INPUT", default_value = "lists/templates")]
    pub input: PathBuf,
    /// Schema file (.json, .yml or .yaml) describing each template
    #[arg(short = 's', long = "schema", env = "PREP_SCHEMA", default_value = "lists/schema.json")]
    pub schema: PathBuf,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub templates: TemplateArgs,
    /// Folder where populated workbooks are written, mirroring the input layout
    #[arg(short = 'o', long = "output", env = "PREP_OUTPUT", default_value = "lists/output")]
    pub output: PathBuf,
    /// Query result exported as CSV (one row per output line)
    #[arg(short = 'r', long = "rows", env = "PREP_ROWS")]
    pub rows: PathBuf,
    /// Delimiter of the rows export (supports ',', 'tab', ';', '|')
    #[arg(long = "rows-delimiter", value_parser = parse_delimiter)]
    pub rows_delimiter: Option<u8>,
    /// Character encoding of the rows export (defaults to utf-8)
    #[arg(long = "rows-encoding")]
    pub rows_encoding: Option<String>,
    /// Lookup CSV, or a folder whose first CSV is used
    #[arg(short = 'l', long = "lookup", env = "PREP_LOOKUP", default_value = "lists/lookup")]
    pub lookup: PathBuf,
    /// Character encoding of the lookup CSV (defaults to utf-8)
    #[arg(long = "lookup-encoding")]
    pub lookup_encoding: Option<String>,
    /// Lookup column holding the key matched against each row
    #[arg(long = "lookup-key", default_value = lookup::DEFAULT_KEY_COLUMN)]
    pub lookup_key: String,
    /// Lookup column copied into the alternate id cell
    #[arg(long = "lookup-alternate-id", default_value = lookup::DEFAULT_ALTERNATE_ID_COLUMN)]
    pub lookup_alternate_id: String,
    /// Lookup column copied into the description cell
    #[arg(long = "lookup-description", default_value = lookup::DEFAULT_DESCRIPTION_COLUMN)]
    pub lookup_description: String,
    /// Output column (1-based) read back as the lookup key
    #[arg(long = "key-column", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub key_column: u32,
    /// Output column (1-based) overwritten with the lookup alternate id
    #[arg(long = "alternate-id-column", default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    pub alternate_id_column: u32,
    /// Output column (1-based) overwritten with the lookup description
    #[arg(long = "description-column", default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub description_column: u32,
    /// Result field used as the lookup key when the key cell is empty
    #[arg(long = "key-field", default_value = DEFAULT_KEY_FIELD)]
    pub key_field: String,
    /// Stop starting new documents once this many seconds have elapsed
    #[arg(long = "time-budget-secs")]
    pub time_budget_secs: Option<u64>,
    /// Also write the run summary as JSON to this path
    #[arg(long = "summary")]
    pub summary: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Folder to scan for templates (.csv, .xlsx, .xlsm)
    #[arg(short = 'p', long = "path", default_value = ".")]
    pub path: PathBuf,
    /// Destination schema file (.json, .yml or .yaml)
    #[arg(short = 'o', long = "output", default_value = "schemas.json")]
    pub output: PathBuf,
    /// Keep files whose first row yielded no column titles
    #[arg(long = "include-empty")]
    pub include_empty: bool,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub templates: TemplateArgs,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
