pub mod cli;
pub mod data;
pub mod error;
pub mod expr;
pub mod generate;
pub mod header;
pub mod inspect;
pub mod io_utils;
pub mod lookup;
pub mod populate;
pub mod results;
pub mod schema;
pub mod schema_cmd;
pub mod store;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("price_lists", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    // Before logging, so RUST_LOG may come from .env too.
    let dotenv = dotenvy::dotenv();
    init_logging();
    if let Ok(path) = dotenv {
        debug!("Loaded environment from {path:?}");
    }
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => generate::execute(&args),
        Commands::Schema(args) => schema_cmd::execute(&args),
        Commands::Inspect(args) => inspect::execute(&args),
    }
}
