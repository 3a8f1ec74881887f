//! Command-line interface for querying an offline Waymark POI dataset.
//!
//! Every subcommand opens the dataset read-only, runs one engine query, and
//! prints the result to stdout as pretty-printed JSON.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;
use waymark_core::{EngineConfig, PoiSearchEngine};

mod error;
mod query;

pub use error::CliError;

use query::{
    CategoriesArgs, CategoryArgs, CountArgs, GetArgs, NearbyArgs, PopularArgs, QueryConfig,
    SearchArgs,
};

const ARG_DATASET: &str = "dataset";
const ARG_LIMIT: &str = "limit";
const ARG_LAT: &str = "lat";
const ARG_LON: &str = "lon";
const ARG_RADIUS: &str = "radius";
const ARG_CATEGORY: &str = "category";
const ARG_KEYWORD: &str = "keyword";
const ARG_ID: &str = "id";
const ENV_KEYWORD: &str = "WAYMARK_CMDS_SEARCH_KEYWORD";
const ENV_CATEGORY: &str = "WAYMARK_CMDS_CATEGORY_CATEGORY";
const ENV_ID: &str = "WAYMARK_CMDS_GET_ID";
const ENV_NEARBY_LAT: &str = "WAYMARK_CMDS_NEARBY_LAT";
const ENV_NEARBY_LON: &str = "WAYMARK_CMDS_NEARBY_LON";

/// Run the Waymark CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments, configuration, or the query fail.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_with(cli.command, &mut stdout)
}

#[derive(Debug, Parser)]
#[command(
    name = "waymark",
    about = "Query an offline point-of-interest dataset",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search names and addresses for a keyword.
    Search(SearchArgs),
    /// Find points of interest around a centre.
    Nearby(NearbyArgs),
    /// List points of interest in one main category.
    Category(CategoryArgs),
    /// List every main category.
    Categories(CategoriesArgs),
    /// Show the most populated main categories.
    Popular(PopularArgs),
    /// Print one point of interest by id.
    Get(GetArgs),
    /// Count the points of interest in the dataset.
    Count(CountArgs),
}

fn run_with(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Search(args) => {
            let config = args.into_config()?;
            let engine = open_engine(&config.query)?;
            let found = engine.search_by_keyword(
                &config.keyword,
                config.query.limit,
                config.query.centre,
            )?;
            write_json(writer, &found)
        }
        Command::Nearby(args) => {
            let config = args.into_config()?;
            let engine = open_engine(&config.query)?;
            let found = engine.search_nearby(
                config.centre,
                config.radius,
                config.category.as_deref(),
                config.query.limit,
            )?;
            write_json(writer, &found)
        }
        Command::Category(args) => {
            let config = args.into_config()?;
            let engine = open_engine(&config.query)?;
            let found = engine.search_by_category(
                &config.category,
                config.query.centre,
                config.query.limit,
            )?;
            write_json(writer, &found)
        }
        Command::Categories(args) => {
            let engine = open_engine(&args.into_config()?)?;
            write_json(writer, &engine.available_categories()?)
        }
        Command::Popular(args) => {
            let engine = open_engine(&args.into_config()?)?;
            write_json(writer, &engine.popular_categories()?)
        }
        Command::Get(args) => {
            let config = args.into_config()?;
            let engine = open_engine(&config.query)?;
            write_json(writer, &engine.poi_by_id(config.id)?)
        }
        Command::Count(args) => {
            let engine = open_engine(&args.into_config()?)?;
            write_json(writer, &engine.poi_count()?)
        }
    }
}

fn open_engine(config: &QueryConfig) -> Result<PoiSearchEngine, CliError> {
    debug!("opening dataset {}", config.dataset);
    let engine = PoiSearchEngine::new(EngineConfig::new(config.dataset.clone()));
    engine.initialize()?;
    Ok(engine)
}

fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
