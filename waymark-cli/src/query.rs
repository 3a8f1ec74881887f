//! Subcommand arguments and their resolved configurations.
//!
//! Each subcommand's arguments may come from CLI flags, configuration
//! files, or environment variables; `ortho_config` layers them before the
//! result is converted into a validated config.

use camino::Utf8PathBuf;
use clap::Parser;
use geo::Coord;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use waymark_core::{DEFAULT_LIMIT, DEFAULT_RADIUS_METERS};

use crate::{
    ARG_CATEGORY, ARG_DATASET, ARG_ID, ARG_KEYWORD, ARG_LAT, ARG_LIMIT, ARG_LON, ARG_RADIUS,
    CliError, ENV_CATEGORY, ENV_ID, ENV_KEYWORD, ENV_NEARBY_LAT, ENV_NEARBY_LON,
};

/// Dataset used when no other layer names one.
pub(crate) const DEFAULT_DATASET: &str = "poi.db";

/// Options every subcommand resolves to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QueryConfig {
    /// Location of the SQLite dataset.
    pub(crate) dataset: Utf8PathBuf,
    /// Maximum number of records to print.
    pub(crate) limit: usize,
    /// Optional centre for distance ranking.
    pub(crate) centre: Option<Coord<f64>>,
}

impl QueryConfig {
    fn resolve(
        dataset: Option<Utf8PathBuf>,
        limit: Option<usize>,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Result<Self, CliError> {
        Ok(Self {
            dataset: dataset.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATASET)),
            limit: limit.unwrap_or(DEFAULT_LIMIT),
            centre: centre(lat, lon)?,
        })
    }

    pub(crate) fn dataset_only(dataset: Option<Utf8PathBuf>) -> Self {
        Self {
            dataset: dataset.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATASET)),
            limit: DEFAULT_LIMIT,
            centre: None,
        }
    }
}

/// Pair latitude and longitude into a centre, rejecting a lone half.
pub(crate) const fn centre(lat: Option<f64>, lon: Option<f64>) -> Result<Option<Coord<f64>>, CliError> {
    match (lat, lon) {
        (Some(y), Some(x)) => Ok(Some(Coord { x, y })),
        (None, None) => Ok(None),
        _ => Err(CliError::IncompleteCentre),
    }
}

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "search", about = "Search names and addresses for a keyword")]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct SearchArgs {
    /// Keyword to look for.
    #[arg(value_name = ARG_KEYWORD)]
    #[serde(default)]
    pub(crate) keyword: Option<String>,
    /// Path to the SQLite POI dataset.
    #[arg(long = ARG_DATASET, value_name = "path")]
    #[serde(default)]
    pub(crate) dataset: Option<Utf8PathBuf>,
    /// Maximum number of results.
    #[arg(long = ARG_LIMIT)]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Latitude of the centre used to rank results by distance.
    #[arg(long = ARG_LAT, allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the centre used to rank results by distance.
    #[arg(long = ARG_LON, allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
}

/// Resolved `search` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchConfig {
    pub(crate) keyword: String,
    pub(crate) query: QueryConfig,
}

impl SearchArgs {
    pub(crate) fn into_config(self) -> Result<SearchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchConfig::try_from(merged)
    }
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let keyword = args.keyword.ok_or(CliError::MissingArgument {
            field: ARG_KEYWORD,
            env: ENV_KEYWORD,
        })?;
        Ok(Self {
            keyword,
            query: QueryConfig::resolve(args.dataset, args.limit, args.lat, args.lon)?,
        })
    }
}

/// CLI arguments for the `nearby` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "nearby",
    long_about = "List points of interest within a radius of a centre, \
                 nearest first. The radius is clamped to 100..=50000 metres.",
    about = "Find points of interest around a centre"
)]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct NearbyArgs {
    /// Latitude of the centre.
    #[arg(long = ARG_LAT, allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the centre.
    #[arg(long = ARG_LON, allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Search radius in metres.
    #[arg(long = ARG_RADIUS, value_name = "metres")]
    #[serde(default)]
    pub(crate) radius: Option<f64>,
    /// Restrict results to one main category.
    #[arg(long = ARG_CATEGORY)]
    #[serde(default)]
    pub(crate) category: Option<String>,
    /// Path to the SQLite POI dataset.
    #[arg(long = ARG_DATASET, value_name = "path")]
    #[serde(default)]
    pub(crate) dataset: Option<Utf8PathBuf>,
    /// Maximum number of results.
    #[arg(long = ARG_LIMIT)]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

/// Resolved `nearby` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NearbyConfig {
    pub(crate) centre: Coord<f64>,
    pub(crate) radius: f64,
    pub(crate) category: Option<String>,
    pub(crate) query: QueryConfig,
}

impl NearbyArgs {
    pub(crate) fn into_config(self) -> Result<NearbyConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        NearbyConfig::try_from(merged)
    }
}

impl TryFrom<NearbyArgs> for NearbyConfig {
    type Error = CliError;

    fn try_from(args: NearbyArgs) -> Result<Self, Self::Error> {
        let query = QueryConfig::resolve(args.dataset, args.limit, args.lat, args.lon)?;
        let centre = query.centre.ok_or(match args.lat {
            None => CliError::MissingArgument {
                field: ARG_LAT,
                env: ENV_NEARBY_LAT,
            },
            Some(_) => CliError::MissingArgument {
                field: ARG_LON,
                env: ENV_NEARBY_LON,
            },
        })?;
        Ok(Self {
            centre,
            radius: args.radius.unwrap_or(DEFAULT_RADIUS_METERS),
            category: args.category,
            query,
        })
    }
}

/// CLI arguments for the `category` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "category", about = "List points of interest in one main category")]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct CategoryArgs {
    /// Main category to list.
    #[arg(value_name = ARG_CATEGORY)]
    #[serde(default)]
    pub(crate) category: Option<String>,
    /// Path to the SQLite POI dataset.
    #[arg(long = ARG_DATASET, value_name = "path")]
    #[serde(default)]
    pub(crate) dataset: Option<Utf8PathBuf>,
    /// Maximum number of results.
    #[arg(long = ARG_LIMIT)]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Latitude of the centre used to rank results by distance.
    #[arg(long = ARG_LAT, allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the centre used to rank results by distance.
    #[arg(long = ARG_LON, allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
}

/// Resolved `category` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryConfig {
    pub(crate) category: String,
    pub(crate) query: QueryConfig,
}

impl CategoryArgs {
    pub(crate) fn into_config(self) -> Result<CategoryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CategoryConfig::try_from(merged)
    }
}

impl TryFrom<CategoryArgs> for CategoryConfig {
    type Error = CliError;

    fn try_from(args: CategoryArgs) -> Result<Self, Self::Error> {
        let category = args.category.ok_or(CliError::MissingArgument {
            field: ARG_CATEGORY,
            env: ENV_CATEGORY,
        })?;
        Ok(Self {
            category,
            query: QueryConfig::resolve(args.dataset, args.limit, args.lat, args.lon)?,
        })
    }
}

/// CLI arguments for the `get` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "get", about = "Print one point of interest by id, or null")]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct GetArgs {
    /// Identifier of the record.
    #[arg(value_name = ARG_ID, allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) id: Option<i64>,
    /// Path to the SQLite POI dataset.
    #[arg(long = ARG_DATASET, value_name = "path")]
    #[serde(default)]
    pub(crate) dataset: Option<Utf8PathBuf>,
}

/// Resolved `get` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GetConfig {
    pub(crate) id: i64,
    pub(crate) query: QueryConfig,
}

impl GetArgs {
    pub(crate) fn into_config(self) -> Result<GetConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        GetConfig::try_from(merged)
    }
}

impl TryFrom<GetArgs> for GetConfig {
    type Error = CliError;

    fn try_from(args: GetArgs) -> Result<Self, Self::Error> {
        let id = args.id.ok_or(CliError::MissingArgument {
            field: ARG_ID,
            env: ENV_ID,
        })?;
        Ok(Self {
            id,
            query: QueryConfig::dataset_only(args.dataset),
        })
    }
}

/// CLI arguments for the `categories` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "categories", about = "List every main category")]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct CategoriesArgs {
    /// Path to the SQLite POI dataset.
    #[arg(long = ARG_DATASET, value_name = "path")]
    #[serde(default)]
    pub(crate) dataset: Option<Utf8PathBuf>,
}

impl CategoriesArgs {
    pub(crate) fn into_config(self) -> Result<QueryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(QueryConfig::dataset_only(merged.dataset))
    }
}

/// CLI arguments for the `popular` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "popular", about = "Show the most populated main categories")]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct PopularArgs {
    /// Path to the SQLite POI dataset.
    #[arg(long = ARG_DATASET, value_name = "path")]
    #[serde(default)]
    pub(crate) dataset: Option<Utf8PathBuf>,
}

impl PopularArgs {
    pub(crate) fn into_config(self) -> Result<QueryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(QueryConfig::dataset_only(merged.dataset))
    }
}

/// CLI arguments for the `count` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "count", about = "Count the points of interest in the dataset")]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct CountArgs {
    /// Path to the SQLite POI dataset.
    #[arg(long = ARG_DATASET, value_name = "path")]
    #[serde(default)]
    pub(crate) dataset: Option<Utf8PathBuf>,
}

impl CountArgs {
    pub(crate) fn into_config(self) -> Result<QueryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(QueryConfig::dataset_only(merged.dataset))
    }
}

#[cfg(test)]
pub(crate) fn search_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SearchConfig, CliError> {
    let merged = SearchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SearchConfig::try_from(merged)
}
