//! Error types emitted by the Waymark CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use thiserror::Error;
use waymark_core::EngineError;

/// Errors emitted by the Waymark CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag or positional name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// Only one half of a centre coordinate was supplied.
    #[error("--lat and --lon must be given together")]
    IncompleteCentre,
    /// The search engine rejected the query or could not open the dataset.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// Serializing query results failed.
    #[error("failed to serialize results: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing query results failed.
    #[error("failed to write results: {0}")]
    WriteOutput(#[source] std::io::Error),
}
