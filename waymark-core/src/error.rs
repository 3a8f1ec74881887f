//! Error taxonomy shared by every engine query.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors returned by [`PoiSearchEngine`](crate::PoiSearchEngine) and the
/// record stores behind it.
///
/// Failures of the optional text-index step never surface here; they are
/// absorbed and the keyword search continues with substring matching.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A query ran before a successful `initialize`, or after `close`.
    #[error("search engine is not initialized; call `initialize` first")]
    NotInitialized,
    /// The dataset file is missing or unreadable.
    #[error("dataset at {path} is unavailable: {source}")]
    DataUnavailable {
        /// Requested dataset path.
        path: Utf8PathBuf,
        /// Underlying I/O or open failure.
        #[source]
        source: std::io::Error,
    },
    /// The dataset lacks a required table.
    #[error("dataset is missing the required `{table}` table")]
    SchemaInvalid {
        /// Name of the missing table.
        table: &'static str,
    },
    /// A caller-supplied argument was rejected.
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        /// Name of the rejected argument.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// A scan of the primary table failed.
    #[error("failed to {operation}")]
    Store {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error from `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

impl EngineError {
    /// Return whether the engine must be initialized before retrying.
    #[must_use]
    pub const fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized)
    }

    pub(crate) fn store(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Store { operation, source }
    }

    pub(crate) fn unavailable(path: &camino::Utf8Path, source: std::io::Error) -> Self {
        Self::DataUnavailable {
            path: path.to_path_buf(),
            source,
        }
    }
}
