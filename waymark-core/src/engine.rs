//! Thread-safe search facade over a lazily opened dataset.
//!
//! The engine starts uninitialized. `initialize` opens the dataset once;
//! concurrent callers wait for that open and then share the same store.
//! `close` drops the store, after which queries fail with
//! [`EngineError::NotInitialized`] until the next `initialize`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use log::info;

use crate::{
    CategoryCount, EngineError, PoiRecord, PoiStore, SqlitePoiStore,
    search::{category, keyword, nearby},
};

/// Result count used when callers have no preference.
pub const DEFAULT_LIMIT: usize = 20;

/// Settings required to open a dataset.
///
/// # Examples
/// ```
/// use waymark_core::EngineConfig;
///
/// let config = EngineConfig::new("artefacts/poi.db");
/// assert_eq!(config.dataset_path.as_str(), "artefacts/poi.db");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Location of the read-only SQLite dataset.
    pub dataset_path: Utf8PathBuf,
}

impl EngineConfig {
    /// Build a configuration for the dataset at `dataset_path`.
    #[must_use]
    pub fn new(dataset_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            dataset_path: dataset_path.into(),
        }
    }
}

/// Offline point-of-interest search engine.
///
/// Every query method is safe to call from several threads at once. Calls
/// made before [`initialize`](Self::initialize) succeeds fail with
/// [`EngineError::NotInitialized`].
///
/// # Examples
///
/// ```rust,no_run
/// use geo::Coord;
/// use waymark_core::{DEFAULT_RADIUS_METERS, EngineConfig, EngineError, PoiSearchEngine};
///
/// # fn main() -> Result<(), EngineError> {
/// let engine = PoiSearchEngine::new(EngineConfig::new("poi.db"));
/// engine.initialize()?;
/// let centre = Coord { x: 114.305, y: 30.593 };
/// for poi in engine.search_nearby(centre, DEFAULT_RADIUS_METERS, Some("餐饮"), 10)? {
///     println!("{} ({:.0} m)", poi.name, poi.distance.unwrap_or_default());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PoiSearchEngine {
    config: EngineConfig,
    store: Mutex<Option<Arc<SqlitePoiStore>>>,
}

impl PoiSearchEngine {
    /// Create an engine that will read the dataset named by `config`.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self {
            config,
            store: Mutex::new(None),
        }
    }

    /// Dataset location this engine was configured with.
    #[must_use]
    pub fn dataset_path(&self) -> &Utf8Path {
        &self.config.dataset_path
    }

    /// Open the dataset. Calling this again after success is a no-op.
    ///
    /// The lock is held while the file is opened, so concurrent callers
    /// observe either the finished store or the open error.
    ///
    /// # Errors
    /// Returns [`EngineError::DataUnavailable`] or
    /// [`EngineError::SchemaInvalid`] when the dataset cannot be used. The
    /// engine stays uninitialized and a later call may retry.
    pub fn initialize(&self) -> Result<(), EngineError> {
        let mut slot = self.slot();
        if slot.is_some() {
            return Ok(());
        }
        let store = SqlitePoiStore::open(&self.config.dataset_path)?;
        info!(
            "search engine ready on {} (text index: {})",
            self.config.dataset_path,
            store.has_text_index()
        );
        *slot = Some(Arc::new(store));
        Ok(())
    }

    /// Whether a dataset is currently open.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.slot().is_some()
    }

    /// Whether the open dataset carries the optional text index.
    ///
    /// # Errors
    /// Returns [`EngineError::NotInitialized`] before `initialize`.
    pub fn has_text_index(&self) -> Result<bool, EngineError> {
        Ok(self.store()?.has_text_index())
    }

    /// Release the dataset. Queries already in flight finish on the store
    /// they started with.
    pub fn close(&self) {
        if self.slot().take().is_some() {
            info!("search engine closed {}", self.config.dataset_path);
        }
    }

    /// Keyword search over names and addresses.
    ///
    /// See [`keyword::search`] for ordering rules.
    ///
    /// # Errors
    /// Returns [`EngineError::NotInitialized`] before `initialize`,
    /// [`EngineError::InvalidArgument`] for a blank keyword or invalid
    /// centre, and [`EngineError::Store`] when the substring scan fails.
    pub fn search_by_keyword(
        &self,
        keyword: &str,
        limit: usize,
        center: Option<Coord<f64>>,
    ) -> Result<Vec<PoiRecord>, EngineError> {
        keyword::search(self.store()?.as_ref(), keyword, limit, center)
    }

    /// Records within `radius_meters` of `center`, nearest first.
    ///
    /// The radius is clamped to the supported range. See
    /// [`nearby::search`].
    ///
    /// # Errors
    /// Returns [`EngineError::NotInitialized`] before `initialize`,
    /// [`EngineError::InvalidArgument`] for an invalid centre, NaN radius,
    /// or blank category, and [`EngineError::Store`] when the scan fails.
    pub fn search_nearby(
        &self,
        center: Coord<f64>,
        radius_meters: f64,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<PoiRecord>, EngineError> {
        nearby::search(
            self.store()?.as_ref(),
            center,
            radius_meters,
            category,
            limit,
        )
    }

    /// Records in exactly `category`, optionally ranked by distance.
    ///
    /// # Errors
    /// Returns [`EngineError::NotInitialized`] before `initialize`,
    /// [`EngineError::InvalidArgument`] for a blank category or invalid
    /// centre, and [`EngineError::Store`] when the scan fails.
    pub fn search_by_category(
        &self,
        category: &str,
        center: Option<Coord<f64>>,
        limit: usize,
    ) -> Result<Vec<PoiRecord>, EngineError> {
        category::search(self.store()?.as_ref(), category, center, limit)
    }

    /// Every distinct category, sorted.
    ///
    /// # Errors
    /// Returns [`EngineError::NotInitialized`] before `initialize` and
    /// [`EngineError::Store`] when the scan fails.
    pub fn available_categories(&self) -> Result<Vec<String>, EngineError> {
        category::available(self.store()?.as_ref())
    }

    /// The ten most populated categories, largest first.
    ///
    /// # Errors
    /// Returns [`EngineError::NotInitialized`] before `initialize` and
    /// [`EngineError::Store`] when the scan fails.
    pub fn popular_categories(&self) -> Result<Vec<CategoryCount>, EngineError> {
        category::popular(self.store()?.as_ref())
    }

    /// The record with `id`, if any.
    ///
    /// # Errors
    /// Returns [`EngineError::NotInitialized`] before `initialize` and
    /// [`EngineError::Store`] when the lookup fails.
    pub fn poi_by_id(&self, id: i64) -> Result<Option<PoiRecord>, EngineError> {
        self.store()?.by_id(id)
    }

    /// Total number of records in the dataset.
    ///
    /// # Errors
    /// Returns [`EngineError::NotInitialized`] before `initialize` and
    /// [`EngineError::Store`] when counting fails.
    pub fn poi_count(&self) -> Result<u64, EngineError> {
        self.store()?.count()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<SqlitePoiStore>>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone the current store out of the lock so queries run unlocked.
    fn store(&self) -> Result<Arc<SqlitePoiStore>, EngineError> {
        self.slot()
            .as_ref()
            .map(Arc::clone)
            .ok_or(EngineError::NotInitialized)
    }
}
