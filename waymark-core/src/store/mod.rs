//! Read-only access to the POI dataset.
//!
//! The `PoiStore` trait exposes the parameterised scans the search
//! strategies are built on: text-index prefix matches, substring matches,
//! bounding-box scans, and the category aggregates. Implementations never
//! write to the underlying data.

use std::collections::BTreeSet;

use geo::Rect;

use crate::{CategoryCount, EngineError, PoiRecord};

mod row;
mod sqlite;

pub use sqlite::{POI_TABLE, SqlitePoiStore, TEXT_INDEX_TABLE};

/// Read-only scans over persisted points of interest.
///
/// Returned records never carry a `distance`; the strategies compute it.
/// Every scan that returns several rows orders them by ascending `id` so
/// results are deterministic.
///
/// # Examples
///
/// ```rust,no_run
/// use camino::Utf8Path;
/// use waymark_core::{EngineError, PoiStore, SqlitePoiStore};
///
/// # fn main() -> Result<(), EngineError> {
/// let store = SqlitePoiStore::open(Utf8Path::new("artefacts/poi.db"))?;
/// let categories = store.categories()?;
/// println!("{} records in {} categories", store.count()?, categories.len());
/// # Ok(())
/// # }
/// ```
pub trait PoiStore {
    /// Whether the optional prefix-searchable text index is present.
    ///
    /// Computed once when the store is opened.
    fn has_text_index(&self) -> bool;

    /// Records whose indexed name or address tokens start with `keyword`.
    ///
    /// Returns an empty list when the store has no text index.
    fn prefix_matches(&self, keyword: &str, limit: usize) -> Result<Vec<PoiRecord>, EngineError>;

    /// Records whose name or address contains `keyword`, ignoring ASCII case.
    ///
    /// Identifiers in `exclude` are skipped and do not count toward `limit`.
    fn substring_matches(
        &self,
        keyword: &str,
        exclude: &BTreeSet<i64>,
        limit: usize,
    ) -> Result<Vec<PoiRecord>, EngineError>;

    /// Records inside `bbox`, optionally restricted to one main category.
    ///
    /// The rectangle uses `x = longitude`, `y = latitude`; containment
    /// includes boundary points. Regions crossing the antimeridian must be
    /// split by the caller.
    fn within_bbox(
        &self,
        bbox: &Rect<f64>,
        category: Option<&str>,
    ) -> Result<Vec<PoiRecord>, EngineError>;

    /// Records whose main category equals `category`.
    fn by_category(&self, category: &str, limit: usize) -> Result<Vec<PoiRecord>, EngineError>;

    /// Distinct main categories in lexicographic order.
    fn categories(&self) -> Result<Vec<String>, EngineError>;

    /// Category populations, most populous first, ties broken by name.
    fn category_counts(&self, limit: usize) -> Result<Vec<CategoryCount>, EngineError>;

    /// Look up a single record; `Ok(None)` when the id is unknown.
    fn by_id(&self, id: i64) -> Result<Option<PoiRecord>, EngineError>;

    /// Total number of records.
    fn count(&self) -> Result<u64, EngineError>;
}
