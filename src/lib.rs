//! Facade crate for the Waymark offline point-of-interest search engine.
//!
//! This crate re-exports the core domain types, the SQLite-backed record
//! store, and the search engine that answers keyword, category, and radius
//! queries against a read-only dataset.

#![forbid(unsafe_code)]

pub use waymark_core::{
    BoundingBox, CategoryCount, DEFAULT_LIMIT, DEFAULT_RADIUS_METERS, EngineConfig, EngineError,
    MAX_RADIUS_METERS, MIN_RADIUS_METERS, PoiRecord, PoiSearchEngine, PoiStore, SqlitePoiStore,
    great_circle_distance,
};

#[cfg(feature = "test-support")]
pub use waymark_core::test_support;
