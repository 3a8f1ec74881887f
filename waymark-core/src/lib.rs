//! Core of the Waymark offline point-of-interest search engine.
//!
//! Records live in a read-only SQLite dataset with an optional FTS5 text
//! index. [`PoiSearchEngine`] answers keyword, category, and radius queries
//! over it; results carry exact great-circle distances whenever the caller
//! supplies a centre.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod engine;
mod error;
mod geodesy;
mod poi;
pub mod search;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use engine::{DEFAULT_LIMIT, EngineConfig, PoiSearchEngine};
pub use error::EngineError;
pub use geodesy::{
    BoundingBox, EARTH_RADIUS_METERS, RADIUS_TOLERANCE, great_circle_distance, validate_coord,
    within_radius,
};
pub use poi::{CategoryCount, PoiRecord};
pub use search::category::POPULAR_CATEGORY_LIMIT;
pub use search::nearby::{DEFAULT_RADIUS_METERS, MAX_RADIUS_METERS, MIN_RADIUS_METERS};
pub use store::{PoiStore, SqlitePoiStore};
