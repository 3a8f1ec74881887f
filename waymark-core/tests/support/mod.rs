//! Shared fixtures for integration tests: a sample dataset around a fixed
//! centre written to a temporary SQLite file.
#![expect(
    clippy::expect_used,
    reason = "fixtures should fail fast during setup"
)]

use camino::Utf8PathBuf;
use geo::{Coord, Destination, Haversine, Point};
use tempfile::TempDir;
use waymark_core::{EngineConfig, PoiRecord, PoiSearchEngine};

pub use waymark_core::test_support::TextIndex;
use waymark_core::test_support::write_dataset;

/// Centre every sample record is placed relative to.
pub const CENTRE: Coord<f64> = Coord { x: 114.0, y: 30.0 };

/// A dataset file that lives as long as its temporary directory.
#[derive(Debug)]
pub struct Dataset {
    _dir: TempDir,
    /// Location of the SQLite file.
    pub path: Utf8PathBuf,
}

impl Dataset {
    /// Write `pois` to a fresh dataset, with or without the text index.
    pub fn write(pois: &[PoiRecord], text_index: TextIndex) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("poi.db")).expect("utf-8 temp path");
        write_dataset(path.as_std_path(), pois, text_index).expect("write dataset");
        Self { _dir: dir, path }
    }

    /// An engine over this dataset that has already been initialized.
    pub fn engine(&self) -> PoiSearchEngine {
        let engine = PoiSearchEngine::new(EngineConfig::new(self.path.clone()));
        engine.initialize().expect("initialize engine");
        engine
    }
}

/// Place a record `meters` from [`CENTRE`] along `bearing`.
pub fn poi_at(id: i64, name: &str, category: &str, bearing: f64, meters: f64) -> PoiRecord {
    let location = Haversine.destination(Point::from(CENTRE), bearing, meters);
    PoiRecord::new(id, name, category, location.into())
}

/// Sample records used across the behaviour and property suites.
///
/// | id | category | distance from centre |
/// |----|----------|----------------------|
/// | 1  | 景点     | 1200 m north         |
/// | 2  | 餐饮     | 300 m east           |
/// | 3  | 购物     | 4000 m south         |
/// | 4  | 购物     | 5000 m west          |
/// | 5  | 住宿     | 7000 m north-east    |
/// | 6  | 餐饮     | 2500 m south-west    |
pub fn sample_pois() -> Vec<PoiRecord> {
    vec![
        poi_at(1, "黄鹤楼", "景点", 0.0, 1_200.0).with_address("蛇山西山坡特1号"),
        poi_at(2, "户部巷小吃街", "餐饮", 90.0, 300.0).with_address("司门口户部巷"),
        poi_at(3, "武汉光谷购物中心店", "购物", 180.0, 4_000.0),
        poi_at(4, "购物中心 东门", "购物", 270.0, 5_000.0),
        poi_at(5, "东湖宾馆", "住宿", 45.0, 7_000.0),
        poi_at(6, "老通城豆皮", "餐饮", 225.0, 2_500.0).with_address("中山大道购物中心旁"),
    ]
}

/// Ids of `records`, in order.
pub fn ids(records: &[PoiRecord]) -> Vec<i64> {
    records.iter().map(|record| record.id).collect()
}
