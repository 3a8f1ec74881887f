//! Test-only helpers: an in-memory `PoiStore` and a dataset writer used by
//! unit and behaviour tests.

use std::{collections::BTreeSet, path::Path};

use geo::{Intersects, Rect};
use rusqlite::{Connection, params};

use crate::{CategoryCount, EngineError, PoiRecord, PoiStore};

/// Whether [`write_dataset`] should build the optional `poi_fts` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextIndex {
    /// Build an FTS5 index over `name` and `address`.
    Enabled,
    /// Leave the dataset without a text index.
    Disabled,
}

/// In-memory `PoiStore` implementation used in tests.
///
/// The store performs linear scans and is intended only for small datasets.
/// Prefix matching approximates the FTS5 tokenizer by splitting names and
/// addresses on whitespace.
#[derive(Default, Debug)]
pub struct MemoryStore {
    pois: Vec<PoiRecord>,
    text_index: bool,
    fail_text_index: bool,
}

impl MemoryStore {
    /// Create a store with a text index from a collection of records.
    #[must_use]
    pub fn with_pois<I>(pois: I) -> Self
    where
        I: IntoIterator<Item = PoiRecord>,
    {
        let mut pois: Vec<PoiRecord> = pois.into_iter().collect();
        pois.sort_by_key(|poi| poi.id);
        Self {
            pois,
            text_index: true,
            fail_text_index: false,
        }
    }

    /// Drop the text index so keyword searches fall back to substrings.
    #[must_use]
    pub const fn without_text_index(mut self) -> Self {
        self.text_index = false;
        self
    }

    /// Keep the text index but make every prefix query fail.
    #[must_use]
    pub const fn with_failing_text_index(mut self) -> Self {
        self.fail_text_index = true;
        self
    }

    fn scan(&self, keep: impl Fn(&PoiRecord) -> bool) -> Vec<PoiRecord> {
        self.pois.iter().filter(|poi| keep(poi)).cloned().collect()
    }
}

fn fields(poi: &PoiRecord) -> impl Iterator<Item = String> + '_ {
    std::iter::once(poi.name.as_str())
        .chain(poi.address.as_deref())
        .map(str::to_lowercase)
}

impl PoiStore for MemoryStore {
    fn has_text_index(&self) -> bool {
        self.text_index
    }

    fn prefix_matches(&self, keyword: &str, limit: usize) -> Result<Vec<PoiRecord>, EngineError> {
        if !self.text_index {
            return Ok(Vec::new());
        }
        if self.fail_text_index {
            return Err(EngineError::Store {
                operation: "query the text index",
                source: rusqlite::Error::InvalidQuery,
            });
        }
        let needle = keyword.to_lowercase();
        let mut found = self.scan(|poi| {
            fields(poi).any(|field| {
                field
                    .split_whitespace()
                    .any(|token| token.starts_with(needle.as_str()))
            })
        });
        found.truncate(limit);
        Ok(found)
    }

    fn substring_matches(
        &self,
        keyword: &str,
        exclude: &BTreeSet<i64>,
        limit: usize,
    ) -> Result<Vec<PoiRecord>, EngineError> {
        let needle = keyword.to_lowercase();
        let mut found = self.scan(|poi| {
            !exclude.contains(&poi.id) && fields(poi).any(|field| field.contains(needle.as_str()))
        });
        found.truncate(limit);
        Ok(found)
    }

    fn within_bbox(
        &self,
        bbox: &Rect<f64>,
        category: Option<&str>,
    ) -> Result<Vec<PoiRecord>, EngineError> {
        let bbox = *bbox;
        Ok(self.scan(|poi| {
            // `Intersects` treats boundary points as inside the rectangle.
            bbox.intersects(&poi.location) && category.is_none_or(|wanted| poi.category == wanted)
        }))
    }

    fn by_category(&self, category: &str, limit: usize) -> Result<Vec<PoiRecord>, EngineError> {
        let mut found = self.scan(|poi| poi.category == category);
        found.truncate(limit);
        Ok(found)
    }

    fn categories(&self) -> Result<Vec<String>, EngineError> {
        let distinct: BTreeSet<&str> = self.pois.iter().map(|poi| poi.category.as_str()).collect();
        Ok(distinct.into_iter().map(str::to_owned).collect())
    }

    fn category_counts(&self, limit: usize) -> Result<Vec<CategoryCount>, EngineError> {
        let mut counts: Vec<CategoryCount> = Vec::new();
        for category in self.categories()? {
            let count = self
                .pois
                .iter()
                .filter(|poi| poi.category == category)
                .count();
            counts.push(CategoryCount {
                category,
                count: u64::try_from(count).unwrap_or_default(),
            });
        }
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
        counts.truncate(limit);
        Ok(counts)
    }

    fn by_id(&self, id: i64) -> Result<Option<PoiRecord>, EngineError> {
        Ok(self.pois.iter().find(|poi| poi.id == id).cloned())
    }

    fn count(&self) -> Result<u64, EngineError> {
        Ok(u64::try_from(self.pois.len()).unwrap_or_default())
    }
}

/// Write `pois` into a fresh SQLite dataset at `path`.
///
/// The `poi` table follows the offline dataset layout; the optional
/// `poi_fts` table is an FTS5 index over `name` and `address` whose `rowid`
/// matches `poi.id`.
///
/// # Errors
/// Propagates any `rusqlite` failure while creating or filling the tables.
pub fn write_dataset(path: &Path, pois: &[PoiRecord], text_index: TextIndex) -> rusqlite::Result<()> {
    let mut connection = Connection::open(path)?;
    let transaction = connection.transaction()?;
    transaction.execute(
        "CREATE TABLE poi (
            id INTEGER PRIMARY KEY,
            name TEXT,
            main_category TEXT,
            sub_category TEXT,
            lat REAL NOT NULL,
            lon REAL NOT NULL,
            address TEXT,
            phone TEXT,
            opening_hours TEXT,
            description TEXT,
            travel_time TEXT,
            rating REAL
        )",
        [],
    )?;
    {
        let mut insert = transaction.prepare(
            "INSERT INTO poi (
                id, name, main_category, sub_category, lat, lon, address, phone,
                opening_hours, description, travel_time, rating
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )?;
        for poi in pois {
            insert.execute(params![
                poi.id,
                poi.name,
                poi.category,
                poi.sub_category,
                poi.location.y,
                poi.location.x,
                poi.address,
                poi.phone,
                poi.opening_hours,
                poi.description,
                poi.travel_time,
                poi.rating,
            ])?;
        }
    }
    if text_index == TextIndex::Enabled {
        transaction.execute("CREATE VIRTUAL TABLE poi_fts USING fts5(name, address)", [])?;
        transaction.execute(
            "INSERT INTO poi_fts (rowid, name, address)
             SELECT id, name, COALESCE(address, '') FROM poi",
            [],
        )?;
    }
    transaction.commit()
}

/// Write a dataset whose file lacks the `poi` table entirely.
///
/// # Errors
/// Propagates any `rusqlite` failure while creating the placeholder table.
pub fn write_dataset_without_poi_table(path: &Path) -> rusqlite::Result<()> {
    let connection = Connection::open(path)?;
    connection.execute("CREATE TABLE places (id INTEGER PRIMARY KEY, name TEXT)", [])?;
    Ok(())
}
