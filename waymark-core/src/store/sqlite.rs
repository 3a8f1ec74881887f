//! SQLite-backed store over the offline POI dataset.

use std::{
    collections::BTreeSet,
    fmt, io,
    sync::{Mutex, MutexGuard, PoisonError},
};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use geo::Rect;
use log::info;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Params};

use super::PoiStore;
use super::row::{POI_COLUMNS, fts_prefix_query, like_pattern, record_from_row, sql_limit};
use crate::{CategoryCount, EngineError, PoiRecord};

/// Name of the required primary record table.
pub const POI_TABLE: &str = "poi";

/// Name of the optional FTS5 text index, keyed by `rowid = poi.id`.
pub const TEXT_INDEX_TABLE: &str = "poi_fts";

/// Read-only POI store backed by a single SQLite file.
///
/// The connection is opened with `SQLITE_OPEN_READ_ONLY`; the store never
/// creates, migrates, or writes to the dataset. Scans are serialised on an
/// internal lock because a SQLite connection cannot be shared across
/// threads.
pub struct SqlitePoiStore {
    connection: Mutex<Connection>,
    path: Utf8PathBuf,
    has_text_index: bool,
}

impl fmt::Debug for SqlitePoiStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlitePoiStore")
            .field("path", &self.path)
            .field("has_text_index", &self.has_text_index)
            .finish_non_exhaustive()
    }
}

impl SqlitePoiStore {
    /// Open the dataset at `path` in read-only mode.
    ///
    /// # Errors
    /// Returns [`EngineError::DataUnavailable`] when the file is missing,
    /// is not a regular file, or cannot be read as a database, and
    /// [`EngineError::SchemaInvalid`] when the `poi` table is absent. A
    /// missing `poi_fts` table is not an error.
    pub fn open(path: &Utf8Path) -> Result<Self, EngineError> {
        ensure_regular_file(path)?;

        let connection =
            Connection::open_with_flags(path.as_std_path(), OpenFlags::SQLITE_OPEN_READ_ONLY)
                .map_err(|source| EngineError::unavailable(path, io::Error::other(source)))?;

        // The first read touches the file header; a non-database file fails here.
        let has_poi_table = table_exists(&connection, POI_TABLE)
            .map_err(|source| EngineError::unavailable(path, io::Error::other(source)))?;
        if !has_poi_table {
            return Err(EngineError::SchemaInvalid { table: POI_TABLE });
        }
        let has_text_index = table_exists(&connection, TEXT_INDEX_TABLE)
            .map_err(EngineError::store("inspect the text index"))?;

        info!("opened POI dataset {path} (text index: {has_text_index})");

        Ok(Self {
            connection: Mutex::new(connection),
            path: path.to_path_buf(),
            has_text_index,
        })
    }

    /// Location of the dataset on disk.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        // The connection is read-only, so a panic elsewhere cannot leave it
        // in a half-written state.
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn query_records<P: Params>(
        &self,
        sql: &str,
        params: P,
        operation: &'static str,
    ) -> Result<Vec<PoiRecord>, EngineError> {
        let connection = self.connection();
        let mut statement = connection
            .prepare_cached(sql)
            .map_err(EngineError::store(operation))?;
        let rows = statement
            .query_map(params, record_from_row)
            .map_err(EngineError::store(operation))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(EngineError::store(operation))
    }
}

impl PoiStore for SqlitePoiStore {
    fn has_text_index(&self) -> bool {
        self.has_text_index
    }

    fn prefix_matches(&self, keyword: &str, limit: usize) -> Result<Vec<PoiRecord>, EngineError> {
        if !self.has_text_index || limit == 0 {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {POI_COLUMNS} FROM {TEXT_INDEX_TABLE}
             JOIN {POI_TABLE} ON {POI_TABLE}.id = {TEXT_INDEX_TABLE}.rowid
             WHERE {TEXT_INDEX_TABLE} MATCH ?1
             ORDER BY {POI_TABLE}.id
             LIMIT ?2"
        );
        self.query_records(
            &sql,
            (fts_prefix_query(keyword), sql_limit(limit)),
            "query the text index",
        )
    }

    fn substring_matches(
        &self,
        keyword: &str,
        exclude: &BTreeSet<i64>,
        limit: usize,
    ) -> Result<Vec<PoiRecord>, EngineError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        // Over-fetch by the exclusion count instead of binding every excluded
        // id, which keeps the statement clear of SQLite's variable limit.
        let fetch = limit.saturating_add(exclude.len());
        let sql = format!(
            "SELECT {POI_COLUMNS} FROM {POI_TABLE}
             WHERE poi.name LIKE ?1 ESCAPE '\\' OR poi.address LIKE ?1 ESCAPE '\\'
             ORDER BY poi.id
             LIMIT ?2"
        );
        let rows = self.query_records(
            &sql,
            (like_pattern(keyword), sql_limit(fetch)),
            "scan names and addresses",
        )?;
        Ok(rows
            .into_iter()
            .filter(|record| !exclude.contains(&record.id))
            .take(limit)
            .collect())
    }

    fn within_bbox(
        &self,
        bbox: &Rect<f64>,
        category: Option<&str>,
    ) -> Result<Vec<PoiRecord>, EngineError> {
        let sql = format!(
            "SELECT {POI_COLUMNS} FROM {POI_TABLE}
             WHERE poi.lat BETWEEN ?1 AND ?2
               AND poi.lon BETWEEN ?3 AND ?4
               AND (?5 IS NULL OR poi.main_category = ?5)
             ORDER BY poi.id"
        );
        self.query_records(
            &sql,
            (
                bbox.min().y,
                bbox.max().y,
                bbox.min().x,
                bbox.max().x,
                category,
            ),
            "scan the bounding box",
        )
    }

    fn by_category(&self, category: &str, limit: usize) -> Result<Vec<PoiRecord>, EngineError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {POI_COLUMNS} FROM {POI_TABLE}
             WHERE poi.main_category = ?1
             ORDER BY poi.id
             LIMIT ?2"
        );
        self.query_records(&sql, (category, sql_limit(limit)), "scan a category")
    }

    fn categories(&self) -> Result<Vec<String>, EngineError> {
        let operation = "list categories";
        let connection = self.connection();
        let mut statement = connection
            .prepare_cached(
                "SELECT DISTINCT main_category FROM poi
                 WHERE main_category IS NOT NULL
                 ORDER BY main_category",
            )
            .map_err(EngineError::store(operation))?;
        let rows = statement
            .query_map([], |row| row.get(0))
            .map_err(EngineError::store(operation))?;
        rows.collect::<Result<Vec<String>, _>>()
            .map_err(EngineError::store(operation))
    }

    fn category_counts(&self, limit: usize) -> Result<Vec<CategoryCount>, EngineError> {
        let operation = "count categories";
        let connection = self.connection();
        let mut statement = connection
            .prepare_cached(
                "SELECT main_category, COUNT(*) AS total FROM poi
                 WHERE main_category IS NOT NULL
                 GROUP BY main_category
                 ORDER BY total DESC, main_category
                 LIMIT ?1",
            )
            .map_err(EngineError::store(operation))?;
        let rows = statement
            .query_map([sql_limit(limit)], |row| {
                let category: String = row.get(0)?;
                let total: i64 = row.get(1)?;
                Ok(CategoryCount {
                    category,
                    count: u64::try_from(total).unwrap_or_default(),
                })
            })
            .map_err(EngineError::store(operation))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(EngineError::store(operation))
    }

    fn by_id(&self, id: i64) -> Result<Option<PoiRecord>, EngineError> {
        let sql = format!("SELECT {POI_COLUMNS} FROM {POI_TABLE} WHERE poi.id = ?1");
        let connection = self.connection();
        connection
            .query_row(&sql, [id], record_from_row)
            .optional()
            .map_err(EngineError::store("look up a record"))
    }

    fn count(&self) -> Result<u64, EngineError> {
        let connection = self.connection();
        let total: i64 = connection
            .query_row("SELECT COUNT(*) FROM poi", [], |row| row.get(0))
            .map_err(EngineError::store("count records"))?;
        Ok(u64::try_from(total).unwrap_or_default())
    }
}

/// Confirm `path` names an existing regular file before SQLite sees it.
///
/// A read-only open of a missing file would otherwise surface as a generic
/// `SQLITE_CANTOPEN`.
fn ensure_regular_file(path: &Utf8Path) -> Result<(), EngineError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        EngineError::unavailable(path, io::Error::other("dataset path has no file name"))
    })?;
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|source| EngineError::unavailable(path, source))?;
    let metadata = dir
        .metadata(file_name)
        .map_err(|source| EngineError::unavailable(path, source))?;
    if metadata.is_file() {
        Ok(())
    } else {
        Err(EngineError::unavailable(
            path,
            io::Error::other("dataset path is not a regular file"),
        ))
    }
}

fn table_exists(connection: &Connection, table: &str) -> rusqlite::Result<bool> {
    connection.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1
        )",
        [table],
        |row| row.get(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TextIndex, write_dataset, write_dataset_without_poi_table};
    use geo::Coord;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Dataset {
        _dir: TempDir,
        path: Utf8PathBuf,
    }

    fn full_record() -> PoiRecord {
        PoiRecord {
            sub_category: Some("名胜古迹".to_owned()),
            address: Some("蛇山西山坡特1号".to_owned()),
            phone: Some("027-88875096".to_owned()),
            opening_hours: Some("08:00-18:00".to_owned()),
            description: Some("江南三大名楼之一".to_owned()),
            travel_time: Some("2小时".to_owned()),
            rating: Some(4.8),
            ..PoiRecord::new(1, "黄鹤楼", "景点", Coord { x: 114.302, y: 30.544 })
        }
    }

    fn sparse_record() -> PoiRecord {
        PoiRecord {
            sub_category: Some(String::new()),
            phone: Some(String::new()),
            ..PoiRecord::new(2, "户部巷", "餐饮", Coord { x: 114.305, y: 30.548 })
        }
    }

    #[fixture]
    fn dataset() -> Dataset {
        let dir = TempDir::new().expect("create temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("poi.db")).expect("utf-8 temp path");
        write_dataset(
            path.as_std_path(),
            &[full_record(), sparse_record()],
            TextIndex::Disabled,
        )
        .expect("write dataset");
        Dataset { _dir: dir, path }
    }

    #[rstest]
    fn every_column_round_trips(dataset: Dataset) {
        let store = SqlitePoiStore::open(&dataset.path).expect("open store");
        let found = store.by_id(1).expect("lookup succeeds");
        assert_eq!(found, Some(full_record()));
    }

    #[rstest]
    fn null_stays_none_and_empty_stays_empty(dataset: Dataset) {
        let store = SqlitePoiStore::open(&dataset.path).expect("open store");
        let found = store
            .by_id(2)
            .expect("lookup succeeds")
            .expect("record exists");
        assert_eq!(found.sub_category.as_deref(), Some(""));
        assert_eq!(found.phone.as_deref(), Some(""));
        assert_eq!(found.address, None);
        assert_eq!(found.description, None);
        assert_eq!(found.rating, None);
        assert_eq!(found, sparse_record());
    }

    #[rstest]
    fn null_name_and_category_read_as_empty(dataset: Dataset) {
        let connection = Connection::open(dataset.path.as_std_path()).expect("open for update");
        connection
            .execute("UPDATE poi SET name = NULL, main_category = NULL WHERE id = 2", [])
            .expect("clear required text");
        drop(connection);

        let store = SqlitePoiStore::open(&dataset.path).expect("open store");
        let found = store
            .by_id(2)
            .expect("lookup succeeds")
            .expect("record exists");
        assert_eq!(found.name, "");
        assert_eq!(found.category, "");
    }

    #[rstest]
    fn unknown_id_is_none(dataset: Dataset) {
        let store = SqlitePoiStore::open(&dataset.path).expect("open store");
        assert_eq!(store.by_id(99).expect("lookup succeeds"), None);
        assert_eq!(store.count().expect("count"), 2);
    }

    #[rstest]
    fn open_reports_text_index_capability(dataset: Dataset) {
        let store = SqlitePoiStore::open(&dataset.path).expect("open store");
        assert!(!store.has_text_index());
        assert_eq!(store.path(), dataset.path.as_path());
    }

    #[rstest]
    fn open_rejects_directory_and_missing_table() {
        let dir = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
        assert!(matches!(
            SqlitePoiStore::open(&root),
            Err(EngineError::DataUnavailable { .. })
        ));

        let places = root.join("places.db");
        write_dataset_without_poi_table(places.as_std_path()).expect("write dataset");
        assert!(matches!(
            SqlitePoiStore::open(&places),
            Err(EngineError::SchemaInvalid { table: POI_TABLE })
        ));
    }
}
