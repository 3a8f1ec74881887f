//! Mapping between `poi` rows and [`PoiRecord`] values.

use geo::Coord;
use rusqlite::Row;

use crate::PoiRecord;

/// Column list shared by every record query. Columns are qualified so the
/// list also works when `poi` is joined with the text index.
pub(super) const POI_COLUMNS: &str = "poi.id, poi.name, poi.main_category, poi.sub_category, \
     poi.lat, poi.lon, poi.address, poi.phone, poi.opening_hours, poi.description, \
     poi.travel_time, poi.rating";

/// Build a record from a row selected with [`POI_COLUMNS`].
///
/// NULL name or category columns map to empty strings; NULL optional
/// columns map to `None`.
pub(super) fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PoiRecord> {
    let name: Option<String> = row.get(1)?;
    let category: Option<String> = row.get(2)?;
    let lat: f64 = row.get(4)?;
    let lon: f64 = row.get(5)?;
    Ok(PoiRecord {
        id: row.get(0)?,
        name: name.unwrap_or_default(),
        category: category.unwrap_or_default(),
        sub_category: row.get(3)?,
        location: Coord { x: lon, y: lat },
        address: row.get(6)?,
        phone: row.get(7)?,
        opening_hours: row.get(8)?,
        description: row.get(9)?,
        travel_time: row.get(10)?,
        rating: row.get(11)?,
        distance: None,
    })
}

/// Convert a result cap into an SQLite `LIMIT` value.
pub(super) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Quote `keyword` as an FTS5 phrase with a trailing prefix wildcard.
///
/// Embedded double quotes are doubled so user input cannot alter the match
/// expression.
pub(super) fn fts_prefix_query(keyword: &str) -> String {
    format!("\"{}\"*", keyword.replace('"', "\"\""))
}

/// Wrap `keyword` as a `LIKE` pattern matching it anywhere, escaping the
/// `LIKE` metacharacters with a backslash.
pub(super) fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("购物", "\"购物\"*")]
    #[case("say \"hi\"", "\"say \"\"hi\"\"\"*")]
    fn quotes_prefix_queries(#[case] keyword: &str, #[case] expected: &str) {
        assert_eq!(fts_prefix_query(keyword), expected);
    }

    #[rstest]
    #[case("中心", "%中心%")]
    #[case("100%", "%100\\%%")]
    #[case("a_b\\c", "%a\\_b\\\\c%")]
    fn escapes_like_metacharacters(#[case] keyword: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(keyword), expected);
    }

    #[rstest]
    fn limits_saturate() {
        assert_eq!(sql_limit(20), 20);
        assert_eq!(sql_limit(usize::MAX), i64::MAX);
    }
}
