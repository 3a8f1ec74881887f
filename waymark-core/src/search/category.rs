//! Category listing and category-scoped search.

use geo::Coord;

use super::{rank, require_text, validate_center};
use crate::{CategoryCount, EngineError, PoiRecord, PoiStore};

/// Number of entries returned by [`popular`].
pub const POPULAR_CATEGORY_LIMIT: usize = 10;

/// Records whose category equals `category` exactly.
///
/// Without a `center` the store's id order is kept. With one, up to twice
/// `limit` candidates are ranked by distance before truncation, so the
/// nearest matches are drawn from that wider window rather than the whole
/// category.
///
/// # Errors
/// Returns [`EngineError::InvalidArgument`] for a blank category or invalid
/// centre, and [`EngineError::Store`] when the scan fails.
pub fn search<S>(
    store: &S,
    category: &str,
    center: Option<Coord<f64>>,
    limit: usize,
) -> Result<Vec<PoiRecord>, EngineError>
where
    S: PoiStore + ?Sized,
{
    let wanted = require_text(category, "category")?;
    validate_center(center)?;
    if limit == 0 {
        return Ok(Vec::new());
    }
    let candidates = store.by_category(wanted, limit.saturating_mul(2))?;
    Ok(rank(candidates, center, limit))
}

/// Every distinct category in lexicographic order.
///
/// # Errors
/// Returns [`EngineError::Store`] when the scan fails.
pub fn available<S>(store: &S) -> Result<Vec<String>, EngineError>
where
    S: PoiStore + ?Sized,
{
    store.categories()
}

/// The most populated categories, largest first.
///
/// # Errors
/// Returns [`EngineError::Store`] when the scan fails.
pub fn popular<S>(store: &S) -> Result<Vec<CategoryCount>, EngineError>
where
    S: PoiStore + ?Sized,
{
    store.category_counts(POPULAR_CATEGORY_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;
    use rstest::{fixture, rstest};

    fn poi(id: i64, category: &str, lat: f64) -> PoiRecord {
        PoiRecord::new(id, format!("poi {id}"), category, Coord { x: 114.0, y: lat })
    }

    #[fixture]
    fn store() -> MemoryStore {
        MemoryStore::with_pois([
            poi(1, "景点", 30.30),
            poi(2, "餐饮", 30.00),
            poi(3, "景点", 30.10),
            poi(4, "景点", 30.20),
            poi(5, "住宿", 30.40),
        ])
    }

    fn ids(records: &[PoiRecord]) -> Vec<i64> {
        records.iter().map(|record| record.id).collect()
    }

    #[rstest]
    fn exact_category_in_id_order(store: MemoryStore) {
        let found = search(&store, "景点", None, 20).expect("search succeeds");
        assert_eq!(ids(&found), vec![1, 3, 4]);
    }

    #[rstest]
    fn centre_ranks_by_distance(store: MemoryStore) {
        let centre = Coord { x: 114.0, y: 30.0 };
        let found = search(&store, "景点", Some(centre), 2).expect("search succeeds");
        assert_eq!(ids(&found), vec![3, 4]);
        assert!(found.iter().all(|record| record.distance.is_some()));
    }

    #[rstest]
    fn category_match_is_exact(store: MemoryStore) {
        assert!(search(&store, "景", None, 20).expect("search succeeds").is_empty());
    }

    #[rstest]
    fn blank_category_is_rejected(store: MemoryStore) {
        let err = search(&store, "  ", None, 20).expect_err("blank category");
        assert!(matches!(err, EngineError::InvalidArgument { field: "category", .. }));
    }

    #[rstest]
    fn available_lists_distinct_sorted_categories(store: MemoryStore) {
        let categories = available(&store).expect("listing succeeds");
        let mut sorted = categories.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(categories, sorted);
        assert_eq!(categories.len(), 3);
    }

    #[rstest]
    fn popular_orders_by_count(store: MemoryStore) {
        let counts = popular(&store).expect("counting succeeds");
        assert_eq!(
            counts.first(),
            Some(&CategoryCount {
                category: "景点".to_owned(),
                count: 3,
            })
        );
        assert_eq!(counts.len(), 3);
    }

    #[rstest]
    fn popular_is_capped() {
        let many = MemoryStore::with_pois(
            (1..=15).map(|id| poi(id, &format!("类别{id:02}"), 30.0)),
        );
        assert_eq!(
            popular(&many).expect("counting succeeds").len(),
            POPULAR_CATEGORY_LIMIT
        );
    }
}
