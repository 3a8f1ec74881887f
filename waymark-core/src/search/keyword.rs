//! Two-phase keyword search.
//!
//! Prefix matches from the text index come first. When they fall short of
//! the requested limit, a substring scan over names and addresses fills the
//! remaining quota, skipping identifiers already found. The substring pass
//! recovers mid-word hits such as "购物中心" inside "XX购物中心店", which a
//! token-prefix index cannot see.

use std::collections::BTreeSet;

use geo::Coord;
use log::{debug, warn};

use super::{dedup_by_id, rank, require_text, validate_center};
use crate::{EngineError, PoiRecord, PoiStore};

/// Search names and addresses for `keyword`.
///
/// Without a `center`, prefix matches precede substring matches. With a
/// `center`, the merged list is re-sorted by exact distance. At most
/// `limit` records are returned and no id appears twice.
///
/// # Errors
/// Returns [`EngineError::InvalidArgument`] for a blank keyword or invalid
/// centre, and [`EngineError::Store`] when the substring scan fails. A
/// failing text-index query is logged and treated as zero prefix matches.
pub fn search<S>(
    store: &S,
    keyword: &str,
    limit: usize,
    center: Option<Coord<f64>>,
) -> Result<Vec<PoiRecord>, EngineError>
where
    S: PoiStore + ?Sized,
{
    let term = require_text(keyword, "keyword")?;
    validate_center(center)?;
    if limit == 0 {
        return Ok(Vec::new());
    }

    let mut candidates = prefix_candidates(store, term, limit.saturating_mul(2));
    let prefix_hits = candidates.len();

    if let Some(remaining) = limit.checked_sub(prefix_hits).filter(|gap| *gap > 0) {
        let seen: BTreeSet<i64> = candidates.iter().map(|record| record.id).collect();
        candidates.extend(store.substring_matches(term, &seen, remaining)?);
    }
    dedup_by_id(&mut candidates);

    debug!(
        "keyword {term:?}: {prefix_hits} prefix and {} substring candidates",
        candidates.len().saturating_sub(prefix_hits)
    );
    Ok(rank(candidates, center, limit))
}

fn prefix_candidates<S>(store: &S, keyword: &str, cap: usize) -> Vec<PoiRecord>
where
    S: PoiStore + ?Sized,
{
    if !store.has_text_index() {
        return Vec::new();
    }
    store.prefix_matches(keyword, cap).unwrap_or_else(|err| {
        warn!("text index query for {keyword:?} failed, using substring search only: {err}");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;
    use rstest::{fixture, rstest};

    const CENTRE: Coord<f64> = Coord { x: 114.0, y: 30.0 };

    fn poi(id: i64, name: &str, lat: f64) -> PoiRecord {
        PoiRecord::new(id, name, "购物", Coord { x: 114.0, y: lat })
    }

    #[fixture]
    fn store() -> MemoryStore {
        MemoryStore::with_pois([
            // Substring-only match, closest to the centre.
            poi(1, "光谷购物中心店", 30.01),
            // Prefix match, furthest away.
            poi(2, "购物中心 南门", 30.20),
            // Prefix match through the address.
            poi(3, "万达广场", 30.10).with_address("购物中心路 8 号"),
            poi(4, "东湖绿道", 30.05),
        ])
    }

    fn ids(records: &[PoiRecord]) -> Vec<i64> {
        records.iter().map(|record| record.id).collect()
    }

    #[rstest]
    fn prefix_matches_rank_before_substring_matches(store: MemoryStore) {
        let found = search(&store, "购物中心", 20, None).expect("search succeeds");
        assert_eq!(ids(&found), vec![2, 3, 1]);
        assert!(found.iter().all(|record| record.distance.is_none()));
    }

    #[rstest]
    fn centre_reorders_merged_candidates_by_distance(store: MemoryStore) {
        let found = search(&store, "购物中心", 20, Some(CENTRE)).expect("search succeeds");
        assert_eq!(ids(&found), vec![1, 3, 2]);
        let distances: Vec<f64> = found.iter().filter_map(|r| r.distance).collect();
        assert_eq!(distances.len(), 3);
        assert!(distances.windows(2).all(|pair| pair.first() <= pair.last()));
    }

    #[rstest]
    fn substring_scan_is_skipped_when_prefix_fills_limit(store: MemoryStore) {
        let found = search(&store, "购物中心", 2, None).expect("search succeeds");
        assert_eq!(ids(&found), vec![2, 3]);
    }

    #[rstest]
    fn missing_text_index_degrades_to_substring(store: MemoryStore) {
        let degraded = store.without_text_index();
        let found = search(&degraded, "购物中心", 20, None).expect("search succeeds");
        assert_eq!(ids(&found), vec![1, 2, 3]);
    }

    #[rstest]
    fn failing_text_index_degrades_to_substring(store: MemoryStore) {
        let failing = store.with_failing_text_index();
        let found = search(&failing, "购物中心", 20, None).expect("search succeeds");
        assert_eq!(ids(&found), vec![1, 2, 3]);
    }

    #[rstest]
    fn results_never_repeat_an_id(store: MemoryStore) {
        let found = search(&store, "购物", 20, Some(CENTRE)).expect("search succeeds");
        let unique: BTreeSet<i64> = found.iter().map(|record| record.id).collect();
        assert_eq!(unique.len(), found.len());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_keyword_is_rejected(store: MemoryStore, #[case] keyword: &str) {
        let err = search(&store, keyword, 20, None).expect_err("blank keyword");
        assert!(matches!(err, EngineError::InvalidArgument { field: "keyword", .. }));
    }

    #[rstest]
    fn zero_limit_returns_nothing(store: MemoryStore) {
        assert!(search(&store, "购物", 0, None).expect("search succeeds").is_empty());
    }

    #[rstest]
    fn keyword_is_trimmed(store: MemoryStore) {
        let found = search(&store, "  绿道 ", 20, None).expect("search succeeds");
        assert_eq!(ids(&found), vec![4]);
    }
}
