//! Search strategies layered over a [`PoiStore`](crate::PoiStore).
//!
//! Each strategy validates its arguments, scans the store, and then ranks
//! the candidates. Whenever a centre is supplied the final order is by exact
//! great-circle distance, ties broken by id.

pub mod category;
pub mod keyword;
pub mod nearby;

use std::{cmp::Ordering, collections::BTreeSet};

use geo::Coord;

use crate::{EngineError, PoiRecord, geodesy::validate_coord};

/// Trim `value`, rejecting it when nothing is left.
pub(crate) fn require_text<'a>(value: &'a str, field: &'static str) -> Result<&'a str, EngineError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidArgument {
            field,
            reason: "must not be blank",
        });
    }
    Ok(trimmed)
}

pub(crate) fn validate_center(center: Option<Coord<f64>>) -> Result<(), EngineError> {
    center.map_or(Ok(()), validate_coord)
}

/// Keep the first occurrence of each id, preserving order.
pub(crate) fn dedup_by_id(records: &mut Vec<PoiRecord>) {
    let mut seen = BTreeSet::new();
    records.retain(|record| seen.insert(record.id));
}

/// Ascending by distance, records without one last, then by id.
pub(crate) fn by_distance(a: &PoiRecord, b: &PoiRecord) -> Ordering {
    let far = f64::INFINITY;
    a.distance
        .unwrap_or(far)
        .total_cmp(&b.distance.unwrap_or(far))
        .then_with(|| a.id.cmp(&b.id))
}

/// Apply the shared ranking tail: distance sort when a centre is given,
/// stored order otherwise, then truncate to `limit`.
pub(crate) fn rank(
    records: Vec<PoiRecord>,
    center: Option<Coord<f64>>,
    limit: usize,
) -> Vec<PoiRecord> {
    let mut ranked = match center {
        Some(center) => {
            let mut measured: Vec<PoiRecord> = records
                .into_iter()
                .map(|record| record.with_distance_from(center))
                .collect();
            measured.sort_by(by_distance);
            measured
        }
        None => records,
    };
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn poi(id: i64, lat: f64) -> PoiRecord {
        PoiRecord::new(id, format!("poi {id}"), "景点", Coord { x: 114.0, y: lat })
    }

    #[rstest]
    #[case("  ", true)]
    #[case("", true)]
    #[case(" 东湖 ", false)]
    fn blank_text_is_rejected(#[case] value: &str, #[case] rejected: bool) {
        assert_eq!(require_text(value, "keyword").is_err(), rejected);
    }

    #[rstest]
    fn require_text_trims() {
        assert_eq!(require_text(" 东湖 ", "keyword").ok(), Some("东湖"));
    }

    #[rstest]
    fn dedup_keeps_first_occurrence() {
        let mut records = vec![poi(2, 30.0), poi(1, 30.1), poi(2, 30.2)];
        dedup_by_id(&mut records);
        let ids: Vec<_> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(records.first().map(|r| r.location.y), Some(30.0));
    }

    #[rstest]
    fn rank_without_centre_keeps_order() {
        let ranked = rank(vec![poi(3, 30.3), poi(1, 30.1), poi(2, 30.2)], None, 2);
        let ids: Vec<_> = ranked.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert!(ranked.iter().all(|r| r.distance.is_none()));
    }

    #[rstest]
    fn rank_with_centre_sorts_by_distance() {
        let centre = Coord { x: 114.0, y: 30.0 };
        let ranked = rank(vec![poi(3, 30.3), poi(1, 30.1), poi(2, 30.2)], Some(centre), 3);
        let ids: Vec<_> = ranked.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[rstest]
    fn equal_distances_fall_back_to_id() {
        let centre = Coord { x: 114.0, y: 30.0 };
        let ranked = rank(vec![poi(9, 30.1), poi(4, 30.1)], Some(centre), 2);
        let ids: Vec<_> = ranked.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 9]);
    }
}
