//! Radius search: a bounding-box pre-filter followed by an exact
//! great-circle check.

use geo::Coord;
use log::debug;

use super::{by_distance, dedup_by_id, require_text};
use crate::{
    EngineError, PoiRecord, PoiStore,
    geodesy::{BoundingBox, validate_coord, within_radius},
};

/// Smallest radius honoured by [`search`], in metres.
pub const MIN_RADIUS_METERS: f64 = 100.0;

/// Largest radius honoured by [`search`], in metres.
pub const MAX_RADIUS_METERS: f64 = 50_000.0;

/// Radius used when callers have no preference, in metres.
pub const DEFAULT_RADIUS_METERS: f64 = 5_000.0;

/// Clamp a requested radius into `[MIN_RADIUS_METERS, MAX_RADIUS_METERS]`.
///
/// # Errors
/// Returns [`EngineError::InvalidArgument`] when the radius is NaN.
pub fn clamp_radius(radius_meters: f64) -> Result<f64, EngineError> {
    if radius_meters.is_nan() {
        return Err(EngineError::InvalidArgument {
            field: "radius",
            reason: "must be a number",
        });
    }
    Ok(radius_meters.clamp(MIN_RADIUS_METERS, MAX_RADIUS_METERS))
}

/// Records within `radius_meters` of `center`, nearest first.
///
/// The radius is clamped rather than rejected. Every returned record has
/// `distance` set, and no record further than the clamped radius is kept.
///
/// # Errors
/// Returns [`EngineError::InvalidArgument`] for an invalid centre, a NaN
/// radius, or a blank category, and [`EngineError::Store`] when the box scan
/// fails.
pub fn search<S>(
    store: &S,
    center: Coord<f64>,
    radius_meters: f64,
    category: Option<&str>,
    limit: usize,
) -> Result<Vec<PoiRecord>, EngineError>
where
    S: PoiStore + ?Sized,
{
    validate_coord(center)?;
    let radius = clamp_radius(radius_meters)?;
    let wanted = category
        .map(|label| require_text(label, "category"))
        .transpose()?;
    if limit == 0 {
        return Ok(Vec::new());
    }

    let bbox = BoundingBox::around(center, radius);
    let mut boxed = Vec::new();
    for rect in bbox.rects() {
        boxed.extend(store.within_bbox(&rect, wanted)?);
    }
    dedup_by_id(&mut boxed);
    let boxed_count = boxed.len();

    let mut inside: Vec<PoiRecord> = boxed
        .into_iter()
        .map(|record| record.with_distance_from(center))
        .filter(|record| {
            record
                .distance
                .is_some_and(|distance| within_radius(distance, radius))
        })
        .collect();
    inside.sort_by(by_distance);

    debug!(
        "nearby {radius} m: {boxed_count} in box, {} inside radius",
        inside.len()
    );
    inside.truncate(limit);
    Ok(inside)
}
