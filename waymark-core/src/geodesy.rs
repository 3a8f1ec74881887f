//! Great-circle helpers used to rank and filter points of interest.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude` in degrees.
//! Distances are metres along the sphere, computed with the Haversine
//! formula provided by `geo`.

use geo::{Coord, Distance, Haversine, Point, Rect};

use crate::EngineError;

/// Earth radius used to size bounding boxes, in metres.
///
/// It sits just below the mean radius behind [`Haversine`], so a box sized
/// with it is never narrower than the exact great-circle disk.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Relative slack applied when comparing a distance against a radius.
pub const RADIUS_TOLERANCE: f64 = 1.0e-9;

/// Great-circle distance between two coordinates, in metres.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use waymark_core::great_circle_distance;
///
/// let wuhan = Coord { x: 114.0, y: 30.0 };
/// assert!(great_circle_distance(wuhan, wuhan).abs() < 1.0e-9);
/// ```
#[must_use]
pub fn great_circle_distance(from: Coord<f64>, to: Coord<f64>) -> f64 {
    Haversine.distance(Point::from(from), Point::from(to))
}

/// Return whether `distance` lies inside a disk of `radius` metres.
#[expect(
    clippy::float_arithmetic,
    reason = "the tolerance is a relative slack on the radius"
)]
#[must_use]
pub fn within_radius(distance: f64, radius: f64) -> bool {
    distance <= radius + radius * RADIUS_TOLERANCE
}

/// Reject coordinates that are not finite or fall outside WGS84 bounds.
///
/// # Errors
/// Returns [`EngineError::InvalidArgument`] naming the offending axis.
pub fn validate_coord(coord: Coord<f64>) -> Result<(), EngineError> {
    if !coord.y.is_finite() || !(-90.0..=90.0).contains(&coord.y) {
        return Err(EngineError::InvalidArgument {
            field: "latitude",
            reason: "must be a finite value between -90 and 90",
        });
    }
    if !coord.x.is_finite() || !(-180.0..=180.0).contains(&coord.x) {
        return Err(EngineError::InvalidArgument {
            field: "longitude",
            reason: "must be a finite value between -180 and 180",
        });
    }
    Ok(())
}

/// Approximate latitude/longitude box around a search centre.
///
/// The box is a cheap pre-filter for radius queries. Its longitude
/// half-width is the cap's widest longitude offset, `asin(sin d / cos lat)`,
/// taken at the centre's latitude. The box over-selects at the corners, so
/// callers must re-check exact distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Centre of the search.
    pub center: Coord<f64>,
    /// Half-height of the box in degrees of latitude.
    pub lat_range: f64,
    /// Half-width of the box in degrees of longitude, capped at 180.
    pub lon_range: f64,
}

impl BoundingBox {
    /// Size a box that covers a disk of `radius_meters` around `center`.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use waymark_core::BoundingBox;
    ///
    /// let bbox = BoundingBox::around(Coord { x: 114.0, y: 30.0 }, 5_000.0);
    /// assert!(bbox.lon_range > bbox.lat_range);
    /// ```
    #[expect(
        clippy::float_arithmetic,
        reason = "angular half-widths are derived from the radius"
    )]
    #[must_use]
    pub fn around(center: Coord<f64>, radius_meters: f64) -> Self {
        let angular = radius_meters / EARTH_RADIUS_METERS;
        let lat_range = angular.to_degrees();
        // Widest longitude offset of a spherical cap seen from its centre's
        // latitude; at or past 1 the cap reaches a pole.
        let ratio = angular.sin() / center.y.to_radians().cos();
        let lon_range = if ratio.is_finite() && (0.0..1.0).contains(&ratio) {
            ratio.asin().to_degrees()
        } else {
            180.0
        };
        Self {
            center,
            lat_range,
            lon_range,
        }
    }

    /// Axis-aligned rectangles covering the box in lon/lat space.
    ///
    /// A box that crosses the antimeridian is split into two rectangles.
    /// A box reaching either pole covers every longitude.
    #[expect(
        clippy::float_arithmetic,
        reason = "box edges are offsets from the centre in degrees"
    )]
    #[must_use]
    pub fn rects(&self) -> Vec<Rect<f64>> {
        let south = (self.center.y - self.lat_range).max(-90.0);
        let north = (self.center.y + self.lat_range).min(90.0);
        let span = |west: f64, east: f64| {
            Rect::new(Coord { x: west, y: south }, Coord { x: east, y: north })
        };

        if self.lon_range >= 180.0 || south <= -90.0 || north >= 90.0 {
            return vec![span(-180.0, 180.0)];
        }

        let west = self.center.x - self.lon_range;
        let east = self.center.x + self.lon_range;
        if west < -180.0 {
            vec![span(west + 360.0, 180.0), span(-180.0, east)]
        } else if east > 180.0 {
            vec![span(west, 180.0), span(-180.0, east - 360.0)]
        } else {
            vec![span(west, east)]
        }
    }
}
