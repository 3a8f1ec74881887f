use geo::Coord;

use crate::geodesy::great_circle_distance;

/// A named, geolocated record from the offline dataset.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
/// `distance` is never stored; search methods fill it in relative to the
/// caller's centre and leave it `None` when no centre was supplied.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use waymark_core::PoiRecord;
///
/// let poi = PoiRecord::new(1, "黄鹤楼", "景点", Coord { x: 114.302, y: 30.544 });
///
/// assert_eq!(poi.id, 1);
/// assert!(poi.address.is_none());
/// assert!(poi.distance.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoiRecord {
    /// Stable identifier, unique for the lifetime of the dataset.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Main category, e.g. "餐饮" or "住宿".
    pub category: String,
    /// Optional finer-grained category.
    pub sub_category: Option<String>,
    /// Geospatial position.
    pub location: Coord<f64>,
    /// Street address, if recorded.
    pub address: Option<String>,
    /// Contact telephone number.
    pub phone: Option<String>,
    /// Free-form opening hours.
    pub opening_hours: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Suggested visit duration as recorded in the dataset.
    pub travel_time: Option<String>,
    /// Average rating.
    pub rating: Option<f64>,
    /// Great-circle distance in metres from the query centre.
    pub distance: Option<f64>,
}

impl PoiRecord {
    /// Construct a record with only the required fields populated.
    #[must_use]
    pub fn new(
        id: i64,
        name: impl Into<String>,
        category: impl Into<String>,
        location: Coord<f64>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
            sub_category: None,
            location,
            address: None,
            phone: None,
            opening_hours: None,
            description: None,
            travel_time: None,
            rating: None,
            distance: None,
        }
    }

    /// Attach a street address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Replace `distance` with the exact distance from `center`.
    #[must_use]
    pub fn with_distance_from(mut self, center: Coord<f64>) -> Self {
        self.distance = Some(great_circle_distance(center, self.location));
        self
    }
}

/// Number of records sharing a main category.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryCount {
    /// Category label.
    pub category: String,
    /// Rows carrying the label.
    pub count: u64,
}
