//! Great-circle geometry for circular zones.
//!
//! Zones are circles on the earth's surface. The store is narrowed with an
//! axis-aligned [`BoundingBox`] that always contains the whole circle, and
//! the exact cut is made with the haversine distance.

use serde::{Deserialize, Serialize};

/// Mean earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Outward padding of bounding boxes in degrees, absorbing rounding so that
/// points exactly on a circle's edge are never cut by the box.
const BOX_MARGIN_DEG: f64 = 1e-9;

/// Relative padding applied on top of [`BOX_MARGIN_DEG`].
const BOX_MARGIN_REL: f64 = 1e-12;

/// A position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both coordinates are finite and inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Haversine distance between two positions in kilometres.
pub fn distance_km(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Axis-aligned box in degrees.
///
/// `min_lon > max_lon` means the box crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Smallest box containing every point within `radius_km` of `center`.
    ///
    /// The longitude half-width is the exact extent of a spherical cap, so it
    /// widens with latitude; a cap touching a pole spans every longitude.
    pub fn around(center: LatLon, radius_km: f64) -> Self {
        let angular = radius_km / EARTH_RADIUS_KM;
        let d_lat = pad(angular.to_degrees());
        let min_lat = center.lat - d_lat;
        let max_lat = center.lat + d_lat;

        if min_lat <= -90.0 || max_lat >= 90.0 {
            return Self {
                min_lat: min_lat.max(-90.0),
                max_lat: max_lat.min(90.0),
                min_lon: -180.0,
                max_lon: 180.0,
            };
        }

        let ratio = angular.sin() / center.lat.to_radians().cos();
        if ratio >= 1.0 {
            return Self {
                min_lat,
                max_lat,
                min_lon: -180.0,
                max_lon: 180.0,
            };
        }

        let d_lon = pad(ratio.asin().to_degrees());
        if d_lon >= 180.0 {
            return Self {
                min_lat,
                max_lat,
                min_lon: -180.0,
                max_lon: 180.0,
            };
        }

        Self {
            min_lat,
            max_lat,
            min_lon: wrap_lon(center.lon - d_lon),
            max_lon: wrap_lon(center.lon + d_lon),
        }
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.min_lon > self.max_lon
    }

    pub fn contains(&self, point: LatLon) -> bool {
        if point.lat < self.min_lat || point.lat > self.max_lat {
            return false;
        }
        if self.crosses_antimeridian() {
            point.lon >= self.min_lon || point.lon <= self.max_lon
        } else {
            point.lon >= self.min_lon && point.lon <= self.max_lon
        }
    }
}

fn pad(degrees: f64) -> f64 {
    degrees * (1.0 + BOX_MARGIN_REL) + BOX_MARGIN_DEG
}

/// Fold a longitude into [-180, 180].
fn wrap_lon(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}
