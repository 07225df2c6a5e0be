//! Dead-reckoning position updates.
//!
//! A flat-earth approximation: decompose the bearing into north/east
//! displacement and convert kilometres to degree deltas with a fixed
//! 111.32 km-per-degree latitude scale. Good enough for synthetic
//! traffic; it is not a geodesic and does not pretend to be one.

use std::time::Duration;

/// Kilometres per degree of latitude (and of longitude at the equator).
const KM_PER_DEG: f64 = 111.32;

/// Floor applied to `cos(latitude)` so the longitude conversion survives
/// a start point at exactly ±90°. Not a general pole-safe formula.
const COS_LAT_FLOOR: f64 = 1e-9;

/// A point on the (flat) earth in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Move `position` by `distance_km` along `bearing_deg` (0 = north,
/// 90 = east).
///
/// Results are not normalized: sustained travel can push longitude past
/// ±180°. Callers that care must wrap themselves.
pub fn advance(position: Position, distance_km: f64, bearing_deg: f64) -> Position {
    let bearing = bearing_deg.to_radians();
    let north_km = distance_km * bearing.cos();
    let east_km = distance_km * bearing.sin();

    let cos_lat = position.latitude.to_radians().cos();
    let cos_lat = if cos_lat.abs() < COS_LAT_FLOOR { COS_LAT_FLOOR } else { cos_lat };

    Position {
        latitude: position.latitude + north_km / KM_PER_DEG,
        longitude: position.longitude + east_km / (KM_PER_DEG * cos_lat),
    }
}

/// Distance covered at `speed_kmh` over `interval`.
pub fn distance_for(speed_kmh: f64, interval: Duration) -> f64 {
    speed_kmh * interval.as_secs_f64() / 3600.0
}
