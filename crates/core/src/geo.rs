//! Geographic coordinates and great-circle geodesy.
//!
//! Stateless calculations between two latitude/longitude points:
//! haversine distance, initial bearing, and the arrival test used by
//! the navigation loop. All angles are degrees.

use libm::{atan2, cos, sin, sqrt};

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;
const RAD_TO_DEG: f64 = 180.0 / core::f64::consts::PI;

/// Error constructing a [`GeoCoordinate`] from out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateError {
    /// Latitude outside [-90, +90] degrees.
    LatitudeOutOfRange,
    /// Longitude outside [-180, +180] degrees.
    LongitudeOutOfRange,
}

/// A geographic position in decimal degrees.
///
/// Construction is range-checked; a value of this type always holds
/// latitude in [-90, +90] and longitude in [-180, +180]. Immutable
/// once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    latitude: f64,
    longitude: f64,
}

impl GeoCoordinate {
    /// Create a coordinate, rejecting out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange);
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Normalize an angle to [0, 360) degrees.
pub fn wrap_360(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a < 0.0 {
        a += 360.0;
    }
    // `-1e-17 % 360.0` rounds back to 360.0 after the add
    if a >= 360.0 {
        a -= 360.0;
    }
    a
}

/// Normalize an angle to [-180, +180] degrees.
pub fn wrap_180(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a < -180.0 {
        a += 360.0;
    }
    a
}

/// Haversine great-circle distance between two coordinates, in meters.
///
/// Symmetric in its arguments and exactly zero for bitwise-equal
/// coordinates.
pub fn distance_m(a: &GeoCoordinate, b: &GeoCoordinate) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat1 = a.latitude * DEG_TO_RAD;
    let lat2 = b.latitude * DEG_TO_RAD;
    let dlat = (b.latitude - a.latitude) * DEG_TO_RAD;
    let dlon = (b.longitude - a.longitude) * DEG_TO_RAD;

    let sin_dlat = sin(dlat / 2.0);
    let sin_dlon = sin(dlon / 2.0);
    let h = sin_dlat * sin_dlat + cos(lat1) * cos(lat2) * sin_dlon * sin_dlon;
    let c = 2.0 * atan2(sqrt(h), sqrt(1.0 - h));

    EARTH_RADIUS_M * c
}

/// Initial (forward-azimuth) bearing from `a` to `b`, degrees [0, 360).
///
/// Undefined when `a == b`: the formula degenerates and the returned
/// value carries no meaning. Callers must test for arrival before
/// steering by this bearing.
pub fn initial_bearing_deg(a: &GeoCoordinate, b: &GeoCoordinate) -> f64 {
    let lat1 = a.latitude * DEG_TO_RAD;
    let lat2 = b.latitude * DEG_TO_RAD;
    let dlon = (b.longitude - a.longitude) * DEG_TO_RAD;

    let y = sin(dlon) * cos(lat2);
    let x = cos(lat1) * sin(lat2) - sin(lat1) * cos(lat2) * cos(dlon);

    wrap_360(atan2(y, x) * RAD_TO_DEG)
}

/// Arrival test: strictly closer than the threshold.
pub fn target_reached(distance_m: f64, threshold_m: f64) -> bool {
    distance_m < threshold_m
}
