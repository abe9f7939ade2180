//! Geographic point types used by walk sessions and alert metadata.
//!
//! Only coordinate range checks live here; distance math and geofencing
//! are not part of this service.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Minimum and maximum valid latitude in degrees.
pub const LAT_RANGE: (f64, f64) = (-90.0, 90.0);

/// Minimum and maximum valid longitude in degrees.
pub const LNG_RANGE: (f64, f64) = (-180.0, 180.0);

/// A bare WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Point used for panic metadata when a session has no usable location at all.
pub const FALLBACK_POINT: GeoPoint = GeoPoint { lat: 0.0, lng: 0.0 };

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Reject non-finite or out-of-range coordinates.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_coordinates(self.lat, self.lng)
    }
}

/// The most recent reported position of a walker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub lat: f64,
    pub lng: f64,
    pub updated_at: Timestamp,
}

impl LocationFix {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Validate a latitude/longitude pair.
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), CoreError> {
    if !lat.is_finite() || !lng.is_finite() {
        return Err(CoreError::Validation(
            "Coordinates must be finite numbers".to_string(),
        ));
    }
    if lat < LAT_RANGE.0 || lat > LAT_RANGE.1 {
        return Err(CoreError::Validation(format!(
            "Latitude {lat} is out of range [{}, {}]",
            LAT_RANGE.0, LAT_RANGE.1
        )));
    }
    if lng < LNG_RANGE.0 || lng > LNG_RANGE.1 {
        return Err(CoreError::Validation(format!(
            "Longitude {lng} is out of range [{}, {}]",
            LNG_RANGE.0, LNG_RANGE.1
        )));
    }
    Ok(())
}
