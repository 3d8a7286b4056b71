use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::MarketplaceError;

const MIN_LATITUDE: f64 = -90.0;
const MAX_LATITUDE: f64 = 90.0;
const MIN_LONGITUDE: f64 = -180.0;
const MAX_LONGITUDE: f64 = 180.0;

/// A coordinate pair in degrees (WGS 84 style lat/lon).
///
/// Self-validating: `Location::of` rejects out-of-range values, so any
/// constructed `Location` is usable as-is. Compared by value; how the
/// datastore indexes points is a persistence concern, not ours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

impl Location {
    /// Validating factory. Boundary values (±90, ±180) are accepted.
    pub fn of(latitude: f64, longitude: f64) -> Result<Self, MarketplaceError> {
        if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
            return Err(MarketplaceError::validation(
                "latitude",
                "Latitude must be between -90 and 90",
            ));
        }

        if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
            return Err(MarketplaceError::validation(
                "longitude",
                "Longitude must be between -180 and 180",
            ));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}
