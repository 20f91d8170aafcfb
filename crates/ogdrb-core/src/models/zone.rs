use serde::{Deserialize, Serialize};

use crate::geo::LatLon;

/// A named circular area to export repeaters from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub center: LatLon,
    pub radius_km: f64,
}

impl Zone {
    pub fn new(name: impl Into<String>, center: LatLon, radius_km: f64) -> Self {
        Self {
            name: name.into(),
            center,
            radius_km,
        }
    }

    /// Describe what is wrong with the zone's geometry or name, if anything.
    pub fn problem(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("zone name must not be empty".to_string());
        }
        if !self.center.is_valid() {
            return Some(format!(
                "zone '{}' has an invalid center ({}, {})",
                self.name, self.center.lat, self.center.lon
            ));
        }
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Some(format!(
                "zone '{}' must have a positive radius, got {}",
                self.name, self.radius_km
            ));
        }
        None
    }
}
