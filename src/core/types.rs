//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a point of interest
///
/// Opaque to the core. Catalog data may carry numeric IDs; those are
/// stringified at load time so every ID compares as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub String);

impl PointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PointId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// WGS84 longitude/latitude pair in degrees
///
/// Serializes as `[lng, lat]`, the order used by GeoJSON and the AMap API.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Format as the `lng,lat` string the mapping API expects
    pub fn to_query(&self) -> String {
        format!("{},{}", self.lng, self.lat)
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(p: LngLat) -> Self {
        [p.lng, p.lat]
    }
}

impl From<LngLat> for geo_types::Coord<f64> {
    fn from(p: LngLat) -> Self {
        geo_types::coord! { x: p.lng, y: p.lat }
    }
}

/// Transport mode for route planning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walking,
    Driving,
    Bicycling,
}

impl Default for TravelMode {
    fn default() -> Self {
        Self::Walking
    }
}

impl TravelMode {
    pub const ALL: [TravelMode; 3] = [Self::Walking, Self::Driving, Self::Bicycling];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Driving => "driving",
            Self::Bicycling => "bicycling",
        }
    }

    /// Look up a mode by name, case-insensitively
    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|m| m.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_name() {
        assert_eq!(TravelMode::from_name("teleport"), None);
        assert_eq!(TravelMode::from_name(" Driving "), Some(TravelMode::Driving));
        for mode in TravelMode::ALL {
            assert_eq!(TravelMode::from_name(mode.as_str()), Some(mode));
        }
    }

    #[test]
    fn test_lnglat_serializes_as_pair() {
        let p = LngLat::new(118.63, 32.0);
        assert_eq!(serde_json::to_string(&p).unwrap(), "[118.63,32.0]");
        let back: LngLat = serde_json::from_str("[1.5,2.5]").unwrap();
        assert_eq!(back, LngLat::new(1.5, 2.5));
    }

    #[test]
    fn test_point_id_is_transparent() {
        let id = PointId::new("42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
        assert_eq!(id.to_string(), "42");
    }
}
