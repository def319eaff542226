//! Point - a named place on the campus map

use crate::core::types::{LngLat, PointId};
use serde::{Deserialize, Serialize};

/// A point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    /// Display name; not guaranteed unique across the catalog
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub coordinates: LngLat,
}

impl Point {
    pub fn new(id: impl Into<PointId>, name: impl Into<String>, coordinates: LngLat) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: String::new(),
            address: None,
            coordinates,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        let address = address.into();
        self.address = if address.trim().is_empty() { None } else { Some(address) };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_address_is_none() {
        let p = Point::new("1", "Main Library", LngLat::new(118.6, 32.0)).with_address("  ");
        assert!(p.address.is_none());

        let p = p.with_address("1 Weigang Rd");
        assert_eq!(p.address.as_deref(), Some("1 Weigang Rd"));
    }

    #[test]
    fn test_point_json_shape() {
        let p = Point::new("7", "East Gym", LngLat::new(1.0, 2.0)).with_kind("sports");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], "sports");
        assert_eq!(json["coordinates"], serde_json::json!([1.0, 2.0]));
        assert!(json.get("address").is_none());
    }
}
