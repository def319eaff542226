//! Load points of interest from a GeoJSON FeatureCollection
//!
//! Only `Point` geometries become catalog entries. Records are validated
//! one at a time: a malformed feature is skipped and counted, it never
//! aborts the load.

use crate::catalog::point::Point;
use crate::core::types::{LngLat, PointId};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Errors that prevent reading the collection as a whole
#[derive(Debug, Error)]
pub enum CatalogError {
    /// JSON parsing failed
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// File I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Outcome counters for one load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Features that were not valid point records (bad id, coordinates, duplicate id)
    pub skipped_malformed: usize,
    /// Valid features with a non-Point geometry (lines, polygons)
    pub skipped_non_point: usize,
}

#[derive(Deserialize)]
struct RawCollection {
    #[serde(default)]
    features: Vec<Value>,
}

#[derive(Deserialize)]
struct RawFeature {
    geometry: RawGeometry,
    #[serde(default)]
    properties: RawProperties,
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

#[derive(Deserialize, Default)]
struct RawProperties {
    id: Option<Value>,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    address: Option<String>,
}

/// Why a single feature was rejected
enum Rejection {
    NotAPoint,
    Malformed(&'static str),
}

/// Parse a GeoJSON document into points, in document order
///
/// Duplicate IDs are left in place here; `PointCatalog::new` drops them.
pub fn parse_points(json: &str) -> Result<(Vec<Point>, LoadReport), CatalogError> {
    let collection: RawCollection = serde_json::from_str(json)?;
    let mut report = LoadReport::default();
    let mut points = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.into_iter().enumerate() {
        match point_from_feature(feature) {
            Ok(point) => {
                points.push(point);
                report.loaded += 1;
            }
            Err(Rejection::NotAPoint) => report.skipped_non_point += 1,
            Err(Rejection::Malformed(reason)) => {
                tracing::debug!("Skipping feature #{}: {}", index, reason);
                report.skipped_malformed += 1;
            }
        }
    }

    Ok((points, report))
}

/// Read and parse a GeoJSON file
pub fn load_points(path: &Path) -> Result<(Vec<Point>, LoadReport), CatalogError> {
    let content = std::fs::read_to_string(path)?;
    parse_points(&content)
}

fn point_from_feature(feature: Value) -> Result<Point, Rejection> {
    let raw: RawFeature =
        serde_json::from_value(feature).map_err(|_| Rejection::Malformed("not a feature"))?;

    if raw.geometry.kind != "Point" {
        return Err(Rejection::NotAPoint);
    }

    let id = match raw.properties.id {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(Rejection::Malformed("missing id")),
    };

    let coordinates = parse_coordinates(&raw.geometry.coordinates)
        .ok_or(Rejection::Malformed("bad coordinates"))?;

    let mut point = Point::new(PointId(id), raw.properties.name.unwrap_or_default(), coordinates)
        .with_kind(raw.properties.kind.unwrap_or_default());
    if let Some(address) = raw.properties.address {
        point = point.with_address(address);
    }
    Ok(point)
}

fn parse_coordinates(value: &Value) -> Option<LngLat> {
    let items = value.as_array()?;
    if items.len() < 2 {
        return None;
    }
    let lng = items[0].as_f64()?;
    let lat = items[1].as_f64()?;
    Some(LngLat::new(lng, lat))
}
