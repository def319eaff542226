//! Point catalog - read-only snapshot of the campus points of interest
//!
//! The catalog is loaded once and never mutated afterwards, so it can be
//! shared behind an `Arc` by every request without locking.

pub mod alias;
pub mod loader;
pub mod point;

pub use alias::AliasTable;
pub use loader::{CatalogError, LoadReport};
pub use point::Point;

use crate::core::types::PointId;
use ahash::AHashMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct PointCatalog {
    points: Vec<Point>,
    by_id: AHashMap<PointId, usize>,
}

impl PointCatalog {
    /// Build a catalog, keeping the first point for any repeated ID
    pub fn new(points: Vec<Point>) -> Self {
        Self::with_duplicate_count(points).0
    }

    fn with_duplicate_count(points: Vec<Point>) -> (Self, usize) {
        let mut catalog = Self::default();
        let mut duplicates = 0;
        for point in points {
            if catalog.by_id.contains_key(&point.id) {
                tracing::debug!("Duplicate point id {} ({}) ignored", point.id, point.name);
                duplicates += 1;
                continue;
            }
            catalog.by_id.insert(point.id.clone(), catalog.points.len());
            catalog.points.push(point);
        }
        (catalog, duplicates)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from GeoJSON text
    pub fn from_geojson_str(json: &str) -> Result<(Self, LoadReport), CatalogError> {
        Ok(Self::from_parsed(loader::parse_points(json)?))
    }

    /// Load a GeoJSON file
    pub fn load(path: &Path) -> Result<(Self, LoadReport), CatalogError> {
        Ok(Self::from_parsed(loader::load_points(path)?))
    }

    fn from_parsed((points, mut report): (Vec<Point>, LoadReport)) -> (Self, LoadReport) {
        let (catalog, duplicates) = Self::with_duplicate_count(points);
        report.loaded -= duplicates;
        report.skipped_malformed += duplicates;
        (catalog, report)
    }

    /// Load a GeoJSON file; a missing or unparseable file gives an empty catalog
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok((catalog, report)) => {
                tracing::info!(
                    "Loaded {} points from {:?} ({} malformed, {} non-point skipped)",
                    report.loaded,
                    path,
                    report.skipped_malformed,
                    report.skipped_non_point
                );
                catalog
            }
            Err(e) => {
                tracing::warn!("Point catalog {:?} unavailable: {} - using empty catalog", path, e);
                Self::empty()
            }
        }
    }

    /// All points in catalog order
    pub fn list_points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn get(&self, id: &PointId) -> Option<&Point> {
        self.by_id.get(id).map(|&i| &self.points[i])
    }

    pub fn contains(&self, id: &PointId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
