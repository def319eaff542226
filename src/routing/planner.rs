//! Route-planning provider seam

use crate::core::types::{LngLat, PointId, TravelMode};
use async_trait::async_trait;
use geo::HaversineLength;
use geo_types::LineString;
use serde::Serialize;
use thiserror::Error;

/// A planned path with its upstream distance (meters) and duration (seconds)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub path: Vec<LngLat>,
    pub distance: f64,
    pub duration: f64,
}

impl RoutePlan {
    pub fn new(path: Vec<LngLat>, distance: f64, duration: f64) -> Self {
        Self { path, distance, duration }
    }

    /// Replace a missing (zero) distance with the great-circle length of the path
    pub fn with_fallback_distance(mut self) -> Self {
        if self.distance <= 0.0 && self.path.len() >= 2 {
            self.distance = path_length_meters(&self.path);
        }
        self
    }
}

/// Haversine length of a polyline in meters
pub fn path_length_meters(path: &[LngLat]) -> f64 {
    let line: LineString<f64> = path.iter().map(|p| geo_types::Coord::from(*p)).collect();
    line.haversine_length()
}

/// Why no plan was produced
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("unknown point id: {0}")]
    UnknownPoint(PointId),

    #[error("route planner not configured")]
    NotConfigured,

    #[error("no route between the points")]
    NoRoute,

    #[error("upstream rejected request: {0}")]
    Upstream(String),

    #[error("upstream answered HTTP {code}")]
    Status { code: u16 },

    #[error("malformed upstream response: {0}")]
    Malformed(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,
}

impl PlanError {
    /// Whether repeating the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            PlanError::Transport(_) | PlanError::Timeout => true,
            PlanError::Status { code } => *code == 429 || (500..600).contains(code),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for PlanError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PlanError::Timeout
        } else if e.is_decode() {
            PlanError::Malformed(e.to_string())
        } else {
            PlanError::Transport(e.to_string())
        }
    }
}

/// Plans a route between two catalog points
#[async_trait]
pub trait RoutePlanner: Send + Sync {
    async fn plan_route(
        &self,
        start: &PointId,
        end: &PointId,
        mode: TravelMode,
    ) -> Result<RoutePlan, PlanError>;
}
