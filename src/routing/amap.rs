//! AMap (Gaode) REST route planning
//!
//! Walking and driving use the v3 direction API; bicycling lives on v4 with
//! a different envelope (`errcode`/`data` instead of `status`/`route`), so
//! the two are parsed separately. v3 treats any bad coordinate as a broken
//! response, v4 skips bad coordinates one by one.

use crate::catalog::PointCatalog;
use crate::core::config::AmapConfig;
use crate::core::types::{LngLat, PointId, TravelMode};
use crate::routing::planner::{PlanError, RoutePlan, RoutePlanner};
use crate::routing::polyline;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

pub struct AmapRoutePlanner {
    client: Client,
    config: AmapConfig,
    catalog: Arc<PointCatalog>,
}

impl AmapRoutePlanner {
    pub fn new(config: AmapConfig, catalog: Arc<PointCatalog>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, config, catalog })
    }

    /// Endpoint URL for a mode
    pub fn endpoint(&self, mode: TravelMode) -> String {
        match mode {
            TravelMode::Bicycling => self.config.bicycling_api_url.clone(),
            TravelMode::Walking | TravelMode::Driving => format!(
                "{}/{}",
                self.config.route_api_url.trim_end_matches('/'),
                mode.as_str()
            ),
        }
    }

    /// Query parameters for a mode
    pub fn query(&self, mode: TravelMode, origin: &str, destination: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("key", self.config.api_key.clone()),
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
        ];
        if mode != TravelMode::Bicycling {
            params.push(("output", "json".into()));
            params.push(("extensions", "all".into()));
        }
        params
    }
}

#[async_trait]
impl RoutePlanner for AmapRoutePlanner {
    async fn plan_route(
        &self,
        start: &PointId,
        end: &PointId,
        mode: TravelMode,
    ) -> Result<RoutePlan, PlanError> {
        let start_point = self
            .catalog
            .get(start)
            .ok_or_else(|| PlanError::UnknownPoint(start.clone()))?;
        let end_point = self
            .catalog
            .get(end)
            .ok_or_else(|| PlanError::UnknownPoint(end.clone()))?;

        if self.config.api_key.trim().is_empty() {
            return Err(PlanError::NotConfigured);
        }

        let url = self.endpoint(mode);
        let params = self.query(
            mode,
            &start_point.coordinates.to_query(),
            &end_point.coordinates.to_query(),
        );
        tracing::debug!("Requesting {} route from {}", mode, url);

        let response = self.client.get(&url).query(&params).send().await?;
        if !response.status().is_success() {
            return Err(PlanError::Status {
                code: response.status().as_u16(),
            });
        }
        let body: Value = response.json().await?;

        parse_response(mode, body)
    }
}

#[derive(Deserialize)]
struct V3Envelope {
    #[serde(default)]
    status: Value,
    #[serde(default)]
    info: Option<String>,
    route: Option<PathSet>,
}

#[derive(Deserialize)]
struct V4Envelope {
    #[serde(default)]
    errcode: Value,
    #[serde(default)]
    errmsg: Option<String>,
    data: Option<PathSet>,
}

#[derive(Deserialize)]
struct PathSet {
    #[serde(default)]
    paths: Vec<RawPath>,
}

#[derive(Deserialize)]
struct RawPath {
    distance: Option<Value>,
    duration: Option<Value>,
    #[serde(default)]
    steps: Vec<RawStep>,
}

#[derive(Deserialize)]
struct RawStep {
    polyline: Option<String>,
}

/// Turn an upstream JSON body into a plan
pub fn parse_response(mode: TravelMode, body: Value) -> Result<RoutePlan, PlanError> {
    match mode {
        TravelMode::Bicycling => parse_v4(body),
        TravelMode::Walking | TravelMode::Driving => parse_v3(body),
    }
}

fn parse_v3(body: Value) -> Result<RoutePlan, PlanError> {
    let envelope: V3Envelope =
        serde_json::from_value(body).map_err(|e| PlanError::Malformed(e.to_string()))?;

    if !is_code(&envelope.status, 1) {
        return Err(PlanError::Upstream(envelope.info.unwrap_or_else(|| "unknown".into())));
    }

    let path = envelope
        .route
        .and_then(|r| r.paths.into_iter().next())
        .ok_or(PlanError::NoRoute)?;

    let mut coordinates = Vec::new();
    for step in &path.steps {
        let line = step
            .polyline
            .as_deref()
            .ok_or_else(|| PlanError::Malformed("step without polyline".into()))?;
        let points = polyline::decode_strict(line).map_err(|e| PlanError::Malformed(e.to_string()))?;
        coordinates.extend(points);
    }

    require_usable_path(&coordinates)?;
    let distance = required_number(path.distance.as_ref(), "distance")?;
    let duration = required_number(path.duration.as_ref(), "duration")?;
    Ok(RoutePlan::new(coordinates, distance, duration).with_fallback_distance())
}

fn parse_v4(body: Value) -> Result<RoutePlan, PlanError> {
    let envelope: V4Envelope =
        serde_json::from_value(body).map_err(|e| PlanError::Malformed(e.to_string()))?;

    if !is_code(&envelope.errcode, 0) {
        return Err(PlanError::Upstream(format!(
            "errcode={} errmsg={}",
            envelope.errcode,
            envelope.errmsg.unwrap_or_default()
        )));
    }

    let path = envelope
        .data
        .and_then(|d| d.paths.into_iter().next())
        .ok_or(PlanError::NoRoute)?;

    let mut coordinates = Vec::new();
    let mut skipped = 0;
    for line in path.steps.iter().filter_map(|s| s.polyline.as_deref()) {
        let (points, bad) = polyline::decode_lenient(line);
        coordinates.extend(points);
        skipped += bad;
    }
    if skipped > 0 {
        tracing::warn!("Dropped {} malformed bicycling coordinates", skipped);
    }

    require_usable_path(&coordinates)?;
    let distance = path.distance.as_ref().and_then(number).unwrap_or(0.0);
    let duration = path.duration.as_ref().and_then(number).unwrap_or(0.0);
    Ok(RoutePlan::new(coordinates, distance, duration).with_fallback_distance())
}

/// A drawable route needs at least two coordinates
fn require_usable_path(path: &[LngLat]) -> Result<(), PlanError> {
    if path.len() < 2 {
        tracing::warn!("Upstream route has {} usable coordinates", path.len());
        return Err(PlanError::NoRoute);
    }
    Ok(())
}

/// Status codes arrive as strings on v3 and as numbers on v4
fn is_code(value: &Value, expected: i64) -> bool {
    match value {
        Value::Number(n) => n.as_i64() == Some(expected),
        Value::String(s) => s.trim().parse::<i64>().ok() == Some(expected),
        _ => false,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn required_number(value: Option<&Value>, field: &str) -> Result<f64, PlanError> {
    value
        .and_then(number)
        .ok_or_else(|| PlanError::Malformed(format!("missing or non-numeric {}", field)))
}
