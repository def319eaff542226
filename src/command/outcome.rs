//! Route request results and user-facing errors

use crate::core::config::StyleConfig;
use crate::core::types::{LngLat, PointId, TravelMode};
use crate::routing::feature::route_feature;
use crate::routing::planner::RoutePlan;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Where the start/end pair of a natural-language request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointSource {
    /// The language-model extraction provider
    Provider,
    /// The rule-based fallback parser
    FallbackParser,
}

/// A planned route annotated with the resolved display names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub start_id: PointId,
    pub end_id: PointId,
    pub start_name: String,
    pub end_name: String,
    pub mode: TravelMode,
    pub path: Vec<LngLat>,
    pub distance: f64,
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<EndpointSource>,
}

impl RouteResult {
    pub fn plan(&self) -> RoutePlan {
        RoutePlan::new(self.path.clone(), self.distance, self.duration)
    }

    /// Render as a GeoJSON feature for the map front end
    pub fn to_feature(&self, style: &StyleConfig) -> Value {
        route_feature(&self.plan(), &self.start_name, &self.end_name, self.mode, style)
    }
}

/// Per-request failure reported to the caller
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("unparseable instruction")]
    Unparseable,

    #[error("start not found: {0}")]
    StartNotFound(String),

    #[error("end not found: {0}")]
    EndNotFound(String),

    #[error("route planning failed: {start_name} to {end_name}")]
    PlanningFailed {
        start_name: String,
        end_name: String,
        /// Upstream failure was transient (timeout, connection)
        retryable: bool,
    },
}

impl RouteError {
    /// Stable machine-readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unparseable => "unparseable instruction",
            Self::StartNotFound(_) => "start not found",
            Self::EndNotFound(_) => "end not found",
            Self::PlanningFailed { .. } => "route planning failed",
        }
    }

    /// The offending term, when there is one
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Unparseable => None,
            Self::StartNotFound(name) | Self::EndNotFound(name) => Some(name.clone()),
            Self::PlanningFailed { start_name, end_name, .. } => {
                Some(format!("{} to {}", start_name, end_name))
            }
        }
    }

    /// Whether the same request might succeed if repeated
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PlanningFailed { retryable: true, .. })
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            reason: self.reason(),
            detail: self.detail(),
            retryable: self.is_retryable(),
        }
    }
}

/// Serializable error body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub reason: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub retryable: bool,
}

/// JSON body for a finished request: `{route, start, end}` or `{error}`
pub fn response_body(outcome: &Result<RouteResult, RouteError>, style: &StyleConfig) -> Value {
    match outcome {
        Ok(route) => json!({
            "route": route.to_feature(style),
            "start": route.start_name,
            "end": route.end_name,
        }),
        Err(e) => json!({ "error": e.payload() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> RouteResult {
        RouteResult {
            start_id: PointId::new("1"),
            end_id: PointId::new("2"),
            start_name: "Main Library".into(),
            end_name: "East Gym".into(),
            mode: TravelMode::Walking,
            path: vec![LngLat::new(1.0, 2.0), LngLat::new(3.0, 4.0)],
            distance: 120.0,
            duration: 90.0,
            source: Some(EndpointSource::FallbackParser),
        }
    }

    #[test]
    fn test_error_reasons_and_details() {
        assert_eq!(RouteError::Unparseable.reason(), "unparseable instruction");
        assert_eq!(RouteError::Unparseable.detail(), None);

        let e = RouteError::StartNotFound("zoo".into());
        assert_eq!(e.reason(), "start not found");
        assert_eq!(e.detail().as_deref(), Some("zoo"));

        let e = RouteError::PlanningFailed {
            start_name: "Main Library".into(),
            end_name: "East Gym".into(),
            retryable: false,
        };
        assert_eq!(e.detail().as_deref(), Some("Main Library to East Gym"));
        assert!(!e.is_retryable());
    }

    #[test]
    fn test_result_json_field_names() {
        let json = serde_json::to_value(result()).unwrap();
        assert_eq!(json["start_name"], "Main Library");
        assert_eq!(json["end_name"], "East Gym");
        assert_eq!(json["mode"], "walking");
        assert_eq!(json["source"], "fallback_parser");
        assert_eq!(json["path"][1], json!([3.0, 4.0]));
    }

    #[test]
    fn test_response_body_success() {
        let body = response_body(&Ok(result()), &StyleConfig::default());
        assert_eq!(body["start"], "Main Library");
        assert_eq!(body["route"]["properties"]["color"], "green");
    }

    #[test]
    fn test_response_body_error() {
        let body = response_body(&Err(RouteError::EndNotFound("moon".into())), &StyleConfig::default());
        assert_eq!(body["error"]["reason"], "end not found");
        assert_eq!(body["error"]["detail"], "moon");
        assert_eq!(body["error"]["retryable"], false);
    }
}
