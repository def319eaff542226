//! GeoJSON rendering of points and planned routes for map front ends

use crate::catalog::Point;
use crate::core::config::StyleConfig;
use crate::core::types::TravelMode;
use crate::routing::planner::RoutePlan;
use serde_json::{json, Value};

/// A `LineString` feature with display properties for one route
pub fn route_feature(
    plan: &RoutePlan,
    start_name: &str,
    end_name: &str,
    mode: TravelMode,
    style: &StyleConfig,
) -> Value {
    json!({
        "type": "Feature",
        "properties": {
            "start": start_name,
            "end": end_name,
            "start_name": start_name,
            "end_name": end_name,
            "color": style.color_for(mode),
            "width": style.line_width,
            "route_type": mode,
            "distance": plan.distance,
            "duration": plan.duration,
        },
        "geometry": {
            "type": "LineString",
            "coordinates": plan.path,
        }
    })
}

/// A `Point` feature carrying the point's attributes
pub fn point_feature(point: &Point) -> Value {
    json!({
        "type": "Feature",
        "properties": {
            "id": point.id,
            "name": point.name,
            "type": point.kind,
            "address": point.address,
        },
        "geometry": {
            "type": "Point",
            "coordinates": point.coordinates,
        }
    })
}
