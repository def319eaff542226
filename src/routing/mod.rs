//! Route planning against the external mapping provider
//!
//! `RoutePlanner` is the seam the orchestrator talks to; `AmapRoutePlanner`
//! is the production implementation.

pub mod amap;
pub mod feature;
pub mod planner;
pub mod polyline;

pub use amap::AmapRoutePlanner;
pub use planner::{PlanError, RoutePlan, RoutePlanner};
