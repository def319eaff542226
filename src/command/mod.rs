//! Route request pipeline
//!
//! Converts a free-text instruction into a planned route:
//! instruction -> EndpointPair -> Resolution x2 -> RoutePlan -> RouteResult

pub mod orchestrator;
pub mod outcome;

pub use orchestrator::RouteRequestOrchestrator;
pub use outcome::{response_body, EndpointSource, ErrorPayload, RouteError, RouteResult};
