//! Natural-language route requests, end to end
//!
//! instruction -> (provider | fallback parser) -> resolver x2 -> planner -> RouteResult

use crate::catalog::{AliasTable, PointCatalog};
use crate::command::outcome::{EndpointSource, RouteError, RouteResult};
use crate::core::config::NavConfig;
use crate::core::error::{NavError, Result};
use crate::core::types::{PointId, TravelMode};
use crate::instruction::{EndpointPair, InstructionParser};
use crate::llm::client::LlmClient;
use crate::llm::extractor::{EndpointExtractor, ExtractionError, LlmEndpointExtractor};
use crate::resolve::{MatchStage, NameResolver, Resolution};
use crate::routing::{AmapRoutePlanner, RoutePlanner};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// Default ceiling on the extraction call
pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns free-text route instructions into planned routes
///
/// Holds only immutable snapshots, so one orchestrator can serve
/// concurrent requests.
pub struct RouteRequestOrchestrator {
    extractor: Option<Arc<dyn EndpointExtractor>>,
    parser: InstructionParser,
    resolver: NameResolver,
    planner: Arc<dyn RoutePlanner>,
    extraction_timeout: Duration,
}

impl RouteRequestOrchestrator {
    /// Orchestrator without an extraction provider (fallback parser only)
    pub fn new(parser: InstructionParser, resolver: NameResolver, planner: Arc<dyn RoutePlanner>) -> Self {
        Self {
            extractor: None,
            parser,
            resolver,
            planner,
            extraction_timeout: DEFAULT_EXTRACTION_TIMEOUT,
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn EndpointExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_extraction_timeout(mut self, timeout: Duration) -> Self {
        self.extraction_timeout = timeout;
        self
    }

    /// Wire up the production providers from configuration
    ///
    /// Missing data files give an empty catalog or alias table. An empty
    /// LLM key leaves the extraction provider out.
    pub fn from_config(config: &NavConfig) -> Result<Self> {
        let catalog = Arc::new(PointCatalog::load_or_empty(&config.data.points_path));
        let aliases = Arc::new(AliasTable::load_or_empty(&config.data.aliases_path));
        let resolver = NameResolver::new(Arc::clone(&catalog), aliases);
        let parser = InstructionParser::from_config(&config.parser)?;

        let planner = AmapRoutePlanner::new(config.amap.clone(), catalog)
            .map_err(|e| NavError::Config(format!("route planner client: {}", e)))?;
        if config.amap.api_key.trim().is_empty() {
            tracing::warn!("AMAP_API_KEY not set - route planning will fail");
        }

        let mut orchestrator = Self::new(parser, resolver, Arc::new(planner))
            .with_extraction_timeout(config.llm.timeout());

        if config.llm.is_configured() {
            let client = LlmClient::from_config(&config.llm).map_err(|e| NavError::LlmError(e.to_string()))?;
            orchestrator = orchestrator.with_extractor(Arc::new(LlmEndpointExtractor::new(client)));
        } else {
            tracing::info!("LLM_API_KEY not set - using the rule-based instruction parser only");
        }

        Ok(orchestrator)
    }

    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    pub fn parser(&self) -> &InstructionParser {
        &self.parser
    }

    pub fn has_extractor(&self) -> bool {
        self.extractor.is_some()
    }

    /// Plan a walking route from a free-text instruction
    pub async fn process_instruction(&self, instruction: &str) -> std::result::Result<RouteResult, RouteError> {
        let span = tracing::info_span!("route_request", request_id = %Uuid::new_v4());
        self.process_inner(instruction).instrument(span).await
    }

    async fn process_inner(&self, instruction: &str) -> std::result::Result<RouteResult, RouteError> {
        tracing::info!("Processing instruction {:?}", instruction);

        let (pair, source) = self.extract(instruction).await.ok_or_else(|| {
            tracing::info!("No start/end found in instruction");
            RouteError::Unparseable
        })?;

        let start = self.resolve_endpoint(&pair.start, RouteError::StartNotFound)?;
        let end = self.resolve_endpoint(&pair.end, RouteError::EndNotFound)?;

        let mut result = self.plan(start, end, TravelMode::Walking).await?;
        result.source = Some(source);
        Ok(result)
    }

    /// Plan a route between two catalog IDs
    pub async fn plan_between(
        &self,
        start: &PointId,
        end: &PointId,
        mode: TravelMode,
    ) -> std::result::Result<RouteResult, RouteError> {
        let span = tracing::info_span!("route_request", request_id = %Uuid::new_v4());
        async {
            let catalog = self.resolver.catalog();
            let start_point = catalog
                .get(start)
                .ok_or_else(|| RouteError::StartNotFound(start.to_string()))?;
            let end_point = catalog
                .get(end)
                .ok_or_else(|| RouteError::EndNotFound(end.to_string()))?;

            let as_resolution = |id: &PointId, name: &str| Resolution {
                point_id: id.clone(),
                name: name.to_string(),
                stage: MatchStage::Exact,
                score: None,
            };
            let start = as_resolution(&start_point.id, &start_point.name);
            let end = as_resolution(&end_point.id, &end_point.name);
            self.plan(start, end, mode).await
        }
        .instrument(span)
        .await
    }

    /// Provider first, rule-based parser on any provider failure
    async fn extract(&self, instruction: &str) -> Option<(EndpointPair, EndpointSource)> {
        match self.call_extractor(instruction).await {
            Ok(pair) => {
                tracing::info!("Provider extracted {:?} -> {:?}", pair.start, pair.end);
                return Some((pair, EndpointSource::Provider));
            }
            Err(ExtractionError::NotConfigured) => {
                tracing::debug!("No extraction provider - using fallback parser");
            }
            Err(e) => {
                tracing::warn!("Extraction failed ({}) - using fallback parser", e);
            }
        }

        self.parser
            .extract_endpoints(instruction)
            .map(|pair| (pair, EndpointSource::FallbackParser))
    }

    async fn call_extractor(&self, instruction: &str) -> std::result::Result<EndpointPair, ExtractionError> {
        let extractor = self.extractor.as_ref().ok_or(ExtractionError::NotConfigured)?;
        tokio::time::timeout(self.extraction_timeout, extractor.extract_endpoints(instruction))
            .await
            .map_err(|_| ExtractionError::Timeout)?
    }

    fn resolve_endpoint(
        &self,
        text: &str,
        not_found: fn(String) -> RouteError,
    ) -> std::result::Result<Resolution, RouteError> {
        match self.resolver.resolve(text) {
            Some(resolution) => {
                tracing::info!(
                    "{:?} -> {} ({}) via {:?}",
                    text,
                    resolution.point_id,
                    resolution.name,
                    resolution.stage
                );
                Ok(resolution)
            }
            None => {
                tracing::info!("No catalog point for {:?}", text);
                Err(not_found(text.to_string()))
            }
        }
    }

    async fn plan(
        &self,
        start: Resolution,
        end: Resolution,
        mode: TravelMode,
    ) -> std::result::Result<RouteResult, RouteError> {
        match self.planner.plan_route(&start.point_id, &end.point_id, mode).await {
            Ok(plan) => {
                let plan = plan.with_fallback_distance();
                tracing::info!(
                    "Planned {} route {} -> {}: {:.0} m, {:.0} s",
                    mode,
                    start.name,
                    end.name,
                    plan.distance,
                    plan.duration
                );
                Ok(RouteResult {
                    start_id: start.point_id,
                    end_id: end.point_id,
                    start_name: start.name,
                    end_name: end.name,
                    mode,
                    path: plan.path,
                    distance: plan.distance,
                    duration: plan.duration,
                    source: None,
                })
            }
            Err(e) => {
                tracing::warn!("Route planning {} -> {} failed: {}", start.name, end.name, e);
                Err(RouteError::PlanningFailed {
                    retryable: e.is_transient(),
                    start_name: start.name,
                    end_name: end.name,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Point;
    use crate::core::types::LngLat;
    use crate::routing::{PlanError, RoutePlan};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedExtractor(std::result::Result<(&'static str, &'static str), ()>);

    #[async_trait]
    impl EndpointExtractor for FixedExtractor {
        async fn extract_endpoints(&self, _instruction: &str) -> std::result::Result<EndpointPair, ExtractionError> {
            match self.0 {
                Ok((start, end)) => Ok(EndpointPair::new(start, end)),
                Err(()) => Err(ExtractionError::Incomplete),
            }
        }
    }

    /// Straight line between the two points, records every call
    #[derive(Default)]
    struct LinePlanner {
        calls: Mutex<Vec<(PointId, PointId, TravelMode)>>,
        fail_with: Option<fn() -> PlanError>,
    }

    #[async_trait]
    impl RoutePlanner for LinePlanner {
        async fn plan_route(
            &self,
            start: &PointId,
            end: &PointId,
            mode: TravelMode,
        ) -> std::result::Result<RoutePlan, PlanError> {
            self.calls.lock().unwrap().push((start.clone(), end.clone(), mode));
            if let Some(fail) = self.fail_with {
                return Err(fail());
            }
            Ok(RoutePlan::new(
                vec![LngLat::new(118.0, 32.0), LngLat::new(118.001, 32.001)],
                150.0,
                120.0,
            ))
        }
    }

    fn catalog() -> Arc<PointCatalog> {
        Arc::new(PointCatalog::new(vec![
            Point::new("1", "Main Library", LngLat::new(118.0, 32.0)),
            Point::new("2", "East Gym", LngLat::new(118.001, 32.001)),
        ]))
    }

    fn orchestrator(planner: Arc<LinePlanner>) -> RouteRequestOrchestrator {
        RouteRequestOrchestrator::new(
            InstructionParser::english().unwrap(),
            NameResolver::without_aliases(catalog()),
            planner,
        )
    }

    #[tokio::test]
    async fn test_fallback_parser_without_provider() {
        let planner = Arc::new(LinePlanner::default());
        let orchestrator = orchestrator(Arc::clone(&planner));

        let result = orchestrator.process_instruction("from library to gym").await.unwrap();
        assert_eq!(result.start_id, PointId::new("1"));
        assert_eq!(result.end_id, PointId::new("2"));
        assert_eq!(result.start_name, "Main Library");
        assert_eq!(result.source, Some(EndpointSource::FallbackParser));

        let calls = planner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].2, TravelMode::Walking);
    }

    #[tokio::test]
    async fn test_provider_pair_is_used() {
        let orchestrator = orchestrator(Arc::new(LinePlanner::default()))
            .with_extractor(Arc::new(FixedExtractor(Ok(("gym", "library")))));

        let result = orchestrator.process_instruction("whatever the user typed").await.unwrap();
        assert_eq!(result.start_name, "East Gym");
        assert_eq!(result.end_name, "Main Library");
        assert_eq!(result.source, Some(EndpointSource::Provider));
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back() {
        let orchestrator = orchestrator(Arc::new(LinePlanner::default()))
            .with_extractor(Arc::new(FixedExtractor(Err(()))));

        let result = orchestrator.process_instruction("from library to gym").await.unwrap();
        assert_eq!(result.source, Some(EndpointSource::FallbackParser));
    }

    #[tokio::test]
    async fn test_unparseable_instruction() {
        let planner = Arc::new(LinePlanner::default());
        let orchestrator = orchestrator(Arc::clone(&planner));

        let err = orchestrator.process_instruction("   ").await.unwrap_err();
        assert_eq!(err, RouteError::Unparseable);
        assert!(planner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_not_found_takes_precedence() {
        let orchestrator = orchestrator(Arc::new(LinePlanner::default()))
            .with_extractor(Arc::new(FixedExtractor(Ok(("zoo", "aquarium")))));

        let err = orchestrator.process_instruction("from zoo to aquarium").await.unwrap_err();
        assert_eq!(err, RouteError::StartNotFound("zoo".into()));
    }

    #[tokio::test]
    async fn test_end_not_found() {
        let orchestrator = orchestrator(Arc::new(LinePlanner::default()))
            .with_extractor(Arc::new(FixedExtractor(Ok(("library", "aquarium")))));

        let err = orchestrator.process_instruction("from library to aquarium").await.unwrap_err();
        assert_eq!(err, RouteError::EndNotFound("aquarium".into()));
    }

    #[tokio::test]
    async fn test_planning_failure_carries_names() {
        let planner = Arc::new(LinePlanner {
            fail_with: Some(|| PlanError::Timeout),
            ..Default::default()
        });
        let orchestrator = orchestrator(planner);

        let err = orchestrator.process_instruction("from library to gym").await.unwrap_err();
        assert_eq!(err.reason(), "route planning failed");
        assert_eq!(err.detail().as_deref(), Some("Main Library to East Gym"));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_upstream_http_status_retryability() {
        let unavailable = orchestrator(Arc::new(LinePlanner {
            fail_with: Some(|| PlanError::Status { code: 503 }),
            ..Default::default()
        }));
        let err = unavailable.process_instruction("from library to gym").await.unwrap_err();
        assert!(err.is_retryable());
        assert!(err.payload().retryable);

        let forbidden = orchestrator(Arc::new(LinePlanner {
            fail_with: Some(|| PlanError::Status { code: 403 }),
            ..Default::default()
        }));
        let err = forbidden.process_instruction("from library to gym").await.unwrap_err();
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_plan_between_ids() {
        let planner = Arc::new(LinePlanner::default());
        let orchestrator = orchestrator(Arc::clone(&planner));

        let result = orchestrator
            .plan_between(&PointId::new("2"), &PointId::new("1"), TravelMode::Bicycling)
            .await
            .unwrap();
        assert_eq!(result.start_name, "East Gym");
        assert_eq!(result.mode, TravelMode::Bicycling);
        assert_eq!(result.source, None);

        let err = orchestrator
            .plan_between(&PointId::new("1"), &PointId::new("99"), TravelMode::Walking)
            .await
            .unwrap_err();
        assert_eq!(err, RouteError::EndNotFound("99".into()));
    }
}
