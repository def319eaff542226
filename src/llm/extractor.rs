//! Extract route endpoints from an instruction with a language model
//!
//! The model is asked for `{"start": "...", "end": "..."}` and nothing else.
//! Anything that is not that shape is an `ExtractionError`, which callers
//! treat as "use the rule-based parser instead", never as a user error.

use crate::instruction::EndpointPair;
use crate::llm::client::{LlmClient, LlmError};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Why the extraction provider produced no pair
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("extraction provider not configured")]
    NotConfigured,

    #[error("extraction timed out")]
    Timeout,

    #[error("provider call failed: {0}")]
    Provider(#[from] LlmError),

    #[error("malformed provider content: {0}")]
    Malformed(String),

    #[error("provider returned no start/end")]
    Incomplete,
}

/// Source of start/end pairs for the orchestrator
#[async_trait]
pub trait EndpointExtractor: Send + Sync {
    async fn extract_endpoints(&self, instruction: &str) -> Result<EndpointPair, ExtractionError>;
}

/// `EndpointExtractor` backed by an LLM chat completion
pub struct LlmEndpointExtractor {
    client: LlmClient,
}

impl LlmEndpointExtractor {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EndpointExtractor for LlmEndpointExtractor {
    async fn extract_endpoints(&self, instruction: &str) -> Result<EndpointPair, ExtractionError> {
        let user_prompt = format!("INSTRUCTION:\n{}\n\nReturn the JSON object:", instruction);
        let response = self.client.complete(EXTRACT_SYSTEM_PROMPT, &user_prompt).await?;
        parse_endpoints(&response)
    }
}

#[derive(Deserialize)]
struct RawEndpoints {
    start: Option<String>,
    end: Option<String>,
}

/// Parse the model's completion into a pair
pub fn parse_endpoints(response: &str) -> Result<EndpointPair, ExtractionError> {
    let json_str = extract_json(response)?;
    let raw: RawEndpoints = serde_json::from_str(json_str)
        .map_err(|e| ExtractionError::Malformed(format!("{} - Response: {}", e, response)))?;

    let start = raw.start.map(|s| s.trim().to_string()).unwrap_or_default();
    let end = raw.end.map(|s| s.trim().to_string()).unwrap_or_default();
    if start.is_empty() || end.is_empty() {
        return Err(ExtractionError::Incomplete);
    }
    Ok(EndpointPair { start, end })
}

/// Extract a JSON object from an LLM response that may contain other text
fn extract_json(response: &str) -> Result<&str, ExtractionError> {
    let start = response
        .find('{')
        .ok_or_else(|| ExtractionError::Malformed("No JSON found in response".into()))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| ExtractionError::Malformed("No closing brace found in response".into()))?;
    if end < start {
        return Err(ExtractionError::Malformed("Braces out of order in response".into()));
    }
    Ok(&response[start..=end])
}

/// System prompt for endpoint extraction
const EXTRACT_SYSTEM_PROMPT: &str = r#"You extract route endpoints from campus navigation requests.
Identify where the user starts and where they want to go.

OUTPUT FORMAT (JSON only, no explanation):
{"start": "starting place", "end": "destination"}

Rules:
- Copy place names as the user wrote them; do not invent places.
- Leave out transport words such as "walking" or "by bike".
- If the request has no clear start and destination, use empty strings.

Examples:
"from the library to the gym" -> {"start": "the library", "end": "the gym"}
"how do I get to the east canteen from dorm 5" -> {"start": "dorm 5", "end": "the east canteen"}
"walking, north gate to the stadium please" -> {"start": "north gate", "end": "the stadium"}
"#;
