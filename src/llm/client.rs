//! Async LLM client for instruction extraction
//!
//! Model-agnostic HTTP client. Supports both Anthropic and OpenAI-compatible
//! APIs (DeepSeek, etc). Every request carries the configured timeout so a
//! slow provider turns into an `LlmError::Timeout` rather than a hang.

use crate::core::config::LlmConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Transport-level failures talking to the model
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else if e.is_decode() {
            LlmError::Decode(e.to_string())
        } else {
            LlmError::Transport(e.to_string())
        }
    }
}

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    temperature: f32,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String, timeout: Duration) -> Result<Self, LlmError> {
        let api_format = Self::detect_api_format(&api_url);
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            api_url,
            model,
            temperature: 0.2,
            api_format,
        })
    }

    /// Create a client from the `[llm]` config section
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let mut client = Self::new(
            config.api_key.clone(),
            config.api_url.clone(),
            config.model.clone(),
            config.timeout(),
        )?;
        client.temperature = config.temperature;
        Ok(client)
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            // DeepSeek, OpenAI, and other compatible APIs use OpenAI format
            ApiFormat::OpenAI
        }
    }

    pub fn api_format(&self) -> &ApiFormat {
        &self.api_format
    }

    /// Send a completion request to the LLM
    ///
    /// # Arguments
    /// * `system` - System prompt providing context and instructions
    /// * `user` - User message/query to process
    ///
    /// # Returns
    /// The LLM's primary text completion
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAI => self.complete_openai(system, user).await,
        }
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: 256,
            temperature: self.temperature,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let completion: AnthropicResponse = response.json().await?;

        completion
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or(LlmError::EmptyResponse)
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: 256,
            temperature: self.temperature,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let completion: OpenAIResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
