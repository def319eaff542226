//! Language-model extraction of route endpoints

pub mod client;
pub mod extractor;

pub use client::{LlmClient, LlmError};
pub use extractor::{EndpointExtractor, ExtractionError, LlmEndpointExtractor};
