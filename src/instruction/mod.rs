//! Instruction parsing - free text to a start/end location pair
//!
//! The language-model extractor in `llm` is the primary path; the
//! rule-based `InstructionParser` here is the fallback.

pub mod lexicon;
pub mod parser;
pub mod rules;

pub use lexicon::Lexicon;
pub use parser::InstructionParser;
pub use rules::{PatternRule, RuleSpec};

use serde::{Deserialize, Serialize};

/// Unresolved start and end locations, as written by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointPair {
    pub start: String,
    pub end: String,
}

impl EndpointPair {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}
