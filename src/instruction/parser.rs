//! Rule-based endpoint extraction
//!
//! Used when the language-model extractor is unavailable or fails, and on
//! its own for offline operation. Three steps:
//! 1. first matching pattern rule wins
//! 2. clean up the captures (modifier words, transport-mode words)
//! 3. otherwise take the first two non-stop-word tokens

use crate::core::config::ParserConfig;
use crate::core::error::Result;
use crate::instruction::lexicon::Lexicon;
use crate::instruction::rules::{
    compile_all, compile_mode_rematch, default_rule_specs, PatternRule, DEFAULT_MODE_REMATCH,
};
use crate::instruction::EndpointPair;

pub struct InstructionParser {
    lexicon: Lexicon,
    rules: Vec<PatternRule>,
    /// One re-match rule per transport phrase
    mode_rematch: Vec<(String, PatternRule)>,
}

impl InstructionParser {
    /// Parser with the English "<mode> from A to B" re-match
    pub fn new(lexicon: Lexicon, rules: Vec<PatternRule>) -> Result<Self> {
        Self::with_mode_template(lexicon, rules, DEFAULT_MODE_REMATCH)
    }

    /// Parser with a custom re-match template (`{mode}` placeholder, groups 1 and 2)
    pub fn with_mode_template(lexicon: Lexicon, rules: Vec<PatternRule>, template: &str) -> Result<Self> {
        let mode_rematch = compile_mode_rematch(template, &lexicon.transport_words)?;
        Ok(Self {
            lexicon,
            rules,
            mode_rematch,
        })
    }

    /// Built-in English lexicon and rules
    pub fn english() -> Result<Self> {
        Self::new(Lexicon::english(), compile_all(&default_rule_specs())?)
    }

    /// Lexicon and rules from configuration, defaulting what is unset
    pub fn from_config(config: &ParserConfig) -> Result<Self> {
        let rules = match &config.rules {
            Some(specs) => compile_all(specs)?,
            None => compile_all(&default_rule_specs())?,
        };
        Self::with_mode_template(config.lexicon(), rules, config.mode_template())
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Extract a start/end pair from a free-text instruction
    pub fn extract_endpoints(&self, instruction: &str) -> Option<EndpointPair> {
        let text = normalize(instruction);
        if text.is_empty() {
            return None;
        }

        for rule in &self.rules {
            let Some((start, end)) = rule.apply(&text) else {
                continue;
            };
            if start.chars().count() <= 1 || end.chars().count() <= 1 {
                continue;
            }

            let start = self.strip_modifiers(start);
            let end = self.strip_modifiers(end);
            let pair = self.recover_transport_words(&text, start, end);
            tracing::debug!("Instruction matched rule '{}': {:?}", rule.label, pair);
            return Some(pair);
        }

        let pair = self.keyword_fallback(&text);
        if pair.is_none() {
            tracing::debug!("No rule or keyword pair for instruction {:?}", instruction);
        }
        pair
    }

    /// Remove generic modifier words from either end, never emptying the name
    fn strip_modifiers(&self, location: &str) -> String {
        let mut s = location.to_string();
        for modifier in &self.lexicon.modifier_words {
            if let Some(rest) = s.strip_suffix(modifier.as_str()) {
                if rest.ends_with(char::is_whitespace) && !rest.trim().is_empty() {
                    s = rest.trim_end().to_string();
                }
            }
            if let Some(rest) = s.strip_prefix(modifier.as_str()) {
                if rest.starts_with(char::is_whitespace) && !rest.trim().is_empty() {
                    s = rest.trim_start().to_string();
                }
            }
        }
        s
    }

    /// Repair pairs where a transport-mode phrase landed in a location slot
    ///
    /// A mode as start means the instruction read "<mode> from A to B", so
    /// re-match that shape. A mode as end means the order was reversed.
    fn recover_transport_words(&self, text: &str, start: String, end: String) -> EndpointPair {
        for (word, rematch) in &self.mode_rematch {
            if start == *word {
                if let Some((s, e)) = rematch.apply(text) {
                    return EndpointPair::new(s, e);
                }
            } else if end == *word {
                return EndpointPair { start: end, end: start };
            }
        }
        EndpointPair { start, end }
    }

    /// First two tokens longer than one character that are not stop words
    fn keyword_fallback(&self, text: &str) -> Option<EndpointPair> {
        let mut picked = text
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|w| w.chars().count() > 1 && !self.lexicon.is_stop_word(w));

        let start = picked.next()?;
        let end = picked.next()?;
        tracing::debug!("Keyword fallback picked {:?} -> {:?}", start, end);
        Some(EndpointPair::new(start, end))
    }
}

/// Lowercase, trim, and drop trailing sentence punctuation
fn normalize(instruction: &str) -> String {
    instruction
        .trim()
        .trim_end_matches(['.', '?', '!', '。', '？', '！'])
        .trim()
        .to_lowercase()
}
