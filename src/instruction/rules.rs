//! Ordered pattern rules for pulling a start/end pair out of an instruction
//!
//! Rules are tried in list order and the first match wins, so a rule must
//! come before any more generic rule whose pattern would also match and
//! swallow its qualifier words into a location ("... to the gym how do I
//! get there" must hit the interrogative rule before the plain "to" rule).

use crate::core::error::{NavError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Rule as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub label: String,
    /// Regex applied to the lowercased instruction
    pub pattern: String,
    /// Capture group holding the start location (1-based)
    pub start_group: usize,
    /// Capture group holding the end location (1-based)
    pub end_group: usize,
}

impl RuleSpec {
    pub fn new(label: &str, pattern: impl Into<String>, start_group: usize, end_group: usize) -> Self {
        Self {
            label: label.to_string(),
            pattern: pattern.into(),
            start_group,
            end_group,
        }
    }

    /// Group indexes must name two distinct, non-zero groups
    pub fn check_groups(&self) -> Result<()> {
        if self.start_group == 0 || self.end_group == 0 || self.start_group == self.end_group {
            return Err(NavError::Config(format!(
                "rule '{}' needs two distinct capture groups >= 1 (got {} and {})",
                self.label, self.start_group, self.end_group
            )));
        }
        Ok(())
    }
}

/// A compiled rule
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub label: String,
    regex: Regex,
    start_group: usize,
    end_group: usize,
}

impl PatternRule {
    pub fn compile(spec: &RuleSpec) -> Result<Self> {
        spec.check_groups()?;
        let regex = Regex::new(&spec.pattern).map_err(|source| NavError::Rule {
            label: spec.label.clone(),
            source,
        })?;

        // captures_len counts the implicit group 0
        let available = regex.captures_len() - 1;
        if spec.start_group.max(spec.end_group) > available {
            return Err(NavError::Config(format!(
                "rule '{}' references group {} but the pattern has {}",
                spec.label,
                spec.start_group.max(spec.end_group),
                available
            )));
        }

        Ok(Self {
            label: spec.label.clone(),
            regex,
            start_group: spec.start_group,
            end_group: spec.end_group,
        })
    }

    /// Apply the rule, returning the trimmed (start, end) captures
    pub fn apply<'t>(&self, text: &'t str) -> Option<(&'t str, &'t str)> {
        let caps = self.regex.captures(text)?;
        let start = caps.get(self.start_group)?.as_str().trim();
        let end = caps.get(self.end_group)?.as_str().trim();
        Some((start, end))
    }
}

/// Compile a list of specs, preserving order
pub fn compile_all(specs: &[RuleSpec]) -> Result<Vec<PatternRule>> {
    specs.iter().map(PatternRule::compile).collect()
}

/// Placeholder for the escaped transport phrase in a mode re-match template
pub const MODE_PLACEHOLDER: &str = "{mode}";

/// Re-match for "<mode> from A to B" once a mode phrase was captured as the start
pub const DEFAULT_MODE_REMATCH: &str = r"{mode}[\s,]+from\s+(.+?)\s+to\s+(.+?)$";

/// A mode re-match template must mention the mode it is instantiated for
pub fn check_mode_template(template: &str) -> Result<()> {
    if !template.contains(MODE_PLACEHOLDER) {
        return Err(NavError::Config(format!(
            "mode re-match template {:?} has no {} placeholder",
            template, MODE_PLACEHOLDER
        )));
    }
    Ok(())
}

/// Instantiate the template once per transport phrase
///
/// Group 1 is the start and group 2 the end in every instance.
pub fn compile_mode_rematch(template: &str, modes: &[String]) -> Result<Vec<(String, PatternRule)>> {
    check_mode_template(template)?;
    modes
        .iter()
        .map(|mode| -> Result<(String, PatternRule)> {
            let spec = RuleSpec::new(
                &format!("mode_rematch:{}", mode),
                template.replace(MODE_PLACEHOLDER, &regex::escape(mode)),
                1,
                2,
            );
            Ok((mode.clone(), PatternRule::compile(&spec)?))
        })
        .collect()
}

/// Trailing questions that follow a "A to B" request
const ASK_SUFFIX: &str = r"(?:how\s+(?:do|can|should)\s+i\s+get\s+there|how\s+to\s+get\s+there|how\s+do\s+i\s+go|what(?:'s|\s+is)\s+the\s+(?:best\s+)?(?:route|way))";

/// Leading requests that precede "from A to B"
const DIRECTIVE: &str = r"(?:help\s+me|take\s+me|guide\s+me|show\s+me\s+how\s+to|i\s+want\s+to|i'd\s+like\s+to|i\s+need\s+to)";

/// The built-in English rule list
pub fn default_rule_specs() -> Vec<RuleSpec> {
    vec![
        // from A to B + question
        RuleSpec::new(
            "from_to_question",
            format!(r"from\s+(.+?)\s+to\s+(.+?)[\s,]+{ASK_SUFFIX}$"),
            1,
            2,
        ),
        // help me go from A to B
        RuleSpec::new(
            "directive_from_to",
            format!(r"{DIRECTIVE}\s+(?:go\s+|get\s+|walk\s+|travel\s+)?from\s+(.+?)\s+to\s+(.+?)$"),
            1,
            2,
        ),
        // from A go to B
        RuleSpec::new("from_go_to", r"from\s+(.+?)\s+(?:go|head|get)\s+to\s+(.+?)$", 1, 2),
        // from A to B
        RuleSpec::new("from_to", r"from\s+(.+?)\s+to\s+(.+?)$", 1, 2),
        // go to B from A
        RuleSpec::new(
            "go_to_from",
            r"(?:go|get|head|walk|take\s+me|bring\s+me|guide\s+me)\s+to\s+(.+?)\s+from\s+(.+?)$",
            2,
            1,
        ),
        // to B from A
        RuleSpec::new("to_from", r"^to\s+(.+?)\s+from\s+(.+?)$", 2, 1),
        // A to B how do I get there
        RuleSpec::new("to_question", format!(r"^(.+?)\s+to\s+(.+?)[\s,]+{ASK_SUFFIX}$"), 1, 2),
        // A→B
        RuleSpec::new("arrow", r"^(.+?)\s*(?:→|->)\s*(.+?)$", 1, 2),
        // A to B
        RuleSpec::new("to", r"^(.+?)\s+to\s+(.+?)$", 1, 2),
    ]
}
