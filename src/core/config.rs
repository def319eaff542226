//! Runtime configuration
//!
//! API keys, endpoint URLs, timeouts and the parser's word lists live in
//! one `NavConfig` value that is handed to each component's constructor.
//! Every section has working defaults, so an empty TOML file is a valid
//! configuration.

use crate::core::error::{NavError, Result};
use crate::core::types::TravelMode;
use crate::instruction::lexicon::Lexicon;
use crate::instruction::rules::{check_mode_template, RuleSpec, DEFAULT_MODE_REMATCH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub llm: LlmConfig,
    pub amap: AmapConfig,
    pub data: DataConfig,
    pub parser: ParserConfig,
    pub style: StyleConfig,
}

/// Instruction-extraction provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Bearer key. Empty means the provider is not configured and the
    /// fallback parser handles every instruction.
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    /// Upper bound for one extraction round trip
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: "https://api.deepseek.com/chat/completions".into(),
            model: "deepseek-chat".into(),
            timeout_secs: 10,
            temperature: 0.2,
        }
    }
}

impl LlmConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_url.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// AMap route-planning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmapConfig {
    pub api_key: String,
    /// Base for the v3 walking/driving endpoints; the mode is appended
    pub route_api_url: String,
    /// The v4 bicycling endpoint, which has its own envelope
    pub bicycling_api_url: String,
    pub timeout_secs: u64,
}

impl Default for AmapConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            route_api_url: "https://restapi.amap.com/v3/direction".into(),
            bicycling_api_url: "https://restapi.amap.com/v4/direction/bicycling".into(),
            timeout_secs: 15,
        }
    }
}

impl AmapConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Locations of the static map data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// GeoJSON FeatureCollection holding the points of interest
    pub points_path: PathBuf,
    /// Optional alias JSON (lowercase alias -> canonical name fragment)
    pub aliases_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            points_path: PathBuf::from("map_data/campus.geojson"),
            aliases_path: PathBuf::from("map_data/aliases.json"),
        }
    }
}

/// Overrides for the fallback instruction parser
///
/// Any list left unset keeps the built-in English default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub stop_words: Option<Vec<String>>,
    pub modifier_words: Option<Vec<String>>,
    pub transport_words: Option<Vec<String>>,
    /// Replaces the whole default rule list when present
    pub rules: Option<Vec<RuleSpec>>,
    /// Pattern re-applied when a transport phrase lands in the start slot;
    /// `{mode}` is replaced by the escaped phrase, groups 1/2 are start/end
    pub mode_rematch: Option<String>,
}

impl ParserConfig {
    /// Build the effective lexicon, defaulting each unset list
    pub fn lexicon(&self) -> Lexicon {
        let mut lexicon = Lexicon::english();
        if let Some(words) = &self.stop_words {
            lexicon.stop_words = normalize_words(words);
        }
        if let Some(words) = &self.modifier_words {
            lexicon.modifier_words = normalize_words(words);
        }
        if let Some(words) = &self.transport_words {
            lexicon.transport_words = normalize_words(words);
        }
        lexicon
    }

    pub fn mode_template(&self) -> &str {
        self.mode_rematch.as_deref().unwrap_or(DEFAULT_MODE_REMATCH)
    }
}

fn normalize_words(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Display attributes attached to rendered routes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub walking_color: String,
    pub driving_color: String,
    pub bicycling_color: String,
    pub line_width: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            walking_color: "green".into(),
            driving_color: "blue".into(),
            bicycling_color: "orange".into(),
            line_width: 3,
        }
    }
}

impl StyleConfig {
    pub fn color_for(&self, mode: TravelMode) -> &str {
        match mode {
            TravelMode::Walking => &self.walking_color,
            TravelMode::Driving => &self.driving_color,
            TravelMode::Bicycling => &self.bicycling_color,
        }
    }
}

impl NavConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load `path` when it exists, otherwise start from defaults, then
    /// apply environment overrides and validate
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) if p.exists() => Self::load(p)?,
            Some(p) => {
                tracing::warn!("Config file {:?} not found - using defaults", p);
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    ///
    /// Recognized: LLM_API_KEY, LLM_API_URL, LLM_MODEL, AMAP_API_KEY
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (tests use a map)
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LLM_API_KEY") {
            self.llm.api_key = v;
        }
        if let Some(v) = lookup("LLM_API_URL") {
            self.llm.api_url = v;
        }
        if let Some(v) = lookup("LLM_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = lookup("AMAP_API_KEY") {
            self.amap.api_key = v;
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.llm.timeout_secs == 0 {
            return Err(NavError::Config("llm.timeout_secs must be positive".into()));
        }
        if self.amap.timeout_secs == 0 {
            return Err(NavError::Config("amap.timeout_secs must be positive".into()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(NavError::Config(format!(
                "llm.temperature ({}) should be within 0.0..=2.0",
                self.llm.temperature
            )));
        }
        if let Some(rules) = &self.parser.rules {
            for rule in rules {
                rule.check_groups()?;
            }
        }
        check_mode_template(self.parser.mode_template())?;
        Ok(())
    }
}
