use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid instruction rule '{label}': {source}")]
    Rule {
        label: String,
        #[source]
        source: regex::Error,
    },

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, NavError>;
