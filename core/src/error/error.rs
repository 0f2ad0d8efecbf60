use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("server failed: {0}")]
    Server(String),
    #[error("command failed: {0}")]
    Command(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// The analysis provider could not produce usable text.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("analysis provider call failed: {0}")]
    Unreachable(String),
    #[error("analysis provider timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("analysis provider returned unparseable content: {0}")]
    Unparseable(String),
}

/// The provider returned JSON that does not satisfy the classification schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("field '{field}' has the wrong type (expected {expected})")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("field '{field}' has value '{value}' outside its allowed set")]
    InvalidVariant { field: &'static str, value: String },
    #[error("confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f64),
    #[error("field '{0}' must be an array")]
    NotASequence(&'static str),
}

/// Failures that abort an event before a decision is computed.
#[derive(Error, Debug)]
pub enum TriageError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("classification rejected: {0}")]
    Schema(#[from] SchemaError),
}

impl TriageError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Provider(_) => "provider",
            Self::Schema(_) => "schema",
        }
    }
}

/// Per-branch dispatcher failures. Logged and counted, never propagated upstream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("notification failed: {0}")]
    Notify(String),
    #[error("comment post failed: {0}")]
    Comment(String),
    #[error("fix agent failed to start: {0}")]
    Spawn(String),
}

impl DispatchError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Notify(_) => "notify",
            Self::Comment(_) => "comment",
            Self::Spawn(_) => "spawn",
        }
    }
}
