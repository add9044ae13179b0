use thiserror::Error;

/// Errors raised while building devices, composing discovery and loading config
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown component type '{0}'")]
    UnknownComponent(String),

    #[error("invalid entity '{key}': {reason}")]
    InvalidEntity { key: String, reason: String },

    #[error("entity '{0}' is already registered")]
    DuplicateEntity(String),

    #[error("invalid attribute filter: {0}")]
    InvalidAttributeFilter(#[from] regex::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
