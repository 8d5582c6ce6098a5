use babel_rest::{CoerceError, RestError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to read config {}: {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ParseConfig(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("invalid duration \"{value}\"")]
    InvalidDuration { value: String },

    #[error("failed to build http client: {0}")]
    BuildClient(#[source] reqwest::Error),

    #[error("relay call to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("cannot bind {service}.{method}: {source}")]
    Binding {
        service: String,
        method: String,
        source: RestError,
    },

    #[error("parameter {parameter}: {source}")]
    Coerce {
        parameter: String,
        source: CoerceError,
    },

    #[error("parameter {parameter} is read from the body, but the request has none")]
    MissingBody { parameter: String },

    #[error("failed to encode arguments: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("no services to relay")]
    NoServices,

    #[error("relay pool is closed")]
    Closed,
}
