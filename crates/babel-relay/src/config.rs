//! Relay configuration, read from TOML.
//!
//! ```toml
//! pool_size = 10
//! timeout = "10s"
//! babel_proto = "http"
//! babel_addr = "localhost:8080"
//! babel_path = "/"
//! rest_path = "/api"
//! ```
//!
//! Every key is optional.

use crate::error::RelayError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Number of relay workers, and idle keep-alive connections per host.
    pub pool_size: usize,
    /// Per-call timeout such as `"500ms"`, `"10s"`, `"2m"` or `"1h"`.
    pub timeout: String,
    /// `http` or `https`.
    pub babel_proto: String,
    /// Host and optional port of the Babel service.
    pub babel_addr: String,
    /// Path prefix of Babel RPC endpoints.
    pub babel_path: String,
    /// Path prefix of REST routes.
    pub rest_path: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            timeout: "10s".to_string(),
            babel_proto: "http".to_string(),
            babel_addr: "localhost".to_string(),
            babel_path: "/".to_string(),
            rest_path: "/".to_string(),
        }
    }
}

impl RelayConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, RelayError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RelayError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(RelayError::ReadConfig {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), RelayError> {
        if self.pool_size == 0 {
            return Err(RelayError::InvalidConfig {
                field: "pool_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if !matches!(self.babel_proto.as_str(), "http" | "https") {
            return Err(RelayError::InvalidConfig {
                field: "babel_proto",
                reason: format!("expected http or https, got {:?}", self.babel_proto),
            });
        }
        if self.babel_addr.trim().is_empty() {
            return Err(RelayError::InvalidConfig {
                field: "babel_addr",
                reason: "must not be empty".to_string(),
            });
        }
        self.timeout()?;
        Ok(())
    }

    pub fn timeout(&self) -> Result<Duration, RelayError> {
        parse_duration(&self.timeout)
    }
}

/// Parse a single-unit duration: `ms`, `s`, `m` or `h`, with an optional
/// fractional part (`1.5s`).
pub fn parse_duration(raw: &str) -> Result<Duration, RelayError> {
    let invalid = || RelayError::InvalidDuration {
        value: raw.to_string(),
    };
    let trimmed = raw.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .ok_or_else(invalid)?;
    let (number, unit) = trimmed.split_at(split);
    let value: f64 = number.parse().map_err(|_| invalid())?;
    let seconds = match unit {
        "ms" => value / 1000.0,
        "s" => value,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        _ => return Err(invalid()),
    };
    Duration::try_from_secs_f64(seconds).map_err(|_| invalid())
}
