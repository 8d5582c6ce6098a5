//! Uniform diagnostic records for command-line front ends.

use crate::error::IdlError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_SOURCE: &str = "babel";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// One reportable problem, formatted like
/// `source(line,col): category error CODE: message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub source: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    #[serde(default)]
    pub category: String,
    pub severity: Severity,
    pub code: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: u32, message: impl Into<String>) -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            line: 0,
            column: 0,
            category: String::new(),
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: u32, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<&IdlError> for Diagnostic {
    fn from(err: &IdlError) -> Self {
        Diagnostic::error(err.code(), err.to_string()).with_category(err.category())
    }
}

impl From<IdlError> for Diagnostic {
    fn from(err: IdlError) -> Self {
        Diagnostic::from(&err)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)?;
        match (self.line, self.column) {
            (0, _) => {}
            (line, 0) => write!(f, "({line})")?,
            (line, column) => write!(f, "({line},{column})")?,
        }
        f.write_str(": ")?;
        if !self.category.is_empty() {
            write!(f, "{} ", self.category)?;
        }
        write!(f, "{} {}: {}", self.severity, self.code, self.message)
    }
}
