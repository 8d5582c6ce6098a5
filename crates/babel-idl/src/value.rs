//! Literal values and name/value pairs.
//!
//! Pairs carry constants, enum values, attribute parameters, and field
//! initializers. Each value knows its own literal kind, so consumers match
//! exhaustively instead of inspecting a loose type tag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The literal kind a value was written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    Int,
    Float,
    Bool,
    String,
    Char,
    /// A `Name.Value` reference to an enum value or a const value.
    Ref,
}

impl LiteralKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiteralKind::Int => "int",
            LiteralKind::Float => "float",
            LiteralKind::Bool => "bool",
            LiteralKind::String => "string",
            LiteralKind::Char => "char",
            LiteralKind::Ref => "#ref",
        }
    }
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal value as written in IDL source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Char(char),
    Ref(String),
}

impl Value {
    pub fn kind(&self) -> LiteralKind {
        match self {
            Value::Int(_) => LiteralKind::Int,
            Value::Float(_) => LiteralKind::Float,
            Value::Bool(_) => LiteralKind::Bool,
            Value::String(_) => LiteralKind::String,
            Value::Char(_) => LiteralKind::Char,
            Value::Ref(_) => LiteralKind::Ref,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Char(c) => write!(f, "{c:?}"),
            Value::Ref(r) => f.write_str(r),
        }
    }
}

/// A name bound to a literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub name: String,
    pub value: Value,
}

impl Pair {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn kind(&self) -> LiteralKind {
        self.value.kind()
    }
}
