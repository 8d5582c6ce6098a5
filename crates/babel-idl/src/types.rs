//! The recursive IDL type descriptor.
//!
//! ```text
//!   Shape         Key          Value        Meaning
//!   ------------  -----------  -----------  -------------------------------
//!   primitive     -            -            one of the built-in scalar kinds
//!   user-defined  -            -            a struct or enum, by name
//!   list          -            Type         list of Type
//!   map           primitive    Type         map of primitive to Type
//!   void          -            -            no return value (methods only)
//! ```
//!
//! Lists and maps nest arbitrarily. User-defined names are resolved lazily
//! against a context [`Idl`], since imports may be attached after the type
//! was built.

use crate::error::IdlError;
use crate::idl::Idl;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Bool,
    Byte,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Datetime,
    Decimal,
    Char,
    Binary,
}

impl Primitive {
    pub const ALL: [Primitive; 13] = [
        Primitive::Bool,
        Primitive::Byte,
        Primitive::Int8,
        Primitive::Int16,
        Primitive::Int32,
        Primitive::Int64,
        Primitive::Float32,
        Primitive::Float64,
        Primitive::String,
        Primitive::Datetime,
        Primitive::Decimal,
        Primitive::Char,
        Primitive::Binary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Byte => "byte",
            Primitive::Int8 => "int8",
            Primitive::Int16 => "int16",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
            Primitive::String => "string",
            Primitive::Datetime => "datetime",
            Primitive::Decimal => "decimal",
            Primitive::Char => "char",
            Primitive::Binary => "binary",
        }
    }

    /// Look up a primitive by its exact IDL spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// Scalar kinds usable as map keys. Binary is a blob, not a scalar.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Primitive::Binary)
    }

    pub fn is_int(&self) -> bool {
        matches!(
            self,
            Primitive::Byte | Primitive::Int8 | Primitive::Int16 | Primitive::Int32 | Primitive::Int64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Primitive::Float32 | Primitive::Float64)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a [`Type`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "of", rename_all = "snake_case")]
pub enum TypeKind {
    Primitive(Primitive),
    List(Box<Type>),
    Map { key: Primitive, value: Box<Type> },
    UserDefined(String),
    Void,
}

/// An IDL type, optionally renamed for serializers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Type {
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
}

impl Type {
    fn of(kind: TypeKind) -> Self {
        Self { kind, rename: None }
    }

    pub fn primitive(p: Primitive) -> Self {
        Self::of(TypeKind::Primitive(p))
    }

    pub fn list(value: Type) -> Self {
        Self::of(TypeKind::List(Box::new(value)))
    }

    pub fn map(key: Primitive, value: Type) -> Self {
        Self::of(TypeKind::Map {
            key,
            value: Box::new(value),
        })
    }

    pub fn user_defined(name: impl Into<String>) -> Self {
        Self::of(TypeKind::UserDefined(name.into()))
    }

    pub fn void() -> Self {
        Self::of(TypeKind::Void)
    }

    /// Build a type from a bare identifier: a primitive, `void`, or a
    /// user-defined reference.
    pub fn named(name: &str) -> Self {
        match Primitive::from_name(name) {
            Some(p) => Self::primitive(p),
            None if name == "void" => Self::void(),
            None => Self::user_defined(name),
        }
    }

    pub fn with_rename(mut self, rename: impl Into<String>) -> Self {
        self.rename = Some(rename.into());
        self
    }

    /// The type's own name: the primitive spelling, `list`, `map`, `void`,
    /// or the user-defined name.
    pub fn name(&self) -> &str {
        match &self.kind {
            TypeKind::Primitive(p) => p.as_str(),
            TypeKind::List(_) => "list",
            TypeKind::Map { .. } => "map",
            TypeKind::UserDefined(name) => name,
            TypeKind::Void => "void",
        }
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self.kind {
            TypeKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Element type of a list or value type of a map.
    pub fn value_type(&self) -> Option<&Type> {
        match &self.kind {
            TypeKind::List(value) | TypeKind::Map { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn key_type(&self) -> Option<Primitive> {
        match self.kind {
            TypeKind::Map { key, .. } => Some(key),
            _ => None,
        }
    }

    /// One of the twelve scalar primitives. Binary is not included.
    pub fn is_primitive(&self) -> bool {
        self.as_primitive().is_some_and(|p| p.is_scalar())
    }

    pub fn is_bool(&self) -> bool {
        self.as_primitive() == Some(Primitive::Bool)
    }

    pub fn is_int(&self) -> bool {
        self.as_primitive().is_some_and(|p| p.is_int())
    }

    pub fn is_byte(&self) -> bool {
        matches!(
            self.as_primitive(),
            Some(Primitive::Byte | Primitive::Int8)
        )
    }

    pub fn is_float(&self) -> bool {
        self.as_primitive().is_some_and(|p| p.is_float())
    }

    pub fn is_string(&self) -> bool {
        self.as_primitive() == Some(Primitive::String)
    }

    pub fn is_char(&self) -> bool {
        self.as_primitive() == Some(Primitive::Char)
    }

    pub fn is_datetime(&self) -> bool {
        self.as_primitive() == Some(Primitive::Datetime)
    }

    pub fn is_decimal(&self) -> bool {
        self.as_primitive() == Some(Primitive::Decimal)
    }

    pub fn is_binary(&self) -> bool {
        self.as_primitive() == Some(Primitive::Binary)
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, TypeKind::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self.kind, TypeKind::Map { .. })
    }

    pub fn is_collection(&self) -> bool {
        self.is_list() || self.is_map()
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeKind::Void)
    }

    pub fn is_user_defined(&self) -> bool {
        matches!(self.kind, TypeKind::UserDefined(_))
    }

    pub fn is_enum(&self, ctx: &Idl) -> bool {
        match &self.kind {
            TypeKind::UserDefined(name) => ctx.find_enum(name).is_some(),
            _ => false,
        }
    }

    pub fn is_struct(&self, ctx: &Idl) -> bool {
        match &self.kind {
            TypeKind::UserDefined(name) => ctx.find_struct(name).is_some(),
            _ => false,
        }
    }

    /// Whether this type is, or holds as a list/map value, an abstract struct.
    pub fn is_abstract(&self, ctx: &Idl) -> bool {
        match &self.kind {
            TypeKind::UserDefined(name) => ctx.find_struct(name).is_some_and(|s| s.is_abstract),
            TypeKind::List(value) | TypeKind::Map { value, .. } => value.is_abstract(ctx),
            TypeKind::Primitive(_) | TypeKind::Void => false,
        }
    }

    /// Confirm every user-defined name reachable from this type resolves to
    /// a struct or enum known to `ctx`, and that no list or map holds `void`.
    pub fn check(&self, ctx: &Idl) -> Result<(), IdlError> {
        match &self.kind {
            TypeKind::UserDefined(name) => {
                if self.is_struct(ctx) || self.is_enum(ctx) {
                    Ok(())
                } else {
                    Err(IdlError::TypeNotDefined { name: name.clone() })
                }
            }
            TypeKind::List(value) | TypeKind::Map { value, .. } if value.is_void() => {
                Err(IdlError::MisplacedVoid {
                    position: self.to_string(),
                })
            }
            TypeKind::List(value) | TypeKind::Map { value, .. } => value.check(ctx),
            TypeKind::Primitive(_) | TypeKind::Void => Ok(()),
        }
    }

    /// Synthetic identifier for serializers, e.g. `MapOfstringToListOfFoo`.
    pub fn tag_name(&self) -> String {
        if let Some(rename) = &self.rename {
            return rename.clone();
        }
        match &self.kind {
            TypeKind::List(value) => format!("ListOf{}", value.tag_name()),
            TypeKind::Map { key, value } => format!("MapOf{key}To{}", value.tag_name()),
            _ => self.name().to_string(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::List(value) => write!(f, "list<{value}>"),
            TypeKind::Map { key, value } => write!(f, "map<{key},{value}>"),
            _ => f.write_str(self.name()),
        }
    }
}
