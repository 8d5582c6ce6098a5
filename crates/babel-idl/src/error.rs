//! Error types for IDL assembly and validation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of definition a redefinition or collision refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Const,
    ConstValue,
    Enum,
    EnumValue,
    Struct,
    Service,
    Field,
    Method,
    Parameter,
}

impl DefinitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionKind::Const => "const",
            DefinitionKind::ConstValue => "const value",
            DefinitionKind::Enum => "enum",
            DefinitionKind::EnumValue => "enum value",
            DefinitionKind::Struct => "struct",
            DefinitionKind::Service => "service",
            DefinitionKind::Field => "field",
            DefinitionKind::Method => "method",
            DefinitionKind::Parameter => "parameter",
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors arising while assembling or validating an IDL tree.
///
/// Every check is fail-fast: the first violation found is returned and
/// nothing is aggregated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdlError {
    /// A name was reused inside its own scope (an Idl, a struct, a method...).
    #[error("{kind} \"{name}\" redefined in {scope}")]
    Redefined {
        kind: DefinitionKind,
        scope: String,
        name: String,
    },

    /// The same file was imported twice by one parent.
    #[error("double import of \"{path}\"")]
    DuplicateImport { path: String },

    #[error("namespace redefined for language {language}")]
    NamespaceRedefined { language: String },

    #[error("default namespace already defined")]
    DefaultNamespaceRedefined,

    #[error("default namespace domain must have two or more non-empty segments: \"{domain}\"")]
    InvalidDomain { domain: String },

    #[error("default namespace must have one or more non-empty segments: \"{namespace}\"")]
    InvalidNamespace { namespace: String },

    /// Two top-level definitions share a name across the root and its imports.
    #[error("{kind} \"{name}\" redefined in \"{file}\"")]
    NameCollision {
        kind: DefinitionKind,
        name: String,
        file: String,
    },

    #[error("inheritance cycle detected: {name}")]
    InheritanceCycle { name: String },

    #[error("parent not found: {name}")]
    ParentNotFound { name: String },

    #[error("field {strukt}.{field} uses an abstract type; polymorphic types are not supported")]
    AbstractField { strukt: String, field: String },

    #[error("method {service}.{method} returns an abstract type; polymorphic types are not supported")]
    AbstractReturn { service: String, method: String },

    #[error(
        "parameter {parameter} of method {service}.{method} uses an abstract type; polymorphic types are not supported"
    )]
    AbstractParameter {
        service: String,
        method: String,
        parameter: String,
    },

    /// A struct field repeats the name of a field declared by an ancestor.
    #[error("field {ancestor}.{field} redefined somewhere up to {child}")]
    FieldShadowed {
        ancestor: String,
        field: String,
        child: String,
    },

    #[error("invalid initialization of {ty} {field}: {detail}")]
    InitializerTypeMismatch {
        field: String,
        ty: String,
        detail: String,
    },

    #[error("invalid reference syntax for {field}: {reference}")]
    InvalidReference { field: String, reference: String },

    #[error("field {field} is initialized with something that cannot be found: {reference}")]
    InitializerReferenceNotFound { field: String, reference: String },

    #[error(
        "initialized parameters of method {service}.{method} must appear at the end; {parameter} is not initialized"
    )]
    TrailingDefaults {
        service: String,
        method: String,
        parameter: String,
    },

    #[error("type {name} is not defined")]
    TypeNotDefined { name: String },

    /// `void` outside the top level of a method return.
    #[error("void is only valid as a method return, not in {position}")]
    MisplacedVoid { position: String },

    #[error("namespace for {language} is required in \"{file}\"")]
    NamespaceMissing { language: String, file: String },
}

impl IdlError {
    /// Stable numeric code for CLI diagnostics and exit-code mapping.
    pub fn code(&self) -> u32 {
        match self {
            IdlError::Redefined { .. } => 100,
            IdlError::DuplicateImport { .. } => 101,
            IdlError::NameCollision { .. } => 102,
            IdlError::NamespaceRedefined { .. } => 110,
            IdlError::DefaultNamespaceRedefined => 111,
            IdlError::InvalidDomain { .. } => 112,
            IdlError::InvalidNamespace { .. } => 113,
            IdlError::NamespaceMissing { .. } => 114,
            IdlError::InheritanceCycle { .. } => 120,
            IdlError::ParentNotFound { .. } => 121,
            IdlError::FieldShadowed { .. } => 122,
            IdlError::AbstractField { .. } => 130,
            IdlError::AbstractReturn { .. } => 131,
            IdlError::AbstractParameter { .. } => 132,
            IdlError::InitializerTypeMismatch { .. } => 140,
            IdlError::InvalidReference { .. } => 141,
            IdlError::InitializerReferenceNotFound { .. } => 142,
            IdlError::TrailingDefaults { .. } => 143,
            IdlError::TypeNotDefined { .. } => 150,
            IdlError::MisplacedVoid { .. } => 151,
        }
    }

    /// Short category label used as the diagnostic category.
    pub fn category(&self) -> &'static str {
        match self {
            IdlError::Redefined { .. } | IdlError::NameCollision { .. } => "definition",
            IdlError::DuplicateImport { .. } => "import",
            IdlError::NamespaceRedefined { .. }
            | IdlError::DefaultNamespaceRedefined
            | IdlError::InvalidDomain { .. }
            | IdlError::InvalidNamespace { .. }
            | IdlError::NamespaceMissing { .. } => "namespace",
            IdlError::InheritanceCycle { .. }
            | IdlError::ParentNotFound { .. }
            | IdlError::FieldShadowed { .. } => "inheritance",
            IdlError::AbstractField { .. }
            | IdlError::AbstractReturn { .. }
            | IdlError::AbstractParameter { .. }
            | IdlError::TypeNotDefined { .. }
            | IdlError::MisplacedVoid { .. } => "type",
            IdlError::InitializerTypeMismatch { .. }
            | IdlError::InvalidReference { .. }
            | IdlError::InitializerReferenceNotFound { .. }
            | IdlError::TrailingDefaults { .. } => "initializer",
        }
    }
}
