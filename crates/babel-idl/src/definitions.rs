//! Definitions that make up an IDL document.
//!
//! Every `add_*` method rejects a name that already exists in the same
//! scope, compared case-insensitively.

use crate::error::{DefinitionKind, IdlError};
use crate::idl::Idl;
use crate::types::Type;
use crate::value::{LiteralKind, Pair, Value};
use serde::{Deserialize, Serialize};

pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// A named block of constant values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Const {
    #[serde(default)]
    pub comments: Vec<String>,
    pub name: String,
    pub values: Vec<Pair>,
}

impl Const {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add(&mut self, name: impl Into<String>, value: Value) -> Result<(), IdlError> {
        let name = name.into();
        if self.values.iter().any(|v| same_name(&v.name, &name)) {
            return Err(IdlError::Redefined {
                kind: DefinitionKind::ConstValue,
                scope: format!("const {}", self.name),
                name,
            });
        }
        self.values.push(Pair::new(name, value));
        Ok(())
    }

    /// Exact-name lookup.
    pub fn find_value(&self, name: &str) -> Option<&Pair> {
        self.values.iter().find(|v| v.name == name)
    }
}

/// A named group of integer-valued enumerators.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Enum {
    #[serde(default)]
    pub comments: Vec<String>,
    pub name: String,
    pub values: Vec<Pair>,
}

impl Enum {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add(&mut self, name: impl Into<String>, value: i64) -> Result<(), IdlError> {
        let name = name.into();
        if self.values.iter().any(|v| same_name(&v.name, &name)) {
            return Err(IdlError::Redefined {
                kind: DefinitionKind::EnumValue,
                scope: format!("enum {}", self.name),
                name,
            });
        }
        self.values.push(Pair::new(name, Value::Int(value)));
        Ok(())
    }

    pub fn find_value(&self, name: &str) -> Option<&Pair> {
        self.values.iter().find(|v| v.name == name)
    }
}

/// Generator-specific metadata attached to the definition that follows it.
///
/// The scope selects which tool interprets it (`rest` for the REST binder).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub parameters: Vec<Pair>,
}

impl Attribute {
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: scope.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.push(Pair::new(name, value));
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&Pair> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Whether a literal of `kind` may initialize a value of type `ty`.
///
/// References are resolved later, during validation.
fn literal_fits(kind: LiteralKind, ty: &Type) -> bool {
    match kind {
        LiteralKind::Int => ty.is_int(),
        LiteralKind::Float => ty.is_float(),
        LiteralKind::Bool => ty.is_bool(),
        LiteralKind::String => ty.is_string(),
        LiteralKind::Char => ty.is_char(),
        LiteralKind::Ref => true,
    }
}

/// A struct field or a method parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(rename = "type")]
    pub ty: Type,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Pair>,
}

impl Field {
    pub fn new(ty: Type, name: impl Into<String>) -> Self {
        Self {
            comments: Vec::new(),
            attributes: Vec::new(),
            ty,
            name: name.into(),
            initializer: None,
        }
    }

    pub fn add_attribute(&mut self, attribute: Attribute) -> &mut Self {
        self.attributes.push(attribute);
        self
    }

    pub fn is_collection(&self) -> bool {
        self.ty.is_collection()
    }

    pub fn is_list(&self) -> bool {
        self.ty.is_list()
    }

    pub fn is_map(&self) -> bool {
        self.ty.is_map()
    }

    /// Assign a default value, rejecting literals whose kind cannot
    /// initialize the field's type.
    pub fn set_initializer(&mut self, value: Value) -> Result<(), IdlError> {
        let kind = value.kind();
        if !literal_fits(kind, &self.ty) {
            return Err(self.mismatch(format!("cannot use a {kind} literal")));
        }
        self.initializer = Some(Pair::new(self.name.clone(), value));
        Ok(())
    }

    /// Re-check the initializer against `ctx`, resolving `Name.Value`
    /// references to enum values or const values.
    pub fn check_initializer(&self, ctx: &Idl) -> Result<(), IdlError> {
        let Some(init) = &self.initializer else {
            return Ok(());
        };
        let reference = match &init.value {
            Value::Ref(reference) => reference,
            other => {
                let kind = other.kind();
                if literal_fits(kind, &self.ty) {
                    return Ok(());
                }
                return Err(self.mismatch(format!("cannot use a {kind} literal")));
            }
        };

        let parts: Vec<&str> = reference.split('.').collect();
        let [owner, member] = parts.as_slice() else {
            return Err(IdlError::InvalidReference {
                field: self.name.clone(),
                reference: reference.clone(),
            });
        };

        if let Some(enumeration) = ctx.find_enum(owner) {
            if !self.ty.is_enum(ctx) {
                return Err(self.mismatch(format!(
                    "cannot be initialized with enumeration {}",
                    enumeration.name
                )));
            }
            if !same_name(self.ty.name(), &enumeration.name) {
                return Err(self.mismatch(format!(
                    "initialized with the wrong enumeration {}",
                    enumeration.name
                )));
            }
            if enumeration.find_value(member).is_none() {
                return Err(self.reference_not_found(reference));
            }
            return Ok(());
        }

        if let Some(block) = ctx.find_const(owner) {
            let Some(value) = block.find_value(member) else {
                return Err(self.reference_not_found(reference));
            };
            let kind = value.kind();
            if kind == LiteralKind::Ref || !literal_fits(kind, &self.ty) {
                return Err(self.mismatch(format!(
                    "constant {}.{} is a {kind}",
                    block.name, value.name
                )));
            }
            return Ok(());
        }

        Err(self.reference_not_found(reference))
    }

    fn mismatch(&self, detail: String) -> IdlError {
        IdlError::InitializerTypeMismatch {
            field: self.name.clone(),
            ty: self.ty.to_string(),
            detail,
        }
    }

    fn reference_not_found(&self, reference: &str) -> IdlError {
        IdlError::InitializerReferenceNotFound {
            field: self.name.clone(),
            reference: reference.to_string(),
        }
    }
}

/// A data model. `extends` names the parent and is resolved lazily.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Struct {
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
}

impl Struct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_field(&mut self, ty: Type, name: impl Into<String>) -> Result<&mut Field, IdlError> {
        let name = name.into();
        if self.fields.iter().any(|f| same_name(&f.name, &name)) {
            return Err(IdlError::Redefined {
                kind: DefinitionKind::Field,
                scope: format!("struct {}", self.name),
                name,
            });
        }
        let index = self.fields.len();
        self.fields.push(Field::new(ty, name));
        Ok(&mut self.fields[index])
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| same_name(&f.name, name))
    }

    /// Ancestors of this struct, ordered from the root of the chain down.
    pub fn base_classes<'a>(&self, ctx: &'a Idl) -> Result<Vec<&'a Struct>, IdlError> {
        let mut chain: Vec<&'a Struct> = Vec::new();
        let mut base = self.extends.as_deref();
        while let Some(name) = base {
            if same_name(name, &self.name) || chain.iter().any(|s| same_name(&s.name, name)) {
                return Err(IdlError::InheritanceCycle {
                    name: name.to_string(),
                });
            }
            let parent = ctx.find_struct(name).ok_or_else(|| IdlError::ParentNotFound {
                name: name.to_string(),
            })?;
            chain.push(parent);
            base = parent.extends.as_deref();
        }
        chain.reverse();
        Ok(chain)
    }

    /// Direct children of this struct within `ctx` and its unique imports.
    ///
    /// Only loaded documents are visible; files that import this one
    /// without being imported themselves are not searched.
    pub fn sub_classes<'a>(&self, ctx: &'a Idl) -> Vec<&'a Struct> {
        ctx.all_structs()
            .into_iter()
            .filter(|s| s.extends.as_deref().is_some_and(|e| same_name(e, &self.name)))
            .collect()
    }
}

/// A service operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    pub returns: Type,
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Field>,
}

impl Method {
    pub fn new(returns: Type, name: impl Into<String>) -> Self {
        Self {
            comments: Vec::new(),
            attributes: Vec::new(),
            returns,
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    pub fn add_attribute(&mut self, attribute: Attribute) -> &mut Self {
        self.attributes.push(attribute);
        self
    }

    pub fn add_parameter(
        &mut self,
        ty: Type,
        name: impl Into<String>,
    ) -> Result<&mut Field, IdlError> {
        let name = name.into();
        if self.parameters.iter().any(|p| same_name(&p.name, &name)) {
            return Err(IdlError::Redefined {
                kind: DefinitionKind::Parameter,
                scope: format!("method {}", self.name),
                name,
            });
        }
        let index = self.parameters.len();
        self.parameters.push(Field::new(ty, name));
        Ok(&mut self.parameters[index])
    }
}

/// A web service interface.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    pub name: String,
    #[serde(default)]
    pub methods: Vec<Method>,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_method(
        &mut self,
        returns: Type,
        name: impl Into<String>,
    ) -> Result<&mut Method, IdlError> {
        let name = name.into();
        if self.methods.iter().any(|m| same_name(&m.name, &name)) {
            return Err(IdlError::Redefined {
                kind: DefinitionKind::Method,
                scope: format!("service {}", self.name),
                name,
            });
        }
        let index = self.methods.len();
        self.methods.push(Method::new(returns, name));
        Ok(&mut self.methods[index])
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| same_name(&m.name, name))
    }
}
