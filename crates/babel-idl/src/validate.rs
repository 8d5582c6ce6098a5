//! Whole-tree validation.
//!
//! ```text
//!   pass          scope                      rejects
//!   ------------  -------------------------  ----------------------------------
//!   collisions    root + imports, merged     reused top-level names
//!   structs       each document on its own   cycles, shadowed fields, abstract
//!                                            fields, bad initializers
//!   services      each document on its own   abstract returns/parameters,
//!                                            non-trailing defaults
//!   types         each document on its own   unresolved type names, void
//!                                            outside a method return
//!   namespaces    every document             missing namespace for the language
//! ```
//!
//! Passes run in that order and the first failure is returned.

use crate::definitions::{Service, Struct};
use crate::error::{DefinitionKind, IdlError};
use crate::idl::Idl;
use crate::namespace::TEST_LANGUAGE;
use std::collections::BTreeSet;
use std::ops::Deref;
use tracing::debug;

/// Runs the validation passes over one assembled tree.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    root: &'a Idl,
    language: &'a str,
}

impl<'a> Validator<'a> {
    pub fn new(root: &'a Idl, language: &'a str) -> Self {
        Self { root, language }
    }

    pub fn run(&self) -> Result<(), IdlError> {
        let documents = self.root.documents();
        debug!(
            root = %self.root.filename,
            documents = documents.len(),
            language = self.language,
            "validating idl tree"
        );

        self.check_collisions(&documents)?;
        for doc in &documents {
            check_structs(doc)?;
        }
        for doc in &documents {
            check_services(doc)?;
        }
        for doc in &documents {
            check_types(doc)?;
        }
        self.check_namespaces(&documents)?;

        debug!(root = %self.root.filename, "idl tree is valid");
        Ok(())
    }

    fn check_collisions(&self, documents: &[&Idl]) -> Result<(), IdlError> {
        let mut seen = BTreeSet::new();
        for doc in documents {
            let names = doc
                .consts
                .iter()
                .map(|c| (DefinitionKind::Const, &c.name))
                .chain(doc.enums.iter().map(|e| (DefinitionKind::Enum, &e.name)))
                .chain(doc.structs.iter().map(|s| (DefinitionKind::Struct, &s.name)))
                .chain(
                    doc.services
                        .iter()
                        .map(|s| (DefinitionKind::Service, &s.name)),
                );
            for (kind, name) in names {
                if !seen.insert(name.to_lowercase()) {
                    return Err(IdlError::NameCollision {
                        kind,
                        name: name.clone(),
                        file: doc.filename.clone(),
                    });
                }
            }
        }
        debug!(names = seen.len(), "collision pass done");
        Ok(())
    }

    fn check_namespaces(&self, documents: &[&Idl]) -> Result<(), IdlError> {
        if self.language == TEST_LANGUAGE {
            return Ok(());
        }
        match documents
            .iter()
            .find(|doc| doc.namespace(self.language).is_none())
        {
            Some(doc) => Err(IdlError::NamespaceMissing {
                language: self.language.to_string(),
                file: doc.filename.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn check_structs(ctx: &Idl) -> Result<(), IdlError> {
    for s in &ctx.structs {
        check_struct(ctx, s)?;
    }
    Ok(())
}

fn check_struct(ctx: &Idl, s: &Struct) -> Result<(), IdlError> {
    let mut fields = BTreeSet::new();
    for f in &s.fields {
        fields.insert(f.name.to_lowercase());
        if f.ty.is_abstract(ctx) {
            return Err(IdlError::AbstractField {
                strukt: s.name.clone(),
                field: f.name.clone(),
            });
        }
        f.check_initializer(ctx)?;
    }

    let mut lineage = BTreeSet::from([s.name.to_lowercase()]);
    let mut base = s.extends.as_deref();
    while let Some(name) = base {
        if !lineage.insert(name.to_lowercase()) {
            return Err(IdlError::InheritanceCycle {
                name: name.to_string(),
            });
        }
        let parent = ctx.find_struct(name).ok_or_else(|| IdlError::ParentNotFound {
            name: name.to_string(),
        })?;
        for f in &parent.fields {
            if !fields.insert(f.name.to_lowercase()) {
                return Err(IdlError::FieldShadowed {
                    ancestor: parent.name.clone(),
                    field: f.name.clone(),
                    child: s.name.clone(),
                });
            }
        }
        base = parent.extends.as_deref();
    }
    Ok(())
}

fn check_services(ctx: &Idl) -> Result<(), IdlError> {
    for s in &ctx.services {
        check_service(ctx, s)?;
    }
    Ok(())
}

fn check_service(ctx: &Idl, s: &Service) -> Result<(), IdlError> {
    for m in &s.methods {
        if m.returns.is_abstract(ctx) {
            return Err(IdlError::AbstractReturn {
                service: s.name.clone(),
                method: m.name.clone(),
            });
        }
        let mut defaults_started = false;
        for p in &m.parameters {
            if p.ty.is_abstract(ctx) {
                return Err(IdlError::AbstractParameter {
                    service: s.name.clone(),
                    method: m.name.clone(),
                    parameter: p.name.clone(),
                });
            }
            match &p.initializer {
                Some(_) => {
                    defaults_started = true;
                    p.check_initializer(ctx)?;
                }
                None if defaults_started => {
                    return Err(IdlError::TrailingDefaults {
                        service: s.name.clone(),
                        method: m.name.clone(),
                        parameter: p.name.clone(),
                    });
                }
                None => {}
            }
        }
    }
    Ok(())
}

fn check_types(ctx: &Idl) -> Result<(), IdlError> {
    for s in &ctx.structs {
        for f in &s.fields {
            if f.ty.is_void() {
                return Err(IdlError::MisplacedVoid {
                    position: format!("field {}.{}", s.name, f.name),
                });
            }
            f.ty.check(ctx)?;
        }
    }
    for s in &ctx.services {
        for m in &s.methods {
            for p in &m.parameters {
                if p.ty.is_void() {
                    return Err(IdlError::MisplacedVoid {
                        position: format!("parameter {} of method {}.{}", p.name, s.name, m.name),
                    });
                }
                p.ty.check(ctx)?;
            }
            m.returns.check(ctx)?;
        }
    }
    Ok(())
}

impl Idl {
    /// Validate this tree for `language`. The tree must be fully assembled.
    pub fn validate(&self, language: &str) -> Result<(), IdlError> {
        Validator::new(self, language).run()
    }

    /// Validate and freeze this tree. The result only hands out shared
    /// references, so nothing can be added after validation.
    pub fn seal(self, language: &str) -> Result<ValidatedIdl, IdlError> {
        self.validate(language)?;
        Ok(ValidatedIdl {
            idl: self,
            language: language.to_string(),
        })
    }
}

/// A tree that passed [`Idl::validate`].
#[derive(Debug, Clone)]
pub struct ValidatedIdl {
    idl: Idl,
    language: String,
}

impl ValidatedIdl {
    pub fn idl(&self) -> &Idl {
        &self.idl
    }

    /// Language the tree was validated for.
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn into_inner(self) -> Idl {
        self.idl
    }
}

impl Deref for ValidatedIdl {
    type Target = Idl;

    fn deref(&self) -> &Idl {
        &self.idl
    }
}

impl serde::Serialize for ValidatedIdl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.idl.serialize(serializer)
    }
}
