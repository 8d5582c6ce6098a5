//! The per-file document tree and import resolution.
//!
//! An [`Idl`] is built once by a parser through its `add_*` methods, wired
//! to its imports, and then validated. Imports form a DAG that may repeat
//! the same file along different branches; [`Idl::unique_imports`]
//! flattens it so every file is visited once.

use crate::definitions::{Const, Enum, Service, Struct, same_name};
use crate::error::{DefinitionKind, IdlError};
use crate::namespace::{DEFAULT_NAMESPACE_KEY, derive_default_namespaces};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Lexically normalize a slash-separated path: collapse repeated
/// separators, drop `.` segments, and resolve `..` where possible.
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Parse tree of one IDL source file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Idl {
    #[serde(default)]
    pub comments: Vec<String>,
    pub filename: String,
    #[serde(default)]
    pub imports: Vec<Idl>,
    #[serde(default)]
    pub namespaces: BTreeMap<String, String>,
    #[serde(default)]
    pub consts: Vec<Const>,
    #[serde(default)]
    pub enums: Vec<Enum>,
    #[serde(default)]
    pub structs: Vec<Struct>,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl Idl {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    fn redefined(&self, kind: DefinitionKind, name: String) -> IdlError {
        IdlError::Redefined {
            kind,
            scope: format!("\"{}\"", self.filename),
            name,
        }
    }

    fn ensure_not_imported(&self, path: &str) -> Result<(), IdlError> {
        if self.imports.iter().any(|i| same_name(&i.filename, path)) {
            return Err(IdlError::DuplicateImport {
                path: path.to_string(),
            });
        }
        Ok(())
    }

    /// Register an import of `path` and return the new, empty child node
    /// for the parser to fill in.
    pub fn add_import(&mut self, path: &str) -> Result<&mut Idl, IdlError> {
        let cleaned = clean_path(path);
        self.ensure_not_imported(&cleaned)?;
        let index = self.imports.len();
        self.imports.push(Idl::new(cleaned));
        Ok(&mut self.imports[index])
    }

    /// Attach an already-assembled document as an import.
    pub fn attach_import(&mut self, mut child: Idl) -> Result<&mut Idl, IdlError> {
        child.filename = clean_path(&child.filename);
        self.ensure_not_imported(&child.filename)?;
        let index = self.imports.len();
        self.imports.push(child);
        Ok(&mut self.imports[index])
    }

    /// Set an explicit namespace for one language.
    ///
    /// Redeclaring a language is an error unless a default namespace was
    /// declared, in which case the explicit value replaces the derived one.
    pub fn add_namespace(&mut self, language: &str, namespace: &str) -> Result<(), IdlError> {
        if self.namespaces.contains_key(language)
            && !self.namespaces.contains_key(DEFAULT_NAMESPACE_KEY)
        {
            return Err(IdlError::NamespaceRedefined {
                language: language.to_string(),
            });
        }
        self.namespaces
            .insert(language.to_string(), namespace.trim().to_string());
        Ok(())
    }

    /// Derive a namespace for every supported language from a domain and a
    /// path. Languages with an explicit namespace keep it.
    pub fn add_default_namespace(&mut self, domain: &str, namespace: &str) -> Result<(), IdlError> {
        if self.namespaces.contains_key(DEFAULT_NAMESPACE_KEY) {
            return Err(IdlError::DefaultNamespaceRedefined);
        }
        let derived = derive_default_namespaces(domain, namespace)?;
        self.namespaces.insert(
            DEFAULT_NAMESPACE_KEY.to_string(),
            format!("{}/{}", domain.trim(), namespace.trim()),
        );
        for (language, value) in derived {
            self.namespaces.entry(language.to_string()).or_insert(value);
        }
        Ok(())
    }

    /// Namespace declared or derived for `language`, if non-empty.
    pub fn namespace(&self, language: &str) -> Option<&str> {
        self.namespaces
            .get(language)
            .map(String::as_str)
            .filter(|ns| !ns.is_empty())
    }

    pub fn add_const(&mut self, name: &str) -> Result<&mut Const, IdlError> {
        if self.consts.iter().any(|c| same_name(&c.name, name)) {
            return Err(self.redefined(DefinitionKind::Const, name.to_string()));
        }
        let index = self.consts.len();
        self.consts.push(Const::new(name));
        Ok(&mut self.consts[index])
    }

    pub fn add_enum(&mut self, name: &str) -> Result<&mut Enum, IdlError> {
        if self.enums.iter().any(|e| same_name(&e.name, name)) {
            return Err(self.redefined(DefinitionKind::Enum, name.to_string()));
        }
        let index = self.enums.len();
        self.enums.push(Enum::new(name));
        Ok(&mut self.enums[index])
    }

    pub fn add_struct(&mut self, name: &str) -> Result<&mut Struct, IdlError> {
        if self.structs.iter().any(|s| same_name(&s.name, name)) {
            return Err(self.redefined(DefinitionKind::Struct, name.to_string()));
        }
        let index = self.structs.len();
        self.structs.push(Struct::new(name));
        Ok(&mut self.structs[index])
    }

    pub fn add_service(&mut self, name: &str) -> Result<&mut Service, IdlError> {
        if self.services.iter().any(|s| same_name(&s.name, name)) {
            return Err(self.redefined(DefinitionKind::Service, name.to_string()));
        }
        let index = self.services.len();
        self.services.push(Service::new(name));
        Ok(&mut self.services[index])
    }

    /// Search this document, then its imports depth-first.
    pub fn find_const(&self, name: &str) -> Option<&Const> {
        self.consts
            .iter()
            .find(|c| same_name(&c.name, name))
            .or_else(|| self.imports.iter().find_map(|i| i.find_const(name)))
    }

    pub fn find_enum(&self, name: &str) -> Option<&Enum> {
        self.enums
            .iter()
            .find(|e| same_name(&e.name, name))
            .or_else(|| self.imports.iter().find_map(|i| i.find_enum(name)))
    }

    pub fn find_struct(&self, name: &str) -> Option<&Struct> {
        self.structs
            .iter()
            .find(|s| same_name(&s.name, name))
            .or_else(|| self.imports.iter().find_map(|i| i.find_struct(name)))
    }

    pub fn find_service(&self, name: &str) -> Option<&Service> {
        self.services
            .iter()
            .find(|s| same_name(&s.name, name))
            .or_else(|| self.imports.iter().find_map(|i| i.find_service(name)))
    }

    fn defines(&self, name: &str) -> bool {
        self.structs.iter().any(|x| same_name(&x.name, name))
            || self.enums.iter().any(|x| same_name(&x.name, name))
            || self.consts.iter().any(|x| same_name(&x.name, name))
            || self.services.iter().any(|x| same_name(&x.name, name))
    }

    /// Namespace, for `language`, of the document that defines the
    /// top-level identifier `name`.
    pub fn namespace_of(&self, name: &str, language: &str) -> Option<&str> {
        if self.defines(name) {
            return self.namespace(language);
        }
        self.imports
            .iter()
            .find_map(|i| i.namespace_of(name, language))
    }

    /// Every imported document reachable from this one, each file once.
    ///
    /// Files are identified by lower-cased filename; the order is the
    /// depth-first order of first appearance. The root is not included.
    pub fn unique_imports(&self) -> Vec<&Idl> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        self.collect_imports(&mut seen, &mut out);
        out
    }

    fn collect_imports<'a>(&'a self, seen: &mut BTreeSet<String>, out: &mut Vec<&'a Idl>) {
        for import in &self.imports {
            if seen.insert(import.filename.to_lowercase()) {
                out.push(import);
                import.collect_imports(seen, out);
            } else {
                trace!(file = %import.filename, parent = %self.filename, "import already visited");
            }
        }
    }

    /// Distinct non-empty namespaces for `language`, imports first.
    pub fn unique_namespaces(&self, language: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for import in &self.imports {
            for ns in import.unique_namespaces(language) {
                if !out.contains(&ns) {
                    out.push(ns);
                }
            }
        }
        if let Some(ns) = self.namespace(language)
            && !out.contains(&ns)
        {
            out.push(ns);
        }
        out
    }

    /// Canonical type strings used in this document: first those of
    /// structs (including the struct names), then those of services.
    pub fn unique_types(&self) -> (Vec<String>, Vec<String>) {
        fn push_unique(list: &mut Vec<String>, item: String) {
            if !list.contains(&item) {
                list.push(item);
            }
        }

        let mut struct_types = Vec::new();
        for s in &self.structs {
            push_unique(&mut struct_types, s.name.clone());
            for f in &s.fields {
                push_unique(&mut struct_types, f.ty.to_string());
            }
        }

        let mut service_types = Vec::new();
        for s in &self.services {
            for m in &s.methods {
                for p in &m.parameters {
                    push_unique(&mut service_types, p.ty.to_string());
                }
                push_unique(&mut service_types, m.returns.to_string());
            }
        }
        (struct_types, service_types)
    }

    /// This document followed by every unique import.
    pub fn documents(&self) -> Vec<&Idl> {
        let mut docs = vec![self];
        docs.extend(self.unique_imports());
        docs
    }

    pub fn all_structs(&self) -> Vec<&Struct> {
        self.documents()
            .into_iter()
            .flat_map(|d| d.structs.iter())
            .collect()
    }

    pub fn all_enums(&self) -> Vec<&Enum> {
        self.documents()
            .into_iter()
            .flat_map(|d| d.enums.iter())
            .collect()
    }

    pub fn all_services(&self) -> Vec<&Service> {
        self.documents()
            .into_iter()
            .flat_map(|d| d.services.iter())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    #[test]
    fn clean_path_normalizes_lexically() {
        assert_eq!(clean_path("a//b/./c"), "a/b/c");
        assert_eq!(clean_path("a/b/../c"), "a/c");
        assert_eq!(clean_path("../x"), "../x");
        assert_eq!(clean_path("/../x/"), "/x");
        assert_eq!(clean_path(""), ".");
    }

    #[test]
    fn add_import_rejects_double_import_case_insensitively() {
        let mut root = Idl::new("root.babel");
        root.add_import("./common/Types.babel").expect("first import");
        let err = root
            .add_import("common/types.babel")
            .expect_err("second import must fail");
        assert_eq!(
            err,
            IdlError::DuplicateImport {
                path: "common/types.babel".to_string()
            }
        );
        assert_eq!(root.imports[0].filename, "common/Types.babel");
    }

    #[test]
    fn unique_imports_visits_diamond_once() {
        let mut a = Idl::new("a.babel");
        {
            let b = a.add_import("b.babel").expect("b");
            b.add_import("d.babel").expect("d under b");
        }
        {
            let c = a.add_import("c.babel").expect("c");
            c.add_import("D.babel").expect("d under c");
        }
        let names: Vec<&str> = a
            .unique_imports()
            .iter()
            .map(|i| i.filename.as_str())
            .collect();
        assert_eq!(names, vec!["b.babel", "d.babel", "c.babel"]);
    }

    #[test]
    fn default_namespace_never_overwrites_explicit() {
        let mut idl = Idl::new("a.babel");
        idl.add_namespace("java", "org.example.custom").expect("explicit");
        idl.add_default_namespace("company.com", "Foo/Bar")
            .expect("default");
        assert_eq!(idl.namespace("java"), Some("org.example.custom"));
        assert_eq!(idl.namespace("csharp"), Some("Company.Foo.Bar"));
        assert_eq!(
            idl.namespaces.get(DEFAULT_NAMESPACE_KEY).map(String::as_str),
            Some("company.com/Foo/Bar")
        );
        assert_eq!(
            idl.add_default_namespace("other.com", "X"),
            Err(IdlError::DefaultNamespaceRedefined)
        );
    }

    #[test]
    fn explicit_namespace_may_replace_a_derived_one() {
        let mut idl = Idl::new("a.babel");
        idl.add_namespace("go", "example.com/a").expect("first");
        assert!(matches!(
            idl.add_namespace("go", "example.com/b"),
            Err(IdlError::NamespaceRedefined { .. })
        ));

        let mut derived = Idl::new("b.babel");
        derived
            .add_default_namespace("company.com", "Foo")
            .expect("default");
        derived.add_namespace("go", " example.com/foo ").expect("override");
        assert_eq!(derived.namespace("go"), Some("example.com/foo"));
    }

    #[test]
    fn failed_default_namespace_leaves_map_untouched() {
        let mut idl = Idl::new("a.babel");
        assert!(idl.add_default_namespace("nodots", "Foo").is_err());
        assert!(idl.namespaces.is_empty());
    }

    #[test]
    fn namespace_of_finds_defining_document() {
        let mut root = Idl::new("root.babel");
        root.add_namespace("go", "example.com/root").expect("ns");
        root.add_struct("Local").expect("struct");
        {
            let dep = root.add_import("dep.babel").expect("import");
            dep.add_namespace("go", "example.com/dep").expect("ns");
            dep.add_enum("Remote").expect("enum");
        }
        assert_eq!(root.namespace_of("local", "go"), Some("example.com/root"));
        assert_eq!(root.namespace_of("REMOTE", "go"), Some("example.com/dep"));
        assert_eq!(root.namespace_of("Nowhere", "go"), None);
    }

    #[test]
    fn unique_namespaces_lists_imports_before_root() {
        let mut root = Idl::new("root.babel");
        root.add_namespace("js", "app").expect("ns");
        root.add_import("x.babel")
            .expect("x")
            .add_namespace("js", "lib")
            .expect("ns");
        root.add_import("y.babel")
            .expect("y")
            .add_namespace("js", "lib")
            .expect("ns");
        assert_eq!(root.unique_namespaces("js"), vec!["lib", "app"]);
    }

    #[test]
    fn unique_types_splits_struct_and_service_usage() {
        let mut idl = Idl::new("a.babel");
        {
            let s = idl.add_struct("Item").expect("struct");
            s.add_field(Type::named("string"), "name").expect("field");
            s.add_field(Type::list(Type::named("int32")), "sizes")
                .expect("field");
        }
        {
            let svc = idl.add_service("Shop").expect("service");
            let m = svc
                .add_method(Type::named("Item"), "get")
                .expect("method");
            m.add_parameter(Type::named("string"), "id").expect("parm");
        }
        let (structs, services) = idl.unique_types();
        assert_eq!(structs, vec!["Item", "string", "list<int32>"]);
        assert_eq!(services, vec!["string", "Item"]);
    }

    #[test]
    fn top_level_redefinition_names_the_file() {
        let mut idl = Idl::new("shop.babel");
        idl.add_struct("Item").expect("first");
        let err = idl.add_struct("ITEM").expect_err("duplicate");
        insta::assert_snapshot!(err.to_string(), @r#"struct "ITEM" redefined in "shop.babel""#);
    }
}
