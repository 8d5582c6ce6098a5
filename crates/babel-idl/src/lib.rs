//! # Babel IDL
//!
//! The semantic core of the Babel RPC compiler: a parser builds one [`Idl`]
//! per source file, wires the files together through imports, and this
//! crate checks that the resulting definition graph is consistent before
//! any generator, exporter, or gateway reads it.
//!
//! It never touches files or renders code; every failure is an
//! [`IdlError`] value.
//!
//! ## Architecture
//!
//! ```text
//! Value / Pair          ← Literals with their own kind
//!     │
//! Type                  ← primitive | list<V> | map<K,V> | user-defined | void
//!     │
//! Const, Enum, Struct,  ← Definitions; names unique per scope
//! Service, Method, Field
//!     │
//! Idl                   ← One document, its imports and namespaces
//!     │
//! Validator             ← collisions → structs → services → types → namespaces
//!     │
//! ValidatedIdl          ← Read-only view handed to consumers
//! ```

pub mod definitions;
pub mod diagnostic;
pub mod error;
pub mod idl;
pub mod namespace;
pub mod types;
pub mod validate;
pub mod value;

pub use definitions::{Attribute, Const, Enum, Field, Method, Service, Struct};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{DefinitionKind, IdlError};
pub use idl::{Idl, clean_path};
pub use namespace::{DEFAULT_NAMESPACE_KEY, LANGUAGES, TEST_LANGUAGE, derive_default_namespaces};
pub use types::{Primitive, Type, TypeKind};
pub use validate::{ValidatedIdl, Validator};
pub use value::{LiteralKind, Pair, Value};
