//! # Babel REST
//!
//! Typed REST bindings for Babel services. Method and parameter attributes
//! in the `rest` scope are loose name/value bags; this crate reads them into
//! strongly typed records that a gateway can route on.
//!
//! ```text
//! Method.attributes ──read_op──▶ Operation { path, method, responses{code → Response} }
//!                                   Response { type, desc, headers{name → Header} }
//! Field.attributes  ──read_parm─▶ Parm { in, required, format, name }
//!
//! "map<string, list<int32>>" ──parse_type──▶ Type
//! ["1,2,3"] + list<int32> + CSV ──coerce──▶ [1, 2, 3]
//! ```

pub mod binder;
pub mod coerce;
pub mod error;
pub mod parse_type;
pub mod types;

pub use binder::{
    MethodBinding, ParameterBinding, REST_SCOPE, bind_method, bind_service, read_op, read_parm,
};
pub use coerce::coerce;
pub use error::{CoerceError, RestError};
pub use parse_type::parse_type;
pub use types::{Header, HttpMethod, ListFormat, Operation, Parm, ParmIn, Response, ResponseCode};
