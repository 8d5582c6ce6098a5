//! Coercion of raw request strings into JSON values matching a [`Type`].
//!
//! `int64` stays a string so that JSON consumers with 53-bit numbers do not
//! lose precision. Only scalars, enums, and lists of scalars are supported.

use crate::error::CoerceError;
use crate::types::ListFormat;
use babel_idl::{Idl, Primitive, Type};
use serde_json::{Number, Value as Json};

fn first<S: AsRef<str>>(values: &[S]) -> &str {
    values.first().map_or("", |v| AsRef::<str>::as_ref(v))
}

fn parse_bool(raw: &str) -> Result<bool, CoerceError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(CoerceError::InvalidBool {
            value: raw.to_string(),
        }),
    }
}

fn parse_int(p: Primitive, raw: &str) -> Result<Json, CoerceError> {
    let invalid = || CoerceError::InvalidInt {
        ty: p,
        value: raw.to_string(),
    };
    let n = match p {
        Primitive::Byte => raw.parse::<u8>().map(i64::from),
        Primitive::Int8 => raw.parse::<i8>().map(i64::from),
        Primitive::Int16 => raw.parse::<i16>().map(i64::from),
        Primitive::Int32 => raw.parse::<i32>().map(i64::from),
        _ => return Err(invalid()),
    }
    .map_err(|_| invalid())?;
    Ok(Json::from(n))
}

fn parse_float(raw: &str) -> Result<Json, CoerceError> {
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Json::Number)
        .ok_or_else(|| CoerceError::InvalidFloat {
            value: raw.to_string(),
        })
}

fn unexpected(ty: &Type) -> CoerceError {
    CoerceError::UnexpectedType { ty: ty.to_string() }
}

/// Coerce `values` to `ty`.
///
/// Scalars read the first value (an absent value reads as the empty
/// string). A list splits the first value on the delimiter of `format`, or
/// with [`ListFormat::Multi`] takes every value as one element.
pub fn coerce<S: AsRef<str>>(
    ctx: &Idl,
    ty: &Type,
    values: &[S],
    format: ListFormat,
) -> Result<Json, CoerceError> {
    if let Some(p) = ty.as_primitive() {
        let raw = first(values);
        return match p {
            Primitive::Bool => parse_bool(raw).map(Json::Bool),
            Primitive::Int64 => Ok(Json::String(raw.to_string())),
            Primitive::Byte | Primitive::Int8 | Primitive::Int16 | Primitive::Int32 => {
                parse_int(p, raw)
            }
            Primitive::Float32 | Primitive::Float64 => parse_float(raw),
            Primitive::String
            | Primitive::Char
            | Primitive::Datetime
            | Primitive::Decimal
            | Primitive::Binary => Ok(Json::String(raw.to_string())),
        };
    }

    if let Some(element) = ty.value_type().filter(|_| ty.is_list()) {
        if !element.is_primitive() {
            return Err(unexpected(ty));
        }
        let items: Vec<&str> = match (format, format.separator()) {
            (_, Some(sep)) => first(values).split(sep).collect(),
            (ListFormat::Multi, None) => values.iter().map(|v| AsRef::<str>::as_ref(v)).collect(),
            _ => return Err(CoerceError::MissingListFormat),
        };
        return items
            .into_iter()
            .map(|item| coerce(ctx, element, &[item], ListFormat::None))
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array);
    }

    if ty.is_enum(ctx) {
        return Ok(Json::String(first(values).to_string()));
    }
    Err(unexpected(ty))
}
