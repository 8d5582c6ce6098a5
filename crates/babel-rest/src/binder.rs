//! Reads `rest`-scoped attributes into typed bindings.
//!
//! On a method, `Op`, `Response` and `Header` are recognized; on a method
//! parameter only `Parm` is. Attributes from other scopes, and unknown
//! attribute names within the `rest` scope, are left for other tools.

use crate::error::RestError;
use crate::parse_type::parse_type;
use crate::types::{Header, HttpMethod, ListFormat, Operation, Parm, ParmIn, Response, ResponseCode};
use babel_idl::{Attribute, Field, Method, Pair, Service, Type, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub const REST_SCOPE: &str = "rest";

const METHOD_NAMES: &str = "a string with value GET, PUT, POST, DELETE, OPTIONS, HEAD, or PATCH";
const FORMAT_NAMES: &str = "a string with value csv, ssv, tsv, pipes, or multi";
const IN_NAMES: &str = "a string with value query, header, path, formData, or body";
const TYPE_STRING: &str = "a string with a valid Babel type";

fn mismatch(attribute: &'static str, parameter: &'static str, expected: &'static str) -> RestError {
    RestError::DataTypeMismatch {
        attribute,
        parameter,
        expected,
    }
}

fn string_of<'a>(
    pair: &'a Pair,
    attribute: &'static str,
    parameter: &'static str,
    expected: &'static str,
) -> Result<&'a str, RestError> {
    match &pair.value {
        Value::String(s) => Ok(s),
        _ => Err(mismatch(attribute, parameter, expected)),
    }
}

fn bool_of(pair: &Pair, attribute: &'static str, parameter: &'static str) -> Result<bool, RestError> {
    match pair.value {
        Value::Bool(b) => Ok(b),
        _ => Err(mismatch(attribute, parameter, "a bool")),
    }
}

fn format_of(pair: &Pair, attribute: &'static str) -> Result<ListFormat, RestError> {
    let raw = string_of(pair, attribute, "Format", FORMAT_NAMES)?;
    ListFormat::from_name(raw).ok_or_else(|| mismatch(attribute, "Format", FORMAT_NAMES))
}

fn require_list(attribute: &'static str, format: ListFormat, ty: &Type) -> Result<(), RestError> {
    if format != ListFormat::None && !ty.is_list() {
        return Err(RestError::FormatRequiresList {
            attribute,
            ty: ty.to_string(),
        });
    }
    Ok(())
}

fn rest_attributes(attributes: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attributes.iter().filter(|a| a.scope == REST_SCOPE)
}

fn apply_op(op: &mut Operation, attribute: &Attribute) -> Result<(), RestError> {
    for p in &attribute.parameters {
        match p.name.as_str() {
            "Path" => op.path = string_of(p, "Op", "Path", "a string")?.to_string(),
            "Method" => {
                let raw = string_of(p, "Op", "Method", METHOD_NAMES)?;
                op.method =
                    HttpMethod::from_name(raw).ok_or_else(|| mismatch("Op", "Method", METHOD_NAMES))?;
            }
            "Deprecated" => op.deprecated = bool_of(p, "Op", "Deprecated")?,
            "Hide" => op.hide = bool_of(p, "Op", "Hide")?,
            other => {
                return Err(RestError::UnknownParameter {
                    attribute: "Op",
                    parameter: other.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// A response read from its attribute, before its header names are resolved.
struct PendingResponse {
    code: ResponseCode,
    response: Response,
    header_names: Vec<String>,
}

fn read_response(method: &Method, attribute: &Attribute) -> Result<PendingResponse, RestError> {
    let mut code = None;
    let mut response = Response::new(method.returns.clone());
    let mut header_names = Vec::new();
    for p in &attribute.parameters {
        match p.name.as_str() {
            "Code" => match p.value {
                Value::Int(i) => code = Some(ResponseCode::from_code(i)),
                _ => return Err(mismatch("Response", "Code", "an int")),
            },
            "Type" => {
                let raw = string_of(p, "Response", "Type", TYPE_STRING)?;
                if !raw.trim().is_empty() {
                    response.ty = parse_type(raw)?;
                }
            }
            "Desc" => response.desc = string_of(p, "Response", "Desc", "a string")?.to_string(),
            "Headers" => {
                let raw = string_of(
                    p,
                    "Response",
                    "Headers",
                    "a string containing a comma-separated list of header names",
                )?;
                header_names = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            other => {
                return Err(RestError::UnknownParameter {
                    attribute: "Response",
                    parameter: other.to_string(),
                });
            }
        }
    }
    let code = code.ok_or(RestError::ResponseCodeMissing)?;
    Ok(PendingResponse {
        code,
        response,
        header_names,
    })
}

fn read_header(attribute: &Attribute) -> Result<(String, Header), RestError> {
    let mut name = String::new();
    let mut ty = None;
    let mut desc = String::new();
    let mut format = ListFormat::None;
    for p in &attribute.parameters {
        match p.name.as_str() {
            "Name" => name = string_of(p, "Header", "Name", "a string")?.to_string(),
            "Type" => ty = Some(parse_type(string_of(p, "Header", "Type", TYPE_STRING)?)?),
            "Desc" => desc = string_of(p, "Header", "Desc", "a string")?.to_string(),
            "Format" => format = format_of(p, "Header")?,
            other => {
                return Err(RestError::UnknownParameter {
                    attribute: "Header",
                    parameter: other.to_string(),
                });
            }
        }
    }
    if name.is_empty() {
        return Err(RestError::HeaderNameMissing);
    }
    let ty = ty.ok_or(RestError::HeaderTypeMissing)?;
    if ty.is_void() {
        return Err(RestError::VoidHeader { name });
    }
    require_list("Header", format, &ty)?;
    Ok((name, Header { ty, desc, format }))
}

/// Read the operation bound to `method`.
///
/// Without any `Op` or `Response` attribute the operation is `GET /` with a
/// single 200 response of the method's return type.
pub fn read_op(method: &Method) -> Result<Operation, RestError> {
    let mut op = Operation::default();
    let mut seen_op = false;
    let mut pending = Vec::new();
    let mut headers = BTreeMap::new();

    for attribute in rest_attributes(&method.attributes) {
        match attribute.name.as_str() {
            "Op" => {
                if seen_op {
                    return Err(RestError::MultipleOps);
                }
                seen_op = true;
                apply_op(&mut op, attribute)?;
            }
            "Response" => {
                let response = read_response(method, attribute)?;
                if pending
                    .iter()
                    .any(|r: &PendingResponse| r.code == response.code)
                {
                    return Err(RestError::ResponseCodeDuplicate {
                        code: response.code,
                        method: method.name.clone(),
                    });
                }
                pending.push(response);
            }
            "Header" => {
                let (name, header) = read_header(attribute)?;
                headers.insert(name, header);
            }
            "Parm" => {
                return Err(RestError::MisplacedAttribute {
                    attribute: attribute.name.clone(),
                    target: "method definition",
                });
            }
            _ => {}
        }
    }

    if pending.is_empty() {
        op.responses
            .insert(ResponseCode::Code(200), Response::new(method.returns.clone()));
    }
    for PendingResponse {
        code,
        mut response,
        header_names,
    } in pending
    {
        for name in header_names {
            let header = headers
                .get(&name)
                .cloned()
                .ok_or_else(|| RestError::HeaderUndefined { name: name.clone() })?;
            response.headers.insert(name, header);
        }
        op.responses.insert(code, response);
    }

    debug!(
        method = %method.name,
        verb = %op.method,
        path = %op.path,
        responses = op.responses.len(),
        "read rest operation"
    );
    Ok(op)
}

/// Read the binding of one method parameter.
pub fn read_parm(field: &Field) -> Result<Parm, RestError> {
    let mut parm: Option<Parm> = None;
    for attribute in rest_attributes(&field.attributes) {
        match attribute.name.as_str() {
            "Parm" => {
                if parm.is_some() {
                    return Err(RestError::MultipleParms);
                }
                let mut current = Parm::default();
                for p in &attribute.parameters {
                    match p.name.as_str() {
                        "In" => {
                            let raw = string_of(p, "Parm", "In", IN_NAMES)?;
                            current.location =
                                ParmIn::from_name(raw).ok_or_else(|| mismatch("Parm", "In", IN_NAMES))?;
                        }
                        "Required" => current.required = bool_of(p, "Parm", "Required")?,
                        "Format" => current.format = format_of(p, "Parm")?,
                        "Name" => current.name = string_of(p, "Parm", "Name", "a string")?.to_string(),
                        other => {
                            return Err(RestError::UnknownParameter {
                                attribute: "Parm",
                                parameter: other.to_string(),
                            });
                        }
                    }
                }
                parm = Some(current);
            }
            "Op" | "Header" | "Response" => {
                return Err(RestError::MisplacedAttribute {
                    attribute: attribute.name.clone(),
                    target: "method parameter",
                });
            }
            _ => {}
        }
    }

    let mut parm = parm.unwrap_or_default();
    require_list("Parm", parm.format, &field.ty)?;
    if parm.name.is_empty() {
        parm.name = field.name.clone();
    }
    Ok(parm)
}

/// A parameter together with its REST binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterBinding {
    pub field: String,
    #[serde(rename = "type")]
    pub ty: Type,
    pub parm: Parm,
}

/// Everything the gateway needs to route and relay one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodBinding {
    pub service: String,
    pub method: String,
    pub operation: Operation,
    pub parameters: Vec<ParameterBinding>,
}

pub fn bind_method(service: &Service, method: &Method) -> Result<MethodBinding, RestError> {
    let operation = read_op(method)?;
    let parameters = method
        .parameters
        .iter()
        .map(|field| {
            Ok(ParameterBinding {
                field: field.name.clone(),
                ty: field.ty.clone(),
                parm: read_parm(field)?,
            })
        })
        .collect::<Result<Vec<_>, RestError>>()?;
    Ok(MethodBinding {
        service: service.name.clone(),
        method: method.name.clone(),
        operation,
        parameters,
    })
}

/// Bind every method of `service`, in declaration order.
pub fn bind_service(service: &Service) -> Result<Vec<MethodBinding>, RestError> {
    service
        .methods
        .iter()
        .map(|method| bind_method(service, method))
        .collect()
}
