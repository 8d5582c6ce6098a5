//! Routes and request assembly for the REST gateway.
//!
//! Every method gets a Babel route (`POST {babel_path}/{Service}/{method}`).
//! Methods whose operation is not hidden also get a REST route built from
//! their `rest.Op` binding. An inbound REST call is turned into the JSON
//! argument object the Babel endpoint expects by [`assemble_arguments`].

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::transport::RelayRequest;
use babel_idl::{Idl, clean_path};
use babel_rest::{HttpMethod, MethodBinding, ParmIn, bind_method, coerce};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, info};

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder regex must compile"))
}

/// Join the REST prefix and an operation path, rewriting `{name}`
/// placeholders to the `:name` form routers match on.
pub fn route_path(rest_base: &str, op_path: &str) -> String {
    let joined = clean_path(&format!("/{rest_base}/{op_path}"));
    placeholder_regex().replace_all(&joined, ":$1").into_owned()
}

pub fn babel_path(config: &RelayConfig, service: &str, method: &str) -> String {
    clean_path(&format!("/{}/{service}/{method}", config.babel_path))
}

/// Absolute URL of the Babel endpoint serving `service.method`.
pub fn destination_url(config: &RelayConfig, service: &str, method: &str) -> String {
    format!(
        "{}://{}{}",
        config.babel_proto,
        config.babel_addr,
        babel_path(config, service, method)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Rest,
    Babel,
}

/// One route the gateway installs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub kind: RouteKind,
    pub method: HttpMethod,
    pub path: String,
    pub binding: MethodBinding,
}

/// Bind every service method in the tree and lay out its routes.
pub fn plan_routes(idl: &Idl, config: &RelayConfig) -> Result<Vec<Route>, RelayError> {
    let services = idl.all_services();
    if services.is_empty() {
        return Err(RelayError::NoServices);
    }

    let mut routes = Vec::new();
    for service in services {
        for method in &service.methods {
            let binding =
                bind_method(service, method).map_err(|source| RelayError::Binding {
                    service: service.name.clone(),
                    method: method.name.clone(),
                    source,
                })?;

            if !binding.operation.hide {
                let path = route_path(&config.rest_path, &binding.operation.path);
                info!(
                    http = %binding.operation.method,
                    %path,
                    call = %format!("{}.{}", service.name, method.name),
                    "rest route"
                );
                routes.push(Route {
                    kind: RouteKind::Rest,
                    method: binding.operation.method,
                    path,
                    binding: binding.clone(),
                });
            }

            let path = babel_path(config, &service.name, &method.name);
            info!(http = "POST", %path, "babel route");
            routes.push(Route {
                kind: RouteKind::Babel,
                method: HttpMethod::Post,
                path,
                binding,
            });
        }
    }
    Ok(routes)
}

/// Raw values pulled off an inbound REST request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestInputs {
    pub query: BTreeMap<String, Vec<String>>,
    /// Keyed by lowercased header name.
    headers: BTreeMap<String, Vec<String>>,
    pub path: BTreeMap<String, String>,
    pub form: BTreeMap<String, Vec<String>>,
    pub body: Option<Json>,
}

impl RequestInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.to_string());
        self
    }

    pub fn with_path(mut self, name: &str, value: &str) -> Self {
        self.path.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_form(mut self, name: &str, value: &str) -> Self {
        self.form
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    pub fn with_body(mut self, body: Json) -> Self {
        self.body = Some(body);
        self
    }

    /// Header values by case-insensitive name.
    pub fn header(&self, name: &str) -> &[String] {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Build the JSON argument object for one call. Keys are parameter names;
/// values are looked up under each parameter's wire name.
pub fn assemble_arguments(
    idl: &Idl,
    binding: &MethodBinding,
    inputs: &RequestInputs,
) -> Result<Json, RelayError> {
    let mut arguments = Map::new();
    for parameter in &binding.parameters {
        let parm = &parameter.parm;
        let convert = |values: &[String]| {
            coerce(idl, &parameter.ty, values, parm.format).map_err(|source| {
                RelayError::Coerce {
                    parameter: parameter.field.clone(),
                    source,
                }
            })
        };

        let value = match parm.location {
            ParmIn::Query => {
                let values = inputs.query.get(&parm.name).map(Vec::as_slice).unwrap_or_default();
                if values.is_empty() && !parm.required {
                    continue;
                }
                convert(values)?
            }
            ParmIn::Header => {
                let values = inputs.header(&parm.name);
                if values.is_empty() && !parm.required {
                    continue;
                }
                convert(values)?
            }
            ParmIn::Path => {
                let value = inputs.path.get(&parm.name).map(String::as_str).unwrap_or("");
                if value.is_empty() && !parm.required {
                    continue;
                }
                convert(std::slice::from_ref(&value.to_string()))?
            }
            ParmIn::FormData => match inputs.form.get(&parm.name).map(Vec::as_slice) {
                None | Some([]) => Json::Null,
                Some([one]) => Json::String(one.clone()),
                Some(many) => Json::Array(many.iter().cloned().map(Json::String).collect()),
            },
            ParmIn::Body => inputs.body.clone().ok_or_else(|| RelayError::MissingBody {
                parameter: parameter.field.clone(),
            })?,
        };
        arguments.insert(parameter.field.clone(), value);
    }
    debug!(
        call = %format!("{}.{}", binding.service, binding.method),
        arguments = arguments.len(),
        "assembled arguments"
    );
    Ok(Json::Object(arguments))
}

/// Assemble the outbound request for one inbound REST call.
pub fn relay_request(
    config: &RelayConfig,
    idl: &Idl,
    binding: &MethodBinding,
    inputs: &RequestInputs,
    forwarded_headers: Vec<(String, String)>,
) -> Result<RelayRequest, RelayError> {
    let arguments = assemble_arguments(idl, binding, inputs)?;
    Ok(RelayRequest {
        url: destination_url(config, &binding.service, &binding.method),
        headers: forwarded_headers,
        body: serde_json::to_vec(&arguments)?,
    })
}
