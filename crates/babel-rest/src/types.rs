//! Typed REST projections of method and parameter attributes.

use babel_idl::Type;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Case-insensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a list travels in a single query/header/path value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListFormat {
    #[default]
    None,
    /// `foo,bar`
    Csv,
    /// `foo bar`
    Ssv,
    /// `foo\tbar`
    Tsv,
    /// `foo|bar`
    Pipes,
    /// Repeated parameters: `foo=bar&foo=baz`.
    Multi,
}

impl ListFormat {
    /// Case-insensitive lookup; the empty string means [`ListFormat::None`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "" => Some(ListFormat::None),
            "CSV" => Some(ListFormat::Csv),
            "SSV" => Some(ListFormat::Ssv),
            "TSV" => Some(ListFormat::Tsv),
            "PIPES" => Some(ListFormat::Pipes),
            "MULTI" => Some(ListFormat::Multi),
            _ => None,
        }
    }

    /// Delimiter inside one value; `None` for `None` and `Multi`.
    pub fn separator(&self) -> Option<char> {
        match self {
            ListFormat::Csv => Some(','),
            ListFormat::Ssv => Some(' '),
            ListFormat::Tsv => Some('\t'),
            ListFormat::Pipes => Some('|'),
            ListFormat::None | ListFormat::Multi => None,
        }
    }
}

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParmIn {
    #[default]
    Query,
    Header,
    Path,
    FormData,
    Body,
}

impl ParmIn {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "QUERY" => Some(ParmIn::Query),
            "HEADER" => Some(ParmIn::Header),
            "PATH" => Some(ParmIn::Path),
            "FORMDATA" => Some(ParmIn::FormData),
            "BODY" => Some(ParmIn::Body),
            _ => None,
        }
    }
}

/// Key of a response: a status code, or the catch-all default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResponseCode {
    Default,
    Code(i64),
}

impl ResponseCode {
    /// Negative codes select the default response.
    pub fn from_code(code: i64) -> Self {
        if code < 0 {
            ResponseCode::Default
        } else {
            ResponseCode::Code(code)
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::Default => f.write_str("default"),
            ResponseCode::Code(code) => write!(f, "{code}"),
        }
    }
}

impl FromStr for ResponseCode {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "default" {
            return Ok(ResponseCode::Default);
        }
        s.parse::<i64>().map(ResponseCode::from_code)
    }
}

impl Serialize for ResponseCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResponseCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A declared HTTP header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub format: ListFormat,
}

/// One possible response of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub headers: BTreeMap<String, Header>,
}

impl Response {
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            desc: String::new(),
            headers: BTreeMap::new(),
        }
    }
}

/// REST binding of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub path: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub hide: bool,
    pub responses: BTreeMap<ResponseCode, Response>,
}

impl Default for Operation {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            method: HttpMethod::Get,
            deprecated: false,
            hide: false,
            responses: BTreeMap::new(),
        }
    }
}

/// REST binding of a method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Parm {
    #[serde(rename = "in")]
    pub location: ParmIn,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub format: ListFormat,
    /// Name on the wire; the parameter's own name unless renamed.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!(HttpMethod::from_name("patch"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::from_name("FETCH"), None);
        assert_eq!(ListFormat::from_name("Pipes"), Some(ListFormat::Pipes));
        assert_eq!(ListFormat::from_name(""), Some(ListFormat::None));
        assert_eq!(ParmIn::from_name("formData"), Some(ParmIn::FormData));
        assert_eq!(ParmIn::from_name("cookie"), None);
    }

    #[test]
    fn negative_codes_are_the_default_response() {
        assert_eq!(ResponseCode::from_code(-1), ResponseCode::Default);
        assert_eq!(ResponseCode::from_code(0), ResponseCode::Code(0));
        assert_eq!("default".parse::<ResponseCode>(), Ok(ResponseCode::Default));
        assert_eq!("404".parse::<ResponseCode>(), Ok(ResponseCode::Code(404)));
        assert!("oops".parse::<ResponseCode>().is_err());
    }

    #[test]
    fn operation_serializes_codes_as_map_keys() {
        let mut op = Operation::default();
        op.responses
            .insert(ResponseCode::Code(200), Response::new(Type::named("string")));
        op.responses
            .insert(ResponseCode::Default, Response::new(Type::void()));
        let json = serde_json::to_value(&op).expect("operation must serialize");
        assert_eq!(json["method"], "GET");
        assert_eq!(
            json["responses"]["200"]["type"],
            serde_json::json!({"kind": {"shape": "primitive", "of": "string"}})
        );
        assert_eq!(
            json["responses"]["default"]["type"],
            serde_json::json!({"kind": {"shape": "void"}})
        );
        let back: Operation = serde_json::from_value(json).expect("operation must deserialize");
        assert_eq!(back, op);
    }
}
