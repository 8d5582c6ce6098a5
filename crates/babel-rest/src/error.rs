use crate::types::ResponseCode;
use babel_idl::Primitive;
use thiserror::Error;

/// Errors raised while reading `rest` attributes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestError {
    #[error("only one Op attribute is allowed per method")]
    MultipleOps,

    #[error("only one Parm attribute is allowed per method parameter")]
    MultipleParms,

    /// A known parameter carried a literal of the wrong kind or an
    /// unrecognized value.
    #[error("{attribute}.{parameter} should be {expected}")]
    DataTypeMismatch {
        attribute: &'static str,
        parameter: &'static str,
        expected: &'static str,
    },

    #[error("{parameter} is not a valid {attribute} parameter")]
    UnknownParameter {
        attribute: &'static str,
        parameter: String,
    },

    #[error("Response.Code is required")]
    ResponseCodeMissing,

    #[error("response code {code} already specified on method {method}")]
    ResponseCodeDuplicate { code: ResponseCode, method: String },

    #[error("Header.Name is required")]
    HeaderNameMissing,

    #[error("Header.Type is required")]
    HeaderTypeMissing,

    #[error("header {name} not defined")]
    HeaderUndefined { name: String },

    #[error("header {name} cannot be void")]
    VoidHeader { name: String },

    #[error("{attribute} is not valid on a {target}")]
    MisplacedAttribute {
        attribute: String,
        target: &'static str,
    },

    #[error("{attribute}.Format only applies to list types, not {ty}")]
    FormatRequiresList { attribute: &'static str, ty: String },

    #[error("unable to parse type \"{input}\": {reason}")]
    TypeGrammar { input: String, reason: String },
}

/// Errors raised while coercing raw request strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    #[error("unexpected type: {ty}")]
    UnexpectedType { ty: String },

    #[error("format must be specified when lists are encoded")]
    MissingListFormat,

    #[error("invalid bool value \"{value}\"")]
    InvalidBool { value: String },

    #[error("invalid {ty} value \"{value}\"")]
    InvalidInt { ty: Primitive, value: String },

    #[error("invalid float value \"{value}\"")]
    InvalidFloat { value: String },
}
