use crate::controller::{Arg, Args, ParameterSpec, ValueType};
use crate::dispatcher::RequestError;
use crate::router::PathVariables;
use crate::server::request::{Headers, QueryParams};
use serde_json::{Number, Value};
use std::collections::HashMap;
use tracing::debug;

/// Request data a parameter can be bound from.
///
/// Borrowed from the request context for the duration of one binding pass.
#[derive(Debug, Clone, Copy)]
pub struct BindingSource<'a> {
    pub query: &'a QueryParams,
    /// Body parsed once per request; `None` when absent or never parsed
    pub body: Option<&'a Value>,
    pub headers: &'a Headers,
    pub path_variables: &'a PathVariables,
    /// Model attributes resolved so far for the owning controller
    pub attributes: Option<&'a HashMap<String, Arg>>,
}

/// Convert a raw query or header string to its declared type.
///
/// # Errors
///
/// Returns a 400 [`RequestError`] when the string is not a valid integer,
/// a finite number or a JSON document.
pub fn cast_value(raw: &str, value_type: ValueType) -> Result<Value, RequestError> {
    let invalid =
        || RequestError::bad_request(format!("Bad Request: Invalid {value_type} value: {raw}"));
    match value_type {
        ValueType::String => Ok(Value::String(raw.to_string())),
        ValueType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid()),
        ValueType::Number => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid),
        ValueType::Json => serde_json::from_str(raw).map_err(|_| invalid()),
    }
}

fn or_default(default: Option<&Value>) -> Arg {
    default.cloned().map_or(Arg::Undefined, Arg::Value)
}

/// Bind one parameter spec against the request data.
///
/// # Errors
///
/// - 400 when a required header is missing, a cast fails or a path
///   variable cannot be percent-decoded
/// - 404 when a required path variable is missing or empty
pub fn bind_parameter(
    spec: &ParameterSpec,
    source: &BindingSource<'_>,
) -> Result<Arg, RequestError> {
    match spec {
        ParameterSpec::RequestBody => Ok(source.body.cloned().map_or(Arg::Undefined, Arg::Value)),
        ParameterSpec::QueryParam { name, value_type } => match source.query.get(name) {
            Some(raw) => cast_value(raw, *value_type).map(Arg::Value),
            None => Ok(Arg::Undefined),
        },
        ParameterSpec::Header {
            name,
            value_type,
            required,
            default,
        } => match source.headers.get_first(name) {
            Some(raw) => cast_value(raw, *value_type).map(Arg::Value),
            None if *required => {
                debug!(header = %name, "Required header missing");
                Err(RequestError::bad_request(format!(
                    "Bad Request: Header missing: {name}"
                )))
            }
            None => Ok(or_default(default.as_ref())),
        },
        ParameterSpec::HeaderMap { defaults } => Ok(Arg::Headers(match defaults {
            Some(defaults) => Headers::merged_over(defaults, source.headers),
            None => source.headers.clone(),
        })),
        ParameterSpec::PathVariable {
            name,
            required,
            default,
            decode,
        } => match source.path_variables.get(name).filter(|v| !v.is_empty()) {
            None if *required => {
                debug!(path_variable = %name, "Required path variable missing");
                Err(RequestError::not_found())
            }
            None => Ok(or_default(default.as_ref())),
            Some(raw) if *decode => urlencoding::decode(raw)
                .map(|decoded| Arg::Value(Value::String(decoded.into_owned())))
                .map_err(|_| {
                    RequestError::bad_request(format!(
                        "Bad Request: Malformed path variable: {name}"
                    ))
                }),
            Some(raw) => Ok(Arg::Value(Value::String(raw.to_string()))),
        },
        ParameterSpec::ModelAttribute { name } => Ok(source
            .attributes
            .and_then(|attributes| attributes.get(name))
            .cloned()
            .unwrap_or_default()),
        ParameterSpec::None => Ok(Arg::Undefined),
    }
}

/// Bind every spec in order; the result is positional.
///
/// # Errors
///
/// Stops at the first parameter that fails to bind.
pub fn bind_parameters(
    specs: &[ParameterSpec],
    source: &BindingSource<'_>,
) -> Result<Args, RequestError> {
    specs
        .iter()
        .map(|spec| bind_parameter(spec, source))
        .collect::<Result<Vec<_>, _>>()
        .map(Args::new)
}
