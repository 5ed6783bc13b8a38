use crate::dispatcher::RequestError;
use crate::server::request::Headers;
use crate::server::response::ResponseEntity;
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declared conversion for query and header parameter values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Passed through unchanged
    String,
    /// Base-10 integer
    Integer,
    /// Floating point number
    Number,
    /// Strict JSON document
    Json,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Number => "number",
            ValueType::Json => "json",
        };
        write!(f, "{s}")
    }
}

/// Where a handler argument comes from. Position in the handler's parameter
/// list is the position of the bound argument.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterSpec {
    /// The parsed request body
    RequestBody,
    QueryParam {
        name: String,
        #[serde(default = "default_value_type")]
        value_type: ValueType,
    },
    Header {
        name: String,
        #[serde(default = "default_value_type")]
        value_type: ValueType,
        #[serde(default)]
        required: bool,
        #[serde(default)]
        default: Option<Value>,
    },
    /// All request headers, overlaid on optional defaults
    HeaderMap {
        #[serde(default)]
        defaults: Option<Headers>,
    },
    PathVariable {
        name: String,
        #[serde(default = "default_true")]
        required: bool,
        #[serde(default)]
        default: Option<Value>,
        #[serde(default)]
        decode: bool,
    },
    ModelAttribute {
        name: String,
    },
    /// Placeholder that always binds to undefined
    None,
}

fn default_value_type() -> ValueType {
    ValueType::String
}

fn default_true() -> bool {
    true
}

impl ParameterSpec {
    #[must_use]
    pub fn body() -> Self {
        ParameterSpec::RequestBody
    }

    #[must_use]
    pub fn query(name: &str, value_type: ValueType) -> Self {
        ParameterSpec::QueryParam {
            name: name.to_string(),
            value_type,
        }
    }

    /// Optional header without a default
    #[must_use]
    pub fn header(name: &str, value_type: ValueType) -> Self {
        ParameterSpec::Header {
            name: name.to_string(),
            value_type,
            required: false,
            default: None,
        }
    }

    #[must_use]
    pub fn required_header(name: &str, value_type: ValueType) -> Self {
        ParameterSpec::Header {
            name: name.to_string(),
            value_type,
            required: true,
            default: None,
        }
    }

    #[must_use]
    pub fn header_or(name: &str, value_type: ValueType, default: Value) -> Self {
        ParameterSpec::Header {
            name: name.to_string(),
            value_type,
            required: false,
            default: Some(default),
        }
    }

    #[must_use]
    pub fn header_map(defaults: Option<Headers>) -> Self {
        ParameterSpec::HeaderMap { defaults }
    }

    /// Required path variable, not percent-decoded
    #[must_use]
    pub fn path_variable(name: &str) -> Self {
        ParameterSpec::PathVariable {
            name: name.to_string(),
            required: true,
            default: None,
            decode: false,
        }
    }

    /// Required path variable, percent-decoded before binding
    #[must_use]
    pub fn decoded_path_variable(name: &str) -> Self {
        ParameterSpec::PathVariable {
            name: name.to_string(),
            required: true,
            default: None,
            decode: true,
        }
    }

    #[must_use]
    pub fn optional_path_variable(name: &str, default: Option<Value>) -> Self {
        ParameterSpec::PathVariable {
            name: name.to_string(),
            required: false,
            default,
            decode: false,
        }
    }

    #[must_use]
    pub fn model_attribute(name: &str) -> Self {
        ParameterSpec::ModelAttribute {
            name: name.to_string(),
        }
    }

    /// Attribute name when this parameter consumes a model attribute
    #[must_use]
    pub fn attribute_name(&self) -> Option<&str> {
        match self {
            ParameterSpec::ModelAttribute { name } => Some(name),
            _ => None,
        }
    }
}

/// Methods a request or a mapping may name
pub const STANDARD_METHODS: [Method; 9] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::CONNECT,
    Method::OPTIONS,
    Method::TRACE,
    Method::PATCH,
];

/// Parse a method name case-insensitively into one of [`STANDARD_METHODS`]
///
/// # Errors
///
/// Fails for malformed tokens and for extension methods such as `BREW`.
pub fn parse_method(raw: &str) -> anyhow::Result<Method> {
    let method = Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| anyhow::anyhow!("Unsupported request method '{raw}'"))?;
    anyhow::ensure!(
        STANDARD_METHODS.contains(&method),
        "Unsupported request method '{raw}'"
    );
    Ok(method)
}

/// One `(methods, paths)` mapping declared on a controller or a handler.
///
/// An empty method list matches any method.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestMapping {
    pub methods: Vec<Method>,
    pub paths: Vec<String>,
}

impl RequestMapping {
    #[must_use]
    pub fn new(methods: Vec<Method>, paths: Vec<String>) -> Self {
        Self { methods, paths }
    }

    /// Mapping for `path` that accepts every method
    #[must_use]
    pub fn any(path: &str) -> Self {
        Self::new(Vec::new(), vec![path.to_string()])
    }

    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(vec![Method::GET], vec![path.to_string()])
    }

    #[must_use]
    pub fn post(path: &str) -> Self {
        Self::new(vec![Method::POST], vec![path.to_string()])
    }

    #[must_use]
    pub fn put(path: &str) -> Self {
        Self::new(vec![Method::PUT], vec![path.to_string()])
    }

    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::new(vec![Method::DELETE], vec![path.to_string()])
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
        self
    }

    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.paths.push(path.to_string());
        self
    }
}

/// A bound handler argument
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Arg {
    /// Nothing was bound (missing optional value, `None` spec, unknown attribute)
    #[default]
    Undefined,
    Value(Value),
    Headers(Headers),
}

static UNDEFINED: Arg = Arg::Undefined;

impl Arg {
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Arg::Undefined)
    }

    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Arg::Value(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    #[must_use]
    pub fn as_headers(&self) -> Option<&Headers> {
        match self {
            Arg::Headers(h) => Some(h),
            _ => None,
        }
    }

    /// JSON view of the argument; undefined becomes `null`
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Arg::Undefined => Value::Null,
            Arg::Value(v) => v.clone(),
            Arg::Headers(h) => h.to_json(),
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

/// Positional arguments handed to a handler
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Args(Vec<Arg>);

impl Args {
    #[must_use]
    pub fn new(args: Vec<Arg>) -> Self {
        Self(args)
    }

    /// Argument at `index`; out of range reads as undefined
    #[must_use]
    pub fn get(&self, index: usize) -> &Arg {
        self.0.get(index).unwrap_or(&UNDEFINED)
    }

    #[must_use]
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.get(index).as_value()
    }

    #[must_use]
    pub fn str(&self, index: usize) -> Option<&str> {
        self.get(index).as_str()
    }

    #[must_use]
    pub fn i64(&self, index: usize) -> Option<i64> {
        self.get(index).as_i64()
    }

    #[must_use]
    pub fn f64(&self, index: usize) -> Option<f64> {
        self.get(index).as_f64()
    }

    #[must_use]
    pub fn headers(&self, index: usize) -> Option<&Headers> {
        self.get(index).as_headers()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arg> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Arg> {
        self.0
    }
}

/// What a handler hands back to the dispatcher.
///
/// The variant decides how the value is folded into the response when
/// several handlers match one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Bare status, no body
    Status(StatusCode),
    /// Structured error with its own status and representation
    Error(RequestError),
    /// Complete response, replaces anything accumulated so far
    Entity(ResponseEntity),
    /// Sequence fragment, concatenated onto an existing sequence body
    Array(Vec<Value>),
    /// Object fragment, shallow-merged onto an existing object body
    Object(Map<String, Value>),
    /// String, number, boolean or null
    Scalar(Value),
    /// The handler produced no value
    Empty,
}

impl Reply {
    /// Serialize any value and classify the result
    ///
    /// # Errors
    ///
    /// Fails when `value` cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> anyhow::Result<Self> {
        Ok(Reply::from(serde_json::to_value(value)?))
    }

    /// Value stored in the model attribute cache when this reply comes
    /// from an attribute producer
    ///
    /// # Errors
    ///
    /// A structured error reply is raised instead of being cached under the
    /// attribute name: the attribute stays unresolved and the request fails
    /// with the error's status. Consumers never receive an error value as
    /// an argument.
    pub fn into_attribute(self) -> anyhow::Result<Arg> {
        Ok(match self {
            Reply::Status(status) => Arg::Value(Value::from(status.as_u16())),
            Reply::Error(err) => return Err(err.into()),
            Reply::Entity(mut entity) => entity.take_body().map_or(Arg::Undefined, Arg::Value),
            Reply::Array(items) => Arg::Value(Value::Array(items)),
            Reply::Object(map) => Arg::Value(Value::Object(map)),
            Reply::Scalar(value) => Arg::Value(value),
            Reply::Empty => Arg::Undefined,
        })
    }

    /// Short name of the variant for log fields
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Status(_) => "status",
            Reply::Error(_) => "error",
            Reply::Entity(_) => "entity",
            Reply::Array(_) => "array",
            Reply::Object(_) => "object",
            Reply::Scalar(_) => "scalar",
            Reply::Empty => "empty",
        }
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Reply::Array(items),
            Value::Object(map) => Reply::Object(map),
            other => Reply::Scalar(other),
        }
    }
}

impl From<StatusCode> for Reply {
    fn from(status: StatusCode) -> Self {
        Reply::Status(status)
    }
}

impl From<RequestError> for Reply {
    fn from(err: RequestError) -> Self {
        Reply::Error(err)
    }
}

impl From<ResponseEntity> for Reply {
    fn from(entity: ResponseEntity) -> Self {
        Reply::Entity(entity)
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_classifies_json() {
        assert!(matches!(Reply::from(json!([1, 2])), Reply::Array(_)));
        assert!(matches!(Reply::from(json!({"a": 1})), Reply::Object(_)));
        assert!(matches!(Reply::from(json!("x")), Reply::Scalar(_)));
        assert!(matches!(Reply::from(Value::Null), Reply::Scalar(Value::Null)));
    }

    #[test]
    fn test_args_out_of_range_is_undefined() {
        let args = Args::new(vec![Arg::Value(json!(42))]);
        assert_eq!(args.i64(0), Some(42));
        assert!(args.get(3).is_undefined());
    }

    #[test]
    fn test_error_reply_is_raised_by_attribute_producer() {
        let reply = Reply::Error(RequestError::new(403, "Forbidden"));
        let err = reply.into_attribute().unwrap_err();
        assert_eq!(err.downcast_ref::<RequestError>().unwrap().status(), 403);
    }

    #[test]
    fn test_parse_method_accepts_standard_only() {
        assert_eq!(parse_method(" patch ").unwrap(), Method::PATCH);
        assert_eq!(parse_method("options").unwrap(), Method::OPTIONS);
        assert!(parse_method("BREW").is_err());
        assert!(parse_method("PROPFIND").is_err());
        assert!(parse_method("BAD METHOD").is_err());
        assert!(parse_method("").is_err());
    }

    #[test]
    fn test_entity_reply_caches_body() {
        let reply = Reply::Entity(ResponseEntity::ok(json!({"id": 7})));
        assert_eq!(reply.into_attribute().unwrap(), Arg::Value(json!({"id": 7})));
    }

    #[test]
    fn test_parameter_spec_from_yaml() {
        let spec: ParameterSpec =
            serde_yaml::from_str("kind: header\nname: x-token\nrequired: true\n").unwrap();
        assert_eq!(spec, ParameterSpec::required_header("x-token", ValueType::String));

        let spec: ParameterSpec = serde_yaml::from_str("kind: path_variable\nname: id\n").unwrap();
        assert_eq!(spec, ParameterSpec::path_variable("id"));

        let spec: ParameterSpec = serde_yaml::from_str("kind: none\n").unwrap();
        assert_eq!(spec, ParameterSpec::None);
    }
}
