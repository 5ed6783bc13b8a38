use super::{bind_parameter, bind_parameters, cast_value, BindingSource};
use crate::controller::{Arg, ParameterSpec, ValueType};
use crate::router::PathVariables;
use crate::server::request::{Headers, QueryParams};
use serde_json::{json, Value};
use std::collections::HashMap;

struct Fixture {
    query: QueryParams,
    body: Option<Value>,
    headers: Headers,
    path_variables: PathVariables,
    attributes: HashMap<String, Arg>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            query: [("limit", "42"), ("ratio", "0.5"), ("filter", r#"{"a":[1]}"#), ("bad", "4x")]
                .into_iter()
                .collect(),
            body: Some(json!({"name": "rex"})),
            headers: [("X-Token", "abc"), ("X-Retries", "3")].into_iter().collect(),
            path_variables: [("id", "7"), ("empty", ""), ("file", "a%20b.txt"), ("broken", "%E0%A4%A")]
                .into_iter()
                .collect(),
            attributes: HashMap::from([("user".to_string(), Arg::Value(json!({"id": 1})))]),
        }
    }

    fn source(&self) -> BindingSource<'_> {
        BindingSource {
            query: &self.query,
            body: self.body.as_ref(),
            headers: &self.headers,
            path_variables: &self.path_variables,
            attributes: Some(&self.attributes),
        }
    }
}

fn bind(spec: ParameterSpec) -> Result<Arg, u16> {
    let fixture = Fixture::new();
    bind_parameter(&spec, &fixture.source()).map_err(|e| e.status())
}

#[test]
fn test_cast_value() {
    assert_eq!(cast_value("42", ValueType::Integer).unwrap(), json!(42));
    assert_eq!(cast_value("-3", ValueType::Integer).unwrap(), json!(-3));
    assert_eq!(cast_value("1.5", ValueType::Number).unwrap(), json!(1.5));
    assert_eq!(cast_value("abc", ValueType::String).unwrap(), json!("abc"));
    assert_eq!(cast_value("[1,2]", ValueType::Json).unwrap(), json!([1, 2]));
}

#[test]
fn test_cast_value_rejects_malformed_input() {
    assert_eq!(cast_value("4x", ValueType::Integer).unwrap_err().status(), 400);
    assert_eq!(cast_value("NaN", ValueType::Number).unwrap_err().status(), 400);
    assert_eq!(cast_value("inf", ValueType::Number).unwrap_err().status(), 400);
    assert_eq!(cast_value("{bad", ValueType::Json).unwrap_err().status(), 400);
}

#[test]
fn test_request_body() {
    assert_eq!(bind(ParameterSpec::body()), Ok(Arg::Value(json!({"name": "rex"}))));

    let mut fixture = Fixture::new();
    fixture.body = None;
    let arg = bind_parameter(&ParameterSpec::body(), &fixture.source()).unwrap();
    assert!(arg.is_undefined());
}

#[test]
fn test_query_param_casts() {
    assert_eq!(
        bind(ParameterSpec::query("limit", ValueType::Integer)),
        Ok(Arg::Value(json!(42)))
    );
    assert_eq!(
        bind(ParameterSpec::query("ratio", ValueType::Number)),
        Ok(Arg::Value(json!(0.5)))
    );
    assert_eq!(
        bind(ParameterSpec::query("filter", ValueType::Json)),
        Ok(Arg::Value(json!({"a": [1]})))
    );
    assert_eq!(
        bind(ParameterSpec::query("limit", ValueType::String)),
        Ok(Arg::Value(json!("42")))
    );
}

#[test]
fn test_query_param_missing_is_undefined() {
    assert_eq!(
        bind(ParameterSpec::query("page", ValueType::Integer)),
        Ok(Arg::Undefined)
    );
}

#[test]
fn test_query_param_bad_cast_is_400() {
    assert_eq!(bind(ParameterSpec::query("bad", ValueType::Integer)), Err(400));
}

#[test]
fn test_header_case_insensitive_and_cast() {
    assert_eq!(
        bind(ParameterSpec::header("x-retries", ValueType::Integer)),
        Ok(Arg::Value(json!(3)))
    );
    assert_eq!(
        bind(ParameterSpec::required_header("x-token", ValueType::String)),
        Ok(Arg::Value(json!("abc")))
    );
}

#[test]
fn test_required_header_missing_is_400() {
    let fixture = Fixture::new();
    let err = bind_parameter(
        &ParameterSpec::required_header("x-api-key", ValueType::String),
        &fixture.source(),
    )
    .unwrap_err();
    assert_eq!(err.status(), 400);
    assert_eq!(err.message(), "Bad Request: Header missing: x-api-key");
}

#[test]
fn test_optional_header_missing_uses_default_uncast() {
    assert_eq!(
        bind(ParameterSpec::header_or("x-page-size", ValueType::Integer, json!("25"))),
        Ok(Arg::Value(json!("25")))
    );
    assert_eq!(
        bind(ParameterSpec::header("x-page-size", ValueType::Integer)),
        Ok(Arg::Undefined)
    );
}

#[test]
fn test_header_map_overlays_defaults() {
    let defaults: Headers = [("x-token", "default"), ("accept", "application/json")]
        .into_iter()
        .collect();
    let arg = bind(ParameterSpec::header_map(Some(defaults))).unwrap();
    let headers = arg.as_headers().unwrap();
    assert_eq!(headers.get_first("x-token"), Some("abc"));
    assert_eq!(headers.get_first("accept"), Some("application/json"));
    assert_eq!(headers.get_first("x-retries"), Some("3"));
}

#[test]
fn test_header_map_without_defaults() {
    let arg = bind(ParameterSpec::header_map(None)).unwrap();
    assert_eq!(arg.as_headers().unwrap().len(), 2);

    let mut fixture = Fixture::new();
    fixture.headers = Headers::new();
    let arg = bind_parameter(&ParameterSpec::header_map(None), &fixture.source()).unwrap();
    assert!(arg.as_headers().unwrap().is_empty());
}

#[test]
fn test_path_variable() {
    assert_eq!(
        bind(ParameterSpec::path_variable("id")),
        Ok(Arg::Value(json!("7")))
    );
}

#[test]
fn test_required_path_variable_missing_or_empty_is_404() {
    assert_eq!(bind(ParameterSpec::path_variable("missing")), Err(404));
    assert_eq!(bind(ParameterSpec::path_variable("empty")), Err(404));
}

#[test]
fn test_optional_path_variable_default() {
    assert_eq!(
        bind(ParameterSpec::optional_path_variable("empty", Some(json!("all")))),
        Ok(Arg::Value(json!("all")))
    );
    assert_eq!(
        bind(ParameterSpec::optional_path_variable("missing", None)),
        Ok(Arg::Undefined)
    );
}

#[test]
fn test_path_variable_decoding_is_opt_in() {
    assert_eq!(
        bind(ParameterSpec::path_variable("file")),
        Ok(Arg::Value(json!("a%20b.txt")))
    );
    assert_eq!(
        bind(ParameterSpec::decoded_path_variable("file")),
        Ok(Arg::Value(json!("a b.txt")))
    );
}

#[test]
fn test_malformed_path_variable_decoding_is_400() {
    assert_eq!(bind(ParameterSpec::decoded_path_variable("broken")), Err(400));
}

#[test]
fn test_model_attribute() {
    assert_eq!(
        bind(ParameterSpec::model_attribute("user")),
        Ok(Arg::Value(json!({"id": 1})))
    );
    assert_eq!(bind(ParameterSpec::model_attribute("unknown")), Ok(Arg::Undefined));

    let fixture = Fixture::new();
    let source = BindingSource {
        attributes: None,
        ..fixture.source()
    };
    let arg = bind_parameter(&ParameterSpec::model_attribute("user"), &source).unwrap();
    assert!(arg.is_undefined());
}

#[test]
fn test_none_spec() {
    assert_eq!(bind(ParameterSpec::None), Ok(Arg::Undefined));
}

#[test]
fn test_bind_parameters_is_positional() {
    let fixture = Fixture::new();
    let args = bind_parameters(
        &[
            ParameterSpec::path_variable("id"),
            ParameterSpec::None,
            ParameterSpec::query("limit", ValueType::Integer),
        ],
        &fixture.source(),
    )
    .unwrap();
    assert_eq!(args.len(), 3);
    assert_eq!(args.str(0), Some("7"));
    assert!(args.get(1).is_undefined());
    assert_eq!(args.i64(2), Some(42));
}

#[test]
fn test_bind_parameters_stops_at_first_failure() {
    let fixture = Fixture::new();
    let err = bind_parameters(
        &[
            ParameterSpec::path_variable("missing"),
            ParameterSpec::required_header("x-api-key", ValueType::String),
        ],
        &fixture.source(),
    )
    .unwrap_err();
    assert_eq!(err.status(), 404);
}
