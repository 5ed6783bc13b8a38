use crate::dispatcher::RequestError;
use crate::server::request::Headers;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

/// Asynchronous request body decoder handed to the dispatcher by the
/// transport.
///
/// Called at most once per request, and only when a matched handler
/// declares that it needs the body. `Ok(None)` means the request has no
/// body.
#[async_trait]
pub trait BodyParser: Send + Sync {
    async fn parse(&self, headers: &Headers) -> anyhow::Result<Option<Value>>;
}

/// Media type of the first `Content-Type` value, lower-cased and without
/// parameters; `application/json` when the header is missing
#[must_use]
pub fn media_type(headers: &Headers) -> String {
    headers
        .get_first("content-type")
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty())
        .unwrap_or_else(|| "application/json".to_string())
}

/// Decode `application/x-www-form-urlencoded` into an object.
/// Repeated keys collect their values into an array.
#[must_use]
pub fn parse_form(bytes: &[u8]) -> Value {
    let mut map = Map::new();
    for (key, value) in url::form_urlencoded::parse(bytes) {
        let value = Value::String(value.into_owned());
        match map.get_mut(key.as_ref()) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key.into_owned(), value);
            }
        }
    }
    Value::Object(map)
}

/// [`BodyParser`] over a body already read into memory.
#[derive(Debug, Clone, Default)]
pub struct BufferedBody(pub Vec<u8>);

impl BufferedBody {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }
}

#[async_trait]
impl BodyParser for BufferedBody {
    async fn parse(&self, headers: &Headers) -> anyhow::Result<Option<Value>> {
        if self.0.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let media_type = media_type(headers);
        let parsed = if media_type == "application/x-www-form-urlencoded" {
            parse_form(&self.0)
        } else {
            serde_json::from_slice(&self.0).map_err(|e| {
                debug!(error = %e, content_type = %media_type, "Request body is not valid JSON");
                RequestError::bad_request(format!("Bad Request: Invalid JSON body: {e}"))
            })?
        };

        debug!(
            content_type = %media_type,
            body_size_bytes = self.0.len(),
            "Request body parsed"
        );
        Ok(Some(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(content_type: &str) -> Headers {
        [("Content-Type", content_type)].into_iter().collect()
    }

    #[test]
    fn test_media_type() {
        assert_eq!(media_type(&headers("Application/JSON; charset=utf-8")), "application/json");
        assert_eq!(media_type(&Headers::new()), "application/json");
    }

    #[tokio::test]
    async fn test_json_body() {
        let body = BufferedBody::new(r#"{"name":"rex","tags":[1,2]}"#);
        let parsed = body.parse(&headers("application/json")).await.unwrap();
        assert_eq!(parsed, Some(json!({"name": "rex", "tags": [1, 2]})));
    }

    #[tokio::test]
    async fn test_missing_content_type_defaults_to_json() {
        let parsed = BufferedBody::new("[1]").parse(&Headers::new()).await.unwrap();
        assert_eq!(parsed, Some(json!([1])));
    }

    #[tokio::test]
    async fn test_form_body_repeated_keys() {
        let body = BufferedBody::new("a=1&b=hello+world&a=2&a=3");
        let parsed = body
            .parse(&headers("application/x-www-form-urlencoded"))
            .await
            .unwrap();
        assert_eq!(parsed, Some(json!({"a": ["1", "2", "3"], "b": "hello world"})));
    }

    #[tokio::test]
    async fn test_empty_body_is_undefined() {
        let parsed = BufferedBody::default()
            .parse(&headers("application/json"))
            .await
            .unwrap();
        assert_eq!(parsed, None);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let err = BufferedBody::new("{oops")
            .parse(&headers("application/json"))
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<RequestError>().unwrap().status(), 400);
    }
}
