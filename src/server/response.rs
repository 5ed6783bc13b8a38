use super::request::Headers;
use http::StatusCode;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error};

/// Reason phrase for a status code, `"Unknown"` for unregistered codes.
#[must_use]
pub fn status_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

/// Outgoing response produced by the dispatcher.
///
/// The body is either a JSON string (rendered as text) or any other JSON
/// value; `None` means the response carries no body at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEntity {
    status: u16,
    headers: Headers,
    body: Option<Value>,
}

impl ResponseEntity {
    /// Status-only entity with no headers and no body
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn from_parts(status: u16, headers: Headers, body: Option<Value>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// 200 with the given body
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::new(200).with_body(body)
    }

    #[must_use]
    pub fn no_content() -> Self {
        Self::new(204)
    }

    #[must_use]
    pub fn bad_request() -> Self {
        Self::new(400)
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::new(404)
    }

    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::new(405)
    }

    #[must_use]
    pub fn internal_server_error() -> Self {
        Self::new(500)
    }

    /// Entity whose body is `{"error": message}`
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::new(status).with_body(json!({ "error": message }))
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn status_message(&self) -> &'static str {
        status_reason(self.status)
    }

    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn set_body(&mut self, body: Option<Value>) {
        self.body = body;
    }

    pub fn take_body(&mut self) -> Option<Value> {
        self.body.take()
    }

    #[must_use]
    pub fn into_parts(self) -> (u16, Headers, Option<Value>) {
        (self.status, self.headers, self.body)
    }
}

impl Serialize for ResponseEntity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.body.is_some() { 4 } else { 3 };
        let mut state = serializer.serialize_struct("ResponseEntity", len)?;
        state.serialize_field("statusCode", &self.status)?;
        state.serialize_field("statusMessage", self.status_message())?;
        state.serialize_field("headers", &self.headers)?;
        if let Some(body) = &self.body {
            state.serialize_field("body", body)?;
        }
        state.end()
    }
}

/// Wire-ready view of a [`ResponseEntity`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResponse {
    pub status: u16,
    pub reason: &'static str,
    /// One `(name, value)` pair per header value, in order
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RenderedResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Render an entity into status line, headers and body bytes.
///
/// String bodies default to `text/plain`, every other JSON body is
/// pretty-printed and defaults to `application/json`. An explicit
/// `Content-Type` on the entity always wins.
#[must_use]
pub fn render(entity: &ResponseEntity) -> RenderedResponse {
    let mut headers: Vec<(String, String)> = entity
        .headers()
        .iter()
        .flat_map(|(name, values)| values.iter().map(move |v| (name.to_string(), v.clone())))
        .collect();
    let has_content_type = entity.headers().contains_key("content-type");

    let body = match entity.body() {
        Some(Value::String(text)) => {
            if !has_content_type {
                headers.push(("Content-Type".to_string(), "text/plain".to_string()));
            }
            text.clone().into_bytes()
        }
        Some(other) => {
            if !has_content_type {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
            }
            match serde_json::to_vec_pretty(other) {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!(error = %e, status = entity.status(), "Failed to serialize response body");
                    Vec::new()
                }
            }
        }
        None => Vec::new(),
    };

    debug!(
        status = entity.status(),
        header_count = headers.len(),
        body_size_bytes = body.len(),
        "Response rendered"
    );

    RenderedResponse {
        status: entity.status(),
        reason: entity.status_message(),
        headers,
        body,
    }
}
