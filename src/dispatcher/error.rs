use crate::ids::RequestId;
use crate::server::response::ResponseEntity;
use serde_json::{json, Value};
use std::fmt;
use tracing::{error, warn};

/// Error carrying an explicit HTTP status, raised on purpose by handlers,
/// binders and body parsers.
///
/// Handlers may either return it (`Reply::Error`) or propagate it as an
/// `anyhow::Error`; the dispatcher recognises it in both positions.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestError {
    status: u16,
    message: String,
    payload: Option<Value>,
}

impl RequestError {
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            payload: None,
        }
    }

    /// Error whose serialized form is `payload` instead of the default
    /// `{"error", "code"}` object
    #[must_use]
    pub fn with_payload(status: u16, message: impl Into<String>, payload: Value) -> Self {
        Self {
            status,
            message: message.into(),
            payload: Some(payload),
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::new(404, "Not Found")
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Serialized representation sent as the response body
    #[must_use]
    pub fn to_json(&self) -> Value {
        match &self.payload {
            Some(payload) => payload.clone(),
            None => json!({ "error": self.message, "code": self.status }),
        }
    }

    /// Entity using the error's own status and representation
    #[must_use]
    pub fn to_entity(&self) -> ResponseEntity {
        ResponseEntity::new(self.status).with_body(self.to_json())
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl std::error::Error for RequestError {}

/// Translate any dispatch failure into a response entity.
///
/// - [`RequestError`] with status 404 → Not Found
/// - [`RequestError`] with 400..500 → Bad Request carrying the original status
/// - any other [`RequestError`] → Internal Server Error carrying the original status
/// - anything else → logged, generic 500; the message is withheld in production
#[must_use]
pub fn translate_error(err: &anyhow::Error, production: bool, request_id: RequestId) -> ResponseEntity {
    if let Some(request_error) = err.downcast_ref::<RequestError>() {
        let status = request_error.status();
        // E1: Structured error translated
        warn!(
            request_id = %request_id,
            status = status,
            message = %request_error.message(),
            "Request failed with structured error"
        );
        let entity = if status == 404 {
            ResponseEntity::not_found()
        } else if (400..500).contains(&status) {
            ResponseEntity::bad_request().with_status(status)
        } else {
            ResponseEntity::internal_server_error().with_status(status)
        };
        return entity.with_body(request_error.to_json());
    }

    // E2: Unclassified error
    error!(
        request_id = %request_id,
        error = %err,
        error_chain = ?err,
        production = production,
        "Unhandled error while dispatching request"
    );

    let message = if production {
        "Internal Server Error".to_string()
    } else {
        format!("Internal Server Error: {err}")
    };
    ResponseEntity::internal_server_error().with_body(json!({ "error": message, "code": 500 }))
}
