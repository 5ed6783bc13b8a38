use crate::controller::{Args, HandlerFn, Reply};
use crate::ids::RequestId;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use tracing::error;

/// A handler or attribute producer panicked while running.
///
/// Unclassified: translated into a generic 500 like any other failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerPanic {
    pub handler: String,
    pub message: String,
}

impl fmt::Display for HandlerPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler '{}' panicked: {}", self.handler, self.message)
    }
}

impl std::error::Error for HandlerPanic {}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Run a handler, turning a panic (while building or polling its future)
/// into a [`HandlerPanic`] error.
///
/// # Errors
///
/// The handler's own error, or [`HandlerPanic`].
pub async fn invoke_handler(
    handler: &HandlerFn,
    args: Args,
    request_id: RequestId,
    handler_name: &str,
) -> anyhow::Result<Reply> {
    match AssertUnwindSafe(async { handler(args).await })
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            // H1: Handler panic caught
            error!(
                request_id = %request_id,
                handler = %handler_name,
                panic_message = %message,
                "Handler panicked"
            );
            Err(HandlerPanic {
                handler: handler_name.to_string(),
                message,
            }
            .into())
        }
    }
}
