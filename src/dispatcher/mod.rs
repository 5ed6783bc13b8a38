//! # Dispatcher Module
//!
//! The dispatcher turns one inbound `(method, target, headers, body)` into
//! one [`ResponseEntity`](crate::server::response::ResponseEntity), invoking
//! every handler mapped to the request on the way.
//!
//! ## Request Flow
//!
//! 1. The raw target is split into path and query parameters
//! 2. The current [`CompiledTable`](crate::mapping::CompiledTable) snapshot is loaded
//! 3. The route index resolves the path; entries are filtered by method
//! 4. If any matched handler requires a body, the body parser runs once
//! 5. For each matched entry, in registration order:
//!    - its model attributes are resolved (see [`crate::attributes`])
//!    - its parameters are bound (see [`crate::binder`])
//!    - the handler runs and its [`Reply`](crate::controller::Reply) is merged
//!
//! Handlers of one request run strictly one after another.
//!
//! ## Status codes
//!
//! | Situation | Status |
//! |---|---|
//! | no routes registered at all | 405 |
//! | path matches no pattern | 404 |
//! | path matches, no entry accepts the method | 405 |
//! | required header missing, failed cast | 400 |
//! | required path variable missing or empty | 404 |
//! | method outside the standard set (e.g. `BREW`) | 500 |
//! | handler raised a [`RequestError`] | its own status, normalised |
//! | handler or producer panicked | 500 |
//! | any other error | 500 |
//!
//! The empty-table case answers 405 rather than 404; callers relying on
//! 404 for "nothing registered yet" will not get it.
//!
//! ## Example
//!
//! ```rust
//! use reqrouter::controller::{handler_fn, ControllerDescriptor, HandlerDescriptor, ParameterSpec, Reply, RequestMapping, ValueType};
//! use reqrouter::dispatcher::Dispatcher;
//! use reqrouter::server::request::Headers;
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let dispatcher = Dispatcher::new();
//! dispatcher
//!     .attach_controller(
//!         ControllerDescriptor::builder("math")
//!             .handler(
//!                 "double",
//!                 HandlerDescriptor::new(handler_fn(|args| async move {
//!                     Ok(Reply::from(json!({ "result": args.i64(0).unwrap_or(0) * 2 })))
//!                 }))
//!                 .mapping(RequestMapping::get("/double"))
//!                 .param(ParameterSpec::query("n", ValueType::Integer)),
//!             )
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let response = dispatcher
//!     .handle_request("GET", "/double?n=21", None, Headers::new())
//!     .await;
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.body(), Some(&json!({ "result": 42 })));
//! # });
//! ```

mod core;
mod error;
mod invoke;
mod merge;

pub use core::{Dispatcher, DispatcherConfig};
pub use error::{translate_error, RequestError};
pub use invoke::{invoke_handler, HandlerPanic};
pub use merge::merge_reply;
