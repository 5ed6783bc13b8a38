//! # reqrouter
//!
//! **reqrouter** is a request dispatch and parameter-binding engine: it turns
//! declarative controller registrations into a routing table, matches an
//! inbound `(method, path)` against it, binds handler arguments from the
//! request, resolves per-request model attributes and folds the replies of
//! every matched handler into one response.
//!
//! ## Architecture
//!
//! Leaf first:
//!
//! - **[`controller`]** - Controller and handler descriptors, parameter specs, replies
//! - **[`router`]** - Route index: `{name}` path patterns on a radix tree
//! - **[`mapping`]** - Compiles attached controllers into an immutable route table
//! - **[`binder`]** - Binds one parameter spec against request data
//! - **[`attributes`]** - Resolves model attributes in registration order
//! - **[`dispatcher`]** - Orchestrates a request, merges replies, translates errors
//! - **[`server`]** - Headers, response entities, body parsing, request server facade
//! - **[`manifest`]** / **[`cli`]** - YAML-declared controllers and the `reqrouter` binary
//! - **[`logging`]** / **[`runtime_config`]** - Environment-driven ambient setup
//!
//! ## Quick Start
//!
//! ```rust
//! use reqrouter::controller::{handler_fn, ControllerDescriptor, HandlerDescriptor, ParameterSpec, Reply, RequestMapping, ValueType};
//! use reqrouter::dispatcher::Dispatcher;
//! use reqrouter::server::Headers;
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let dispatcher = Dispatcher::new();
//! let pets = ControllerDescriptor::builder("pets")
//!     .root(RequestMapping::any("/pets"))
//!     .handler(
//!         "get",
//!         HandlerDescriptor::new(handler_fn(|args| async move {
//!             Ok(Reply::from(json!({ "id": args.str(0), "owner": args.value(1) })))
//!         }))
//!         .mapping(RequestMapping::get("/{id}"))
//!         .param(ParameterSpec::path_variable("id"))
//!         .param(ParameterSpec::model_attribute("owner")),
//!     )
//!     .handler(
//!         "owner",
//!         HandlerDescriptor::new(handler_fn(|args| async move {
//!             Ok(Reply::from(json!(args.str(0).unwrap_or("nobody"))))
//!         }))
//!         .param(ParameterSpec::header("x-user", ValueType::String))
//!         .produces("owner"),
//!     )
//!     .build()
//!     .unwrap();
//! dispatcher.attach_controller(pets).unwrap();
//!
//! let headers: Headers = [("X-User", "ada")].into_iter().collect();
//! let response = dispatcher.handle_request("GET", "/pets/7", None, headers).await;
//! assert_eq!(response.body(), Some(&json!({ "id": "7", "owner": "ada" })));
//!
//! let response = dispatcher.handle_request("DELETE", "/pets/7", None, Headers::new()).await;
//! assert_eq!(response.status(), 405);
//! # });
//! ```
//!
//! ## Concurrency
//!
//! Each request runs as one sequential task; its handlers are awaited one
//! after another. The only shared state is the compiled route table, which
//! is rebuilt on attach and swapped atomically.

pub mod attributes;
pub mod binder;
pub mod cli;
pub mod controller;
pub mod dispatcher;
pub mod echo;
pub mod ids;
pub mod logging;
pub mod manifest;
pub mod mapping;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use controller::{
    handler_fn, ControllerDescriptor, HandlerDescriptor, ParameterSpec, Reply, RequestMapping,
    ValueType,
};
pub use dispatcher::{Dispatcher, DispatcherConfig, RequestError};
pub use server::{Headers, RequestServer, ResponseEntity};
