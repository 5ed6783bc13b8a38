//! # Controller Module
//!
//! Declarative controller registration. A controller is a named group of
//! handlers with optional root mappings; every handler declares its own
//! mappings, positional parameter specs, the model attributes it produces
//! and whether it needs the request body.
//!
//! ## Example
//!
//! ```rust
//! use reqrouter::controller::{
//!     handler_fn, ControllerDescriptor, HandlerDescriptor, ParameterSpec, Reply,
//!     RequestMapping, ValueType,
//! };
//! use serde_json::json;
//!
//! let users = ControllerDescriptor::builder("users")
//!     .root(RequestMapping::any("/users"))
//!     .handler(
//!         "get",
//!         HandlerDescriptor::new(handler_fn(|args| async move {
//!             Ok(Reply::from(json!({ "id": args.str(0) })))
//!         }))
//!         .mapping(RequestMapping::get("/{id}"))
//!         .param(ParameterSpec::path_variable("id")),
//!     )
//!     .handler(
//!         "search",
//!         HandlerDescriptor::new(handler_fn(|args| async move {
//!             Ok(Reply::from(json!([args.i64(0)])))
//!         }))
//!         .mapping(RequestMapping::get("/"))
//!         .param(ParameterSpec::query("limit", ValueType::Integer)),
//!     )
//!     .build()
//!     .expect("valid controller");
//! assert_eq!(users.handlers.len(), 2);
//! ```
//!
//! ## Replies
//!
//! Handlers return a [`Reply`]; the variant decides how multiple handlers
//! matched on one path are combined (see [`crate::dispatcher`]).

mod descriptor;
mod types;

pub use descriptor::{
    handler_fn, ControllerBuilder, ControllerDescriptor, ControllerError, HandlerDescriptor,
    HandlerFn,
};
pub use types::{
    parse_method, Arg, Args, ParameterSpec, Reply, RequestMapping, ValueType, STANDARD_METHODS,
};
