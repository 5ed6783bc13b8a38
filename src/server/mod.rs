//! # Server Module
//!
//! Transport-facing pieces around the dispatcher. Connection handling is
//! left to the embedding transport; this module covers what sits between
//! raw request data and the dispatcher:
//!
//! - [`request`]: case-insensitive [`Headers`], query parameters and
//!   request-target parsing
//! - [`response`]: [`ResponseEntity`] and its wire rendering
//! - [`body`]: the [`BodyParser`] contract and the buffered default parser
//! - [`service`]: the [`RequestServer`] facade with lifecycle events
//!
//! ## Example
//!
//! ```rust
//! use reqrouter::controller::{handler_fn, ControllerDescriptor, HandlerDescriptor, ParameterSpec, Reply, RequestMapping};
//! use reqrouter::server::{RawRequest, RequestServer};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let server = RequestServer::with_defaults().unwrap();
//! server
//!     .attach_controller(
//!         ControllerDescriptor::builder("echo")
//!             .handler(
//!                 "post",
//!                 HandlerDescriptor::new(handler_fn(|args| async move {
//!                     Ok(Reply::from(args.get(0).to_json()))
//!                 }))
//!                 .mapping(RequestMapping::post("/echo"))
//!                 .param(ParameterSpec::body())
//!                 .body_required(),
//!             )
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//! server.start().unwrap();
//!
//! let response = server
//!     .handle(
//!         RawRequest::new("POST", "/echo")
//!             .header("Content-Type", "application/json")
//!             .body(r#"{"ping":true}"#),
//!     )
//!     .await;
//! assert_eq!(response.status, 200);
//! assert_eq!(response.header("content-type"), Some("application/json"));
//! # });
//! ```

pub mod body;
pub mod request;
pub mod response;
pub mod service;

pub use body::{BodyParser, BufferedBody};
pub use request::{parse_request_target, Headers, QueryParams, RequestTarget};
pub use response::{render, RenderedResponse, ResponseEntity};
pub use service::{ListenerId, RawRequest, RequestServer, ServerAddress, ServerError, ServerEvent};
