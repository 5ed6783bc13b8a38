//! # Router Module
//!
//! Pattern-to-path matching for the dispatcher. The dispatcher only talks
//! to the [`RouteIndex`] trait; [`RadixIndex`] is the implementation built
//! by [`crate::mapping::compile`].
//!
//! ## Pattern syntax
//!
//! Patterns are `/`-separated segments. A segment written `{name}` matches
//! any single non-empty segment and is extracted as a path variable; every
//! other segment matches literally. Empty segments are ignored, so
//! `/users/` and `/users` are the same pattern.
//!
//! ## Example
//!
//! ```rust
//! use reqrouter::controller::{handler_fn, ControllerDescriptor, HandlerDescriptor, Reply, RequestMapping};
//! use reqrouter::mapping::compile;
//! use reqrouter::router::RouteIndex;
//! use std::sync::Arc;
//!
//! let pets = ControllerDescriptor::builder("pets")
//!     .root(RequestMapping::any("/pets"))
//!     .handler(
//!         "get",
//!         HandlerDescriptor::new(handler_fn(|_| async { Ok(Reply::Empty) }))
//!             .mapping(RequestMapping::get("/{id}")),
//!     )
//!     .build()
//!     .unwrap();
//! let compiled = compile(&[Arc::new(pets)]);
//!
//! let lookup = compiled.index.get_route("/pets/12").unwrap();
//! assert_eq!(lookup.path_variables.get("id"), Some("12"));
//! assert!(!compiled.index.has_route("/owners/12"));
//! ```
//!
//! ## Performance
//!
//! Lookup is O(k) in the number of path segments, and path variables are
//! kept in a `SmallVec` so paths with up to eight variables do not allocate
//! for the variable list itself.

mod core;
mod radix;

pub use core::{ParamVec, PathVariables, RouteIndex, RouteLookup, MAX_INLINE_PARAMS};
pub use radix::RadixIndex;
