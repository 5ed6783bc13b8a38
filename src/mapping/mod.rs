//! # Mapping Module
//!
//! Compiles attached controller descriptors into an immutable
//! [`CompiledTable`]:
//!
//! - a [`RouteTable`] of path pattern → [`RouteMappingEntry`] list, in
//!   registration order
//! - a [`RadixIndex`](crate::router::RadixIndex) over the same entries
//! - per controller, the ordered list of model attribute producers
//!
//! The table is rebuilt from scratch on every attach and never mutated
//! afterwards; the dispatcher swaps the whole snapshot.
//!
//! ## Method sets
//!
//! An empty method set means "any method". When a controller root and a
//! handler mapping both declare methods, only their intersection is
//! registered, and the combination is dropped if they share none.

mod core;
#[cfg(test)]
mod tests;

pub use core::{
    common_methods, compile, join_route_paths, AttributeProducer, CompiledTable, ControllerId,
    RouteMappingEntry, RouteTable,
};
