//! # Binder Module
//!
//! Turns a handler's declared [`ParameterSpec`](crate::controller::ParameterSpec)
//! list into the positional [`Args`](crate::controller::Args) it is called
//! with.
//!
//! | Spec | Bound value |
//! |---|---|
//! | `RequestBody` | the parsed body, or undefined |
//! | `QueryParam` | first value cast to its [`ValueType`](crate::controller::ValueType), or undefined |
//! | `Header` | first value (case-insensitive) cast; missing: 400 if required, else default |
//! | `HeaderMap` | request headers overlaid on the declared defaults |
//! | `PathVariable` | the variable, optionally percent-decoded; missing or empty: 404 if required, else default |
//! | `ModelAttribute` | value from the request's attribute cache, or undefined |
//! | `None` | undefined |
//!
//! Declared defaults are bound as given and never cast. Failed casts are
//! reported as 400.

mod core;
#[cfg(test)]
mod tests;

pub use core::{bind_parameter, bind_parameters, cast_value, BindingSource};
