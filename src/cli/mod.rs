//! # CLI Module
//!
//! The `reqrouter` binary loads a YAML controller manifest (see
//! [`crate::manifest`]), binds every handler to the echo handler and either
//! prints the compiled route table or dispatches a single request.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! ```bash
//! reqrouter routes --manifest routes.yaml
//! ```
//!
//! ### `dispatch`
//!
//! ```bash
//! reqrouter dispatch --manifest routes.yaml -X POST --target '/items?limit=5' \
//!     -H 'content-type: application/json' --body '{"name":"x"}'
//! ```
//!
//! Prints the status line, headers and rendered body. `--verbose` enables
//! structured logs on stdout, configured through `REQROUTER_LOG_*`.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{execute, parse_header_args, run_cli, Cli, Commands};
