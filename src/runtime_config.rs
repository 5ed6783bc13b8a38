//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the dispatcher and the
//! request server.
//!
//! ## Environment Variables
//!
//! ### `REQROUTER_ENV` / `APP_ENV`
//!
//! `production` (case-insensitive) switches the dispatcher to production
//! mode: bodies of unclassified 500 responses no longer carry the internal
//! error message. `REQROUTER_ENV` wins when both are set.
//!
//! Default: development.
//!
//! ### `REQROUTER_SERVER_URL`
//!
//! URL the [`RequestServer`](crate::server::RequestServer) reports as its
//! address. Only `http` URLs are accepted.
//!
//! Default: `http://localhost:3000`
//!
//! Logging variables are read by [`crate::logging::LogConfig::from_env`].
//!
//! ## Usage
//!
//! ```rust
//! use reqrouter::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("production: {}", config.production);
//! ```
//!
//! ## Example Configuration
//!
//! ```bash
//! export REQROUTER_ENV=production
//! export REQROUTER_SERVER_URL=http://0.0.0.0:8080
//! reqrouter dispatch --manifest routes.yaml --method GET --target /health
//! ```

use crate::dispatcher::DispatcherConfig;
use std::env;

/// Default address of the request server
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Hide internal error messages in 500 responses
    pub production: bool,
    /// Address reported by the request server
    pub server_url: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            production: false,
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = lookup("REQROUTER_ENV").or_else(|| lookup("APP_ENV"));
        let production = environment
            .as_deref()
            .is_some_and(|env| env.trim().eq_ignore_ascii_case("production"));
        let server_url = lookup("REQROUTER_SERVER_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        RuntimeConfig {
            production,
            server_url,
        }
    }

    #[must_use]
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            production: self.production,
        }
    }
}
