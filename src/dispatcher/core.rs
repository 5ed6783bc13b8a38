use super::error::translate_error;
use super::invoke::invoke_handler;
use super::merge::merge_reply;
use crate::attributes::{resolve_model_attributes, AttributeCache};
use crate::binder::{bind_parameters, BindingSource};
use crate::controller::{parse_method, ControllerDescriptor, ControllerError};
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::mapping::{compile, CompiledTable, ControllerId};
use crate::router::RouteIndex;
use crate::server::body::BodyParser;
use crate::server::request::{parse_request_target, Headers};
use crate::server::response::ResponseEntity;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Dispatcher behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Withhold internal error messages from 500 bodies
    pub production: bool,
}

/// Routes requests to the handlers of attached controllers and folds their
/// replies into one response.
///
/// Attaching a controller recompiles the whole route table and swaps it in
/// atomically; in-flight dispatches keep the snapshot they loaded.
pub struct Dispatcher {
    controllers: Mutex<Vec<Arc<ControllerDescriptor>>>,
    table: ArcSwap<CompiledTable>,
    config: DispatcherConfig,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    #[must_use]
    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            controllers: Mutex::new(Vec::new()),
            table: ArcSwap::from_pointee(CompiledTable::default()),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> DispatcherConfig {
        self.config
    }

    /// Register a controller and publish a freshly compiled route table.
    ///
    /// # Errors
    ///
    /// Returns a [`ControllerError`] if the descriptor is not a valid
    /// controller; the current table is left untouched.
    pub fn attach_controller(
        &self,
        descriptor: ControllerDescriptor,
    ) -> Result<ControllerId, ControllerError> {
        if let Err(e) = descriptor.validate() {
            warn!(controller = %descriptor.name, error = %e, "Controller rejected");
            return Err(e);
        }

        let mut controllers = self.controllers.lock();
        let id = controllers.len();
        let name = descriptor.name.clone();
        controllers.push(Arc::new(descriptor));
        let compiled = compile(&controllers);
        let entries = compiled.table.len();
        self.table.store(Arc::new(compiled));

        info!(
            controller = %name,
            controller_id = id,
            total_controllers = controllers.len(),
            total_entries = entries,
            "Controller attached"
        );
        Ok(id)
    }

    /// Current compiled snapshot
    #[must_use]
    pub fn table(&self) -> Arc<CompiledTable> {
        self.table.load_full()
    }

    /// Names of attached controllers in attach order
    #[must_use]
    pub fn controller_names(&self) -> Vec<String> {
        self.controllers
            .lock()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// Dispatch one request and always produce a response.
    ///
    /// `target` is the raw request target (path plus optional query).
    /// `body_parser` is consulted at most once, and only if a matched
    /// handler requires the body. Every failure is translated into an
    /// error response; this never fails.
    pub async fn handle_request(
        &self,
        method: &str,
        target: &str,
        body_parser: Option<&dyn BodyParser>,
        headers: Headers,
    ) -> ResponseEntity {
        let request_id = RequestId::from_header_or_new(headers.get_first(REQUEST_ID_HEADER));
        let started = Instant::now();

        let response = match self
            .dispatch(request_id, method, target, body_parser, &headers)
            .await
        {
            Ok(response) => response,
            Err(err) => translate_error(&err, self.config.production, request_id),
        };

        // D9: Request completed
        info!(
            request_id = %request_id,
            method = %method,
            target = %target,
            status = response.status(),
            duration_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
            "Request dispatched"
        );
        response
    }

    async fn dispatch(
        &self,
        request_id: RequestId,
        method: &str,
        target: &str,
        body_parser: Option<&dyn BodyParser>,
        headers: &Headers,
    ) -> anyhow::Result<ResponseEntity> {
        let request_target = match parse_request_target(target) {
            Ok(parsed) => parsed,
            Err(e) => {
                // D1: Malformed request target
                error!(
                    request_id = %request_id,
                    target = %target,
                    error = %e,
                    "Request target could not be parsed"
                );
                return Ok(ResponseEntity::error(500, "Internal Server Error"));
            }
        };

        let method = parse_method(method)?;

        let compiled = self.table.load_full();
        let path = request_target.path.as_str();

        // D2: Route match attempt
        debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            table_entries = compiled.table.len(),
            "Route match attempt"
        );

        if compiled.table.is_empty() {
            debug!(request_id = %request_id, "No routes registered");
            return Ok(ResponseEntity::error(405, "Method Not Allowed"));
        }

        let lookup = compiled
            .index
            .has_route(path)
            .then(|| compiled.index.get_route(path))
            .flatten();
        let Some(lookup) = lookup else {
            // D3: No pattern matches the path
            debug!(request_id = %request_id, path = %path, "No route matches path");
            return Ok(ResponseEntity::error(404, "Not Found"));
        };

        let entries: Vec<_> = lookup
            .entries
            .iter()
            .filter(|entry| entry.allows(&method))
            .cloned()
            .collect();
        if entries.is_empty() {
            // D4: Path known, method not mapped
            debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                candidates = lookup.entries.len(),
                "No route accepts method"
            );
            return Ok(ResponseEntity::error(405, "Method Not Allowed"));
        }

        // D5: Routes matched
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            handlers = ?entries.iter().map(|e| e.handler_name.as_ref()).collect::<Vec<_>>(),
            path_variables = ?lookup.path_variables,
            "Routes matched"
        );

        let body = if entries.iter().any(|entry| entry.body_required) {
            let Some(parser) = body_parser else {
                // D6: Body required without parser
                error!(
                    request_id = %request_id,
                    path = %path,
                    "Matched handler requires a body but no body parser was supplied"
                );
                return Ok(ResponseEntity::error(500, "Internal Server Error"));
            };
            let parsed = parser.parse(headers).await?;
            debug!(
                request_id = %request_id,
                has_body = parsed.is_some(),
                "Request body parsed"
            );
            parsed
        } else {
            None
        };

        let base = BindingSource {
            query: &request_target.query,
            body: body.as_ref(),
            headers,
            path_variables: &lookup.path_variables,
            attributes: None,
        };
        let mut cache = AttributeCache::new();
        let mut accumulated: Option<ResponseEntity> = None;

        for entry in &entries {
            resolve_model_attributes(
                entry,
                compiled.producers_for(entry.controller),
                &mut cache,
                &base,
                request_id,
            )
            .await?;

            let args = bind_parameters(
                &entry.params,
                &BindingSource {
                    attributes: cache.for_controller(entry.controller),
                    ..base
                },
            )?;

            // D7: Handler invoked
            debug!(
                request_id = %request_id,
                controller = %entry.controller_name,
                handler = %entry.handler_name,
                arg_count = args.len(),
                "Invoking handler"
            );
            let reply =
                invoke_handler(&entry.handler, args, request_id, &entry.handler_name).await?;

            // D8: Reply merged
            debug!(
                request_id = %request_id,
                handler = %entry.handler_name,
                reply_kind = reply.kind(),
                "Merging handler reply"
            );
            accumulated = Some(merge_reply(
                accumulated,
                reply,
                request_id,
                &entry.handler_name,
            ));
        }

        Ok(accumulated.unwrap_or_else(ResponseEntity::no_content))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("controllers", &self.controller_names())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
