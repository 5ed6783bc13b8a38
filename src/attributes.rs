//! Model attribute resolution.
//!
//! A model attribute is a named value computed by a designated handler on
//! the same controller (its producer) and injected into sibling handlers
//! through [`ParameterSpec::ModelAttribute`](crate::controller::ParameterSpec).
//! Values are computed at most once per request and controller.
//!
//! Producers run strictly in registration order, so a producer may consume
//! attributes registered before it. There is no dependency graph and no
//! cycle detection: registration order is the contract.

use crate::binder::{bind_parameters, BindingSource};
use crate::controller::Arg;
use crate::dispatcher::invoke_handler;
use crate::ids::RequestId;
use crate::mapping::{AttributeProducer, ControllerId, RouteMappingEntry};
use std::collections::HashMap;
use tracing::debug;

/// Request-scoped cache of resolved attributes, keyed by controller
#[derive(Debug, Default)]
pub struct AttributeCache {
    by_controller: HashMap<ControllerId, HashMap<String, Arg>>,
}

impl AttributeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes resolved so far for `controller`
    #[must_use]
    pub fn for_controller(&self, controller: ControllerId) -> Option<&HashMap<String, Arg>> {
        self.by_controller.get(&controller)
    }

    #[must_use]
    pub fn contains(&self, controller: ControllerId, name: &str) -> bool {
        self.by_controller
            .get(&controller)
            .is_some_and(|attributes| attributes.contains_key(name))
    }

    #[must_use]
    pub fn get(&self, controller: ControllerId, name: &str) -> Option<&Arg> {
        self.by_controller.get(&controller)?.get(name)
    }

    pub fn insert(&mut self, controller: ControllerId, name: &str, value: Arg) {
        self.by_controller
            .entry(controller)
            .or_default()
            .insert(name.to_string(), value);
    }
}

/// Compute the attributes `entry` consumes that are not cached yet.
///
/// `producers` are the owning controller's producers in registration order;
/// attributes with no producer are left out and later bind as undefined.
/// Each producer sees the attributes resolved before it.
///
/// # Errors
///
/// Propagates binding failures, producer errors and structured error
/// replies from producers; nothing is cached for a failed producer.
pub async fn resolve_model_attributes(
    entry: &RouteMappingEntry,
    producers: &[AttributeProducer],
    cache: &mut AttributeCache,
    source: &BindingSource<'_>,
    request_id: RequestId,
) -> anyhow::Result<()> {
    let consumed: Vec<&str> = entry.consumed_attributes().collect();
    if consumed.is_empty() {
        return Ok(());
    }

    for producer in producers {
        if !consumed.contains(&producer.attribute.as_str())
            || cache.contains(entry.controller, &producer.attribute)
        {
            continue;
        }

        let args = {
            let scoped = BindingSource {
                attributes: cache.for_controller(entry.controller),
                ..*source
            };
            bind_parameters(&producer.params, &scoped)?
        };

        // MA1: Producer invoked
        debug!(
            request_id = %request_id,
            controller = %entry.controller_name,
            attribute = %producer.attribute,
            producer = %producer.handler_name,
            "Resolving model attribute"
        );

        let reply =
            invoke_handler(&producer.handler, args, request_id, &producer.handler_name).await?;
        let kind = reply.kind();
        let value = reply.into_attribute()?;

        // MA2: Attribute cached
        debug!(
            request_id = %request_id,
            controller = %entry.controller_name,
            attribute = %producer.attribute,
            reply_kind = kind,
            undefined = value.is_undefined(),
            "Model attribute resolved"
        );
        cache.insert(entry.controller, &producer.attribute, value);
    }

    Ok(())
}
