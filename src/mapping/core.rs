use crate::controller::{ControllerDescriptor, HandlerFn, ParameterSpec};
use crate::router::RadixIndex;
use http::Method;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Position of a controller in attach order
pub type ControllerId = usize;

/// One `(methods, path, controller, handler)` registration.
///
/// Immutable once compiled; shared between the [`RouteTable`] and the
/// route index through `Arc`.
#[derive(Clone)]
pub struct RouteMappingEntry {
    /// Accepted methods; empty accepts any method
    pub methods: Vec<Method>,
    /// Full joined path pattern, e.g. `/users/{id}`
    pub path: String,
    pub controller: ControllerId,
    pub controller_name: Arc<str>,
    pub handler_name: Arc<str>,
    pub params: Arc<[ParameterSpec]>,
    pub body_required: bool,
    pub handler: HandlerFn,
}

impl RouteMappingEntry {
    /// Whether this entry accepts `method`
    #[inline]
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }

    /// Attribute names consumed by this entry's parameters, in parameter order
    pub fn consumed_attributes(&self) -> impl Iterator<Item = &str> {
        self.params.iter().filter_map(ParameterSpec::attribute_name)
    }

    /// `GET,POST` style label for logs and the CLI; `*` for any method
    #[must_use]
    pub fn methods_label(&self) -> String {
        if self.methods.is_empty() {
            return "*".to_string();
        }
        self.methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Debug for RouteMappingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMappingEntry")
            .field("methods", &self.methods)
            .field("path", &self.path)
            .field("controller", &self.controller_name)
            .field("handler", &self.handler_name)
            .field("params", &self.params)
            .field("body_required", &self.body_required)
            .finish_non_exhaustive()
    }
}

/// Handler registered as the producer of one model attribute
#[derive(Clone)]
pub struct AttributeProducer {
    pub attribute: String,
    pub handler_name: Arc<str>,
    pub params: Arc<[ParameterSpec]>,
    pub handler: HandlerFn,
}

impl fmt::Debug for AttributeProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeProducer")
            .field("attribute", &self.attribute)
            .field("handler", &self.handler_name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Path pattern → entries, in first-registration order of the paths
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<(String, Vec<Arc<RouteMappingEntry>>)>,
}

impl RouteTable {
    fn push(&mut self, entry: Arc<RouteMappingEntry>) {
        match self.routes.iter_mut().find(|(path, _)| *path == entry.path) {
            Some((_, entries)) => entries.push(entry),
            None => self.routes.push((entry.path.clone(), vec![entry])),
        }
    }

    /// True when no entry was registered at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of entries across all paths
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.iter().map(|(_, entries)| entries.len()).sum()
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&[Arc<RouteMappingEntry>]> {
        self.routes
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Arc<RouteMappingEntry>])> {
        self.routes
            .iter()
            .map(|(path, entries)| (path.as_str(), entries.as_slice()))
    }

    /// Every entry in table order
    pub fn entries(&self) -> impl Iterator<Item = &Arc<RouteMappingEntry>> {
        self.routes.iter().flat_map(|(_, entries)| entries.iter())
    }
}

/// Immutable snapshot produced by [`compile`]: the route table, its
/// index and the attribute producers of every controller
#[derive(Debug, Clone, Default)]
pub struct CompiledTable {
    pub table: RouteTable,
    /// Indexed by [`ControllerId`]; first producer of a name wins
    pub producers: Vec<Vec<AttributeProducer>>,
    pub index: RadixIndex,
}

impl CompiledTable {
    /// Producers registered by `controller`, in registration order
    #[must_use]
    pub fn producers_for(&self, controller: ControllerId) -> &[AttributeProducer] {
        self.producers
            .get(controller)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Join a root path and a handler path with exactly one `/`.
///
/// ```rust
/// use reqrouter::mapping::join_route_paths;
///
/// assert_eq!(join_route_paths("/users/", "/{id}"), "/users/{id}");
/// assert_eq!(join_route_paths("/users", ""), "/users");
/// assert_eq!(join_route_paths("", "health"), "/health");
/// ```
#[must_use]
pub fn join_route_paths(root: &str, path: &str) -> String {
    let root = root.trim();
    let path = path.trim().trim_matches('/');
    if path.is_empty() {
        return if root.is_empty() {
            "/".to_string()
        } else {
            root.to_string()
        };
    }
    if root.is_empty() {
        return format!("/{path}");
    }
    format!("{}/{path}", root.trim_end_matches('/'))
}

/// Methods accepted by a root × handler combination.
///
/// Returns `None` when both sides declare methods and share none; an empty
/// result means any method.
#[must_use]
pub fn common_methods(root: &[Method], handler: &[Method]) -> Option<Vec<Method>> {
    match (root.is_empty(), handler.is_empty()) {
        (true, _) => Some(handler.to_vec()),
        (false, true) => Some(root.to_vec()),
        (false, false) => {
            let shared: Vec<Method> = handler
                .iter()
                .filter(|m| root.contains(m))
                .cloned()
                .collect();
            (!shared.is_empty()).then_some(shared)
        }
    }
}

/// Flatten controller descriptors into a [`CompiledTable`].
///
/// Controllers with root mappings contribute every
/// `(root path, root methods) × handler × (handler path, handler methods)`
/// combination whose method intersection is not empty; controllers without
/// root mappings register their handler mappings as global routes.
#[must_use]
pub fn compile(controllers: &[Arc<ControllerDescriptor>]) -> CompiledTable {
    let mut compiled = CompiledTable::default();

    for (controller_id, controller) in controllers.iter().enumerate() {
        let controller_name: Arc<str> = Arc::from(controller.name.as_str());
        let mut producers: Vec<AttributeProducer> = Vec::new();
        let mut seen_attributes: HashSet<&str> = HashSet::new();
        let mut skipped = 0usize;

        for (handler_name, handler) in &controller.handlers {
            let handler_name: Arc<str> = Arc::from(handler_name.as_str());
            let params: Arc<[ParameterSpec]> = Arc::from(handler.params.as_slice());

            for attribute in &handler.produces {
                if seen_attributes.insert(attribute.as_str()) {
                    producers.push(AttributeProducer {
                        attribute: attribute.clone(),
                        handler_name: Arc::clone(&handler_name),
                        params: Arc::clone(&params),
                        handler: Arc::clone(&handler.handler),
                    });
                } else {
                    debug!(
                        controller = %controller_name,
                        handler = %handler_name,
                        attribute = %attribute,
                        "Duplicate attribute producer ignored"
                    );
                }
            }

            let mut register = |methods: Vec<Method>, path: String| {
                let entry = Arc::new(RouteMappingEntry {
                    methods,
                    path,
                    controller: controller_id,
                    controller_name: Arc::clone(&controller_name),
                    handler_name: Arc::clone(&handler_name),
                    params: Arc::clone(&params),
                    body_required: handler.body_required,
                    handler: Arc::clone(&handler.handler),
                });
                compiled.index.insert(&entry.path, Arc::clone(&entry));
                compiled.table.push(entry);
            };

            if controller.mappings.is_empty() {
                for mapping in &handler.mappings {
                    for path in &mapping.paths {
                        register(mapping.methods.clone(), join_route_paths("", path));
                    }
                }
                continue;
            }

            for root in &controller.mappings {
                for root_path in &root.paths {
                    for mapping in &handler.mappings {
                        let Some(methods) = common_methods(&root.methods, &mapping.methods)
                        else {
                            skipped += mapping.paths.len();
                            continue;
                        };
                        for path in &mapping.paths {
                            register(methods.clone(), join_route_paths(root_path, path));
                        }
                    }
                }
            }
        }

        // MC1: Controller compiled
        debug!(
            controller = %controller_name,
            controller_id = controller_id,
            producers = producers.len(),
            skipped_combinations = skipped,
            "Controller mappings compiled"
        );
        compiled.producers.push(producers);
    }

    // MC2: Route table built
    let summary: Vec<String> = compiled
        .table
        .entries()
        .take(10)
        .map(|e| format!("{} {}", e.methods_label(), e.path))
        .collect();
    info!(
        controllers = controllers.len(),
        paths = compiled.table.routes.len(),
        entries = compiled.table.len(),
        routes_summary = ?summary,
        "Route table compiled"
    );

    compiled
}
