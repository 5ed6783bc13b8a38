use super::types::{Args, ParameterSpec, Reply, RequestMapping};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Type-erased asynchronous handler.
///
/// Receives the positional arguments bound from its parameter specs and
/// returns a [`Reply`]. Any error other than a
/// [`RequestError`](crate::dispatcher::RequestError) becomes a 500.
pub type HandlerFn = Arc<dyn Fn(Args) -> BoxFuture<'static, anyhow::Result<Reply>> + Send + Sync>;

/// Wrap an async closure as a [`HandlerFn`]
///
/// ```rust
/// use reqrouter::controller::{handler_fn, Reply};
/// use serde_json::json;
///
/// let hello = handler_fn(|args| async move {
///     let name = args.str(0).unwrap_or("world").to_string();
///     Ok(Reply::from(json!({ "hello": name })))
/// });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Reply>> + Send + 'static,
{
    Arc::new(move |args| f(args).boxed())
}

/// One named handler on a controller
#[derive(Clone)]
pub struct HandlerDescriptor {
    pub mappings: Vec<RequestMapping>,
    pub params: Vec<ParameterSpec>,
    /// Model attributes this handler produces, in declaration order
    pub produces: Vec<String>,
    pub body_required: bool,
    pub handler: HandlerFn,
}

impl HandlerDescriptor {
    #[must_use]
    pub fn new(handler: HandlerFn) -> Self {
        Self {
            mappings: Vec::new(),
            params: Vec::new(),
            produces: Vec::new(),
            body_required: false,
            handler,
        }
    }

    #[must_use]
    pub fn mapping(mut self, mapping: RequestMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    #[must_use]
    pub fn param(mut self, spec: ParameterSpec) -> Self {
        self.params.push(spec);
        self
    }

    #[must_use]
    pub fn params(mut self, specs: impl IntoIterator<Item = ParameterSpec>) -> Self {
        self.params.extend(specs);
        self
    }

    /// Declare this handler as the producer of model attribute `name`
    #[must_use]
    pub fn produces(mut self, name: &str) -> Self {
        self.produces.push(name.to_string());
        self
    }

    #[must_use]
    pub fn body_required(mut self) -> Self {
        self.body_required = true;
        self
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("mappings", &self.mappings)
            .field("params", &self.params)
            .field("produces", &self.produces)
            .field("body_required", &self.body_required)
            .finish_non_exhaustive()
    }
}

/// Controller metadata: root mappings plus named handlers in
/// registration order.
///
/// Built with [`ControllerDescriptor::builder`] at startup and handed to
/// [`Dispatcher::attach_controller`](crate::dispatcher::Dispatcher::attach_controller).
#[derive(Debug, Clone)]
pub struct ControllerDescriptor {
    pub name: String,
    /// Root mappings; empty means handler mappings are global routes
    pub mappings: Vec<RequestMapping>,
    pub handlers: Vec<(String, HandlerDescriptor)>,
}

impl ControllerDescriptor {
    #[must_use]
    pub fn builder(name: &str) -> ControllerBuilder {
        ControllerBuilder {
            name: name.to_string(),
            mappings: Vec::new(),
            handlers: Vec::new(),
        }
    }

    #[must_use]
    pub fn handler(&self, name: &str) -> Option<&HandlerDescriptor> {
        self.handlers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, h)| h)
    }

    /// Check that the descriptor has the shape of a controller.
    ///
    /// # Errors
    ///
    /// See [`ControllerError`] for the rejected shapes.
    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.name.trim().is_empty() {
            return Err(ControllerError::MissingName);
        }
        if self.handlers.is_empty() {
            return Err(ControllerError::NoHandlers {
                controller: self.name.clone(),
            });
        }
        let mut seen = HashSet::new();
        for (name, _) in &self.handlers {
            if name.trim().is_empty() {
                return Err(ControllerError::UnnamedHandler {
                    controller: self.name.clone(),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(ControllerError::DuplicateHandler {
                    controller: self.name.clone(),
                    handler: name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Builder for [`ControllerDescriptor`]
#[derive(Debug)]
pub struct ControllerBuilder {
    name: String,
    mappings: Vec<RequestMapping>,
    handlers: Vec<(String, HandlerDescriptor)>,
}

impl ControllerBuilder {
    /// Add a root mapping shared by every handler
    #[must_use]
    pub fn root(mut self, mapping: RequestMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    #[must_use]
    pub fn handler(mut self, name: &str, handler: HandlerDescriptor) -> Self {
        self.handlers.push((name.to_string(), handler));
        self
    }

    /// # Errors
    ///
    /// Returns a [`ControllerError`] when the result would not be a valid controller.
    pub fn build(self) -> Result<ControllerDescriptor, ControllerError> {
        let descriptor = ControllerDescriptor {
            name: self.name,
            mappings: self.mappings,
            handlers: self.handlers,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}

/// Rejected controller shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// Controller name is empty
    MissingName,
    /// Controller declares no handlers at all
    NoHandlers {
        controller: String,
    },
    /// A handler has an empty name
    UnnamedHandler {
        controller: String,
    },
    /// Two handlers share one name
    DuplicateHandler {
        controller: String,
        handler: String,
    },
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::MissingName => {
                write!(f, "The provided controller was not a request controller: missing name")
            }
            ControllerError::NoHandlers { controller } => write!(
                f,
                "The provided controller '{controller}' was not a request controller: no handlers"
            ),
            ControllerError::UnnamedHandler { controller } => {
                write!(f, "Controller '{controller}' has a handler without a name")
            }
            ControllerError::DuplicateHandler {
                controller,
                handler,
            } => write!(
                f,
                "Controller '{controller}' declares handler '{handler}' more than once"
            ),
        }
    }
}

impl std::error::Error for ControllerError {}
