use super::body::{BodyParser, BufferedBody};
use super::request::Headers;
use super::response::{render, RenderedResponse};
use crate::controller::{ControllerDescriptor, ControllerError};
use crate::dispatcher::{Dispatcher, DispatcherConfig};
use crate::mapping::ControllerId;
use crate::runtime_config::{RuntimeConfig, DEFAULT_SERVER_URL};
use parking_lot::Mutex;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Validated `http://host:port` address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl FromStr for ServerAddress {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = url::Url::parse(s.trim()).map_err(|e| ServerError::InvalidUrl {
            url: s.to_string(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" {
            return Err(ServerError::UnsupportedScheme(url.scheme().to_string()));
        }
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ServerError::InvalidUrl {
                url: s.to_string(),
                reason: "missing host".to_string(),
            })?;
        Ok(ServerAddress {
            host: host.to_string(),
            port: url.port_or_known_default().unwrap_or(80),
        })
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}:{}", self.host, self.port)
    }
}

/// Request server configuration and lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerError {
    InvalidUrl { url: String, reason: String },
    /// Only plain `http` is served
    UnsupportedScheme(String),
    AlreadyRunning,
    NotRunning,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::InvalidUrl { url, reason } => {
                write!(f, "Invalid server url '{url}': {reason}")
            }
            ServerError::UnsupportedScheme(scheme) => {
                write!(f, "Unsupported server url scheme '{scheme}', expected http")
            }
            ServerError::AlreadyRunning => write!(f, "Server is already running"),
            ServerError::NotRunning => write!(f, "Server is not running"),
        }
    }
}

impl std::error::Error for ServerError {}

/// Lifecycle notifications delivered to listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    ControllerAttached { name: String, id: ControllerId },
    Started { address: ServerAddress },
    Stopped,
}

/// Handle returned by [`RequestServer::on`], used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&ServerEvent) + Send + Sync>;

/// Raw request as handed over by a transport
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub method: String,
    /// Path plus optional query string
    pub target: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl RawRequest {
    #[must_use]
    pub fn new(method: &str, target: &str) -> Self {
        Self {
            method: method.to_string(),
            target: target.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// Facade tying a [`Dispatcher`] to an address and lifecycle events.
///
/// The server does not own sockets: a transport feeds it [`RawRequest`]s
/// through [`RequestServer::handle`] and writes back the
/// [`RenderedResponse`]. `start` and `stop` only move the lifecycle state
/// and notify listeners.
pub struct RequestServer {
    address: ServerAddress,
    dispatcher: Dispatcher,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
    running: AtomicBool,
}

impl RequestServer {
    /// Server at `url` with the given dispatcher configuration
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if `url` is not a valid `http` URL.
    pub fn new(url: &str, config: DispatcherConfig) -> Result<Self, ServerError> {
        let address: ServerAddress = url.parse()?;
        debug!(address = %address, production = config.production, "Request server created");
        Ok(Self {
            address,
            dispatcher: Dispatcher::with_config(config),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(0),
            running: AtomicBool::new(false),
        })
    }

    /// Server at [`DEFAULT_SERVER_URL`] in development mode
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature mirrors [`RequestServer::new`].
    pub fn with_defaults() -> Result<Self, ServerError> {
        Self::new(DEFAULT_SERVER_URL, DispatcherConfig::default())
    }

    /// # Errors
    ///
    /// Returns [`ServerError`] if the configured URL is invalid.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, ServerError> {
        Self::new(&config.server_url, config.dispatcher_config())
    }

    #[must_use]
    pub fn address(&self) -> &ServerAddress {
        &self.address
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Register a lifecycle listener
    pub fn on<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ServerEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    /// Unregister a listener; returns whether it was registered
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    fn emit(&self, event: &ServerEvent) {
        // Snapshot so listeners may register or unregister while being notified
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        debug!(event = ?event, listeners = listeners.len(), "Emitting server event");
        for listener in listeners {
            listener(event);
        }
    }

    /// Attach a controller to the underlying dispatcher
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] for an invalid descriptor.
    pub fn attach_controller(
        &self,
        descriptor: ControllerDescriptor,
    ) -> Result<ControllerId, ControllerError> {
        let name = descriptor.name.clone();
        let id = self.dispatcher.attach_controller(descriptor)?;
        self.emit(&ServerEvent::ControllerAttached { name, id });
        Ok(id)
    }

    /// # Errors
    ///
    /// [`ServerError::AlreadyRunning`] if started twice.
    pub fn start(&self) -> Result<(), ServerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!(address = %self.address, "Start requested while already running");
            return Err(ServerError::AlreadyRunning);
        }
        info!(
            address = %self.address,
            controllers = ?self.dispatcher.controller_names(),
            "Request server started"
        );
        self.emit(&ServerEvent::Started {
            address: self.address.clone(),
        });
        Ok(())
    }

    /// # Errors
    ///
    /// [`ServerError::NotRunning`] if the server was not started.
    pub fn stop(&self) -> Result<(), ServerError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(ServerError::NotRunning);
        }
        info!(address = %self.address, "Request server stopped");
        self.emit(&ServerEvent::Stopped);
        Ok(())
    }

    /// Dispatch a raw request and render the response for the wire.
    ///
    /// The body is buffered and decoded according to its Content-Type only
    /// if a matched handler asks for it.
    pub async fn handle(&self, request: RawRequest) -> RenderedResponse {
        let RawRequest {
            method,
            target,
            headers,
            body,
        } = request;
        let parser: &dyn BodyParser = &BufferedBody(body);
        let entity = self
            .dispatcher
            .handle_request(&method, &target, Some(parser), headers)
            .await;
        render(&entity)
    }
}

impl fmt::Debug for RequestServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestServer")
            .field("address", &self.address)
            .field("running", &self.is_running())
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
