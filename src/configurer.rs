//! Endpoint configurers which apply TLS parameters to clients.
//!
//! An [`EndpointConfigurer`] gets a chance to adjust a [`ClientFactory`]
//! before clients are built, each [`HttpClient`] once it is built, and a
//! [`ServerEndpoint`] before it is published. [`TlsClientConfigurer`] only
//! acts on clients: it installs TLS settings on the client's conduit.
//!
//! Usage:
//!
//! ```
//! use conduit_tls::{ClientFactory, EndpointConfigurer, ExecutionContext, TlsClientConfigurer};
//! use std::sync::Arc;
//!
//! let context = Arc::new(ExecutionContext::default());
//! // No TLS parameters configured: the configurer does nothing.
//! let configurer = TlsClientConfigurer::create(None, context);
//! let client = ClientFactory::new(http::Uri::from_static("http://localhost:8080/"))
//!     .create_configured(&configurer)
//!     .unwrap();
//! # let _ = client;
//! ```

use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::endpoint::{ClientFactory, HttpClient, ServerEndpoint};
use crate::error::ConfigurationError;
use crate::params::TlsParameters;
use crate::setup::apply_tls;

/// Hooks for adjusting endpoints as they are set up.
pub trait EndpointConfigurer: Send + Sync {
    /// Adjust a factory before it builds clients.
    fn configure_factory(&self, factory: &mut ClientFactory);

    /// Adjust a client after it is built and before it sends requests.
    fn configure_client(&self, client: &mut dyn HttpClient) -> Result<(), ConfigurationError>;

    /// Adjust a server endpoint before it is published.
    fn configure_server(&self, server: &mut ServerEndpoint);
}

/// Configurer applying [`TlsParameters`] to the conduit of each client.
///
/// Which variant is used is decided once by [`TlsClientConfigurer::create`]
/// and never changes afterwards.
#[derive(Clone, Debug, Default)]
pub enum TlsClientConfigurer {
    /// No TLS parameters were given. Every hook does nothing.
    #[default]
    NoOp,
    /// TLS parameters are applied to every client configured.
    WithTls {
        /// Parameters to apply.
        parameters: Arc<TlsParameters>,
        /// Context used to load the key and trust material.
        context: Arc<ExecutionContext>,
    },
}

impl TlsClientConfigurer {
    /// Select the configurer for `parameters`. Validation of the
    /// parameters is deferred until a client is configured.
    pub fn create(parameters: Option<Arc<TlsParameters>>, context: Arc<ExecutionContext>) -> Self {
        match parameters {
            None => Self::NoOp,
            Some(parameters) => Self::WithTls {
                parameters,
                context,
            },
        }
    }

    /// Whether clients configured by this will have TLS settings applied.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::WithTls { .. })
    }
}

impl EndpointConfigurer for TlsClientConfigurer {
    fn configure_factory(&self, _: &mut ClientFactory) {}

    fn configure_client(&self, client: &mut dyn HttpClient) -> Result<(), ConfigurationError> {
        let Self::WithTls {
            parameters,
            context,
        } = self
        else {
            return Ok(());
        };
        let conduit = client.conduit_mut();
        let kind = conduit.kind();
        let http = conduit
            .as_http_conduit_mut()
            .ok_or(ConfigurationError::UnsupportedConduit(kind))?;
        apply_tls(http, parameters, context)
    }

    fn configure_server(&self, _: &mut ServerEndpoint) {}
}

/// Runs several configurers in order.
#[derive(Default)]
pub struct ChainedConfigurer(Vec<Box<dyn EndpointConfigurer>>);

impl ChainedConfigurer {
    /// An empty chain, which does nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `configurer` to the chain.
    pub fn add(&mut self, configurer: impl EndpointConfigurer + 'static) -> &mut Self {
        self.0.push(Box::new(configurer));
        self
    }

    /// Number of configurers in the chain.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for ChainedConfigurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "ChainedConfigurer({} configurers)", self.0.len())
    }
}

impl EndpointConfigurer for ChainedConfigurer {
    fn configure_factory(&self, factory: &mut ClientFactory) {
        for c in &self.0 {
            c.configure_factory(factory);
        }
    }

    fn configure_client(&self, client: &mut dyn HttpClient) -> Result<(), ConfigurationError> {
        self.0.iter().try_for_each(|c| c.configure_client(client))
    }

    fn configure_server(&self, server: &mut ServerEndpoint) {
        for c in &self.0 {
            c.configure_server(server);
        }
    }
}
