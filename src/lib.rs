//! TLS client configuration for HTTP conduits
//!
//! This crate applies an optional set of [`TlsParameters`] to the transport
//! conduit of an HTTP client before the client issues any request. The
//! entry point is [`TlsClientConfigurer::create`]: given no parameters it
//! returns an inert configurer, otherwise one that installs rustls client
//! settings on every client it configures.
//!
//! ```
//! use conduit_tls::params::TrustManagersParameters;
//! use conduit_tls::{
//!     ConfigurationError, EndpointConfigurer, ExecutionContext, LocalConduit,
//!     TlsClientConfigurer, TlsParameters, WebClient,
//! };
//! use std::sync::Arc;
//!
//! let params = TlsParameters {
//!     trust_managers: Some(TrustManagersParameters::new("classpath:ca.pem")),
//!     ..Default::default()
//! };
//! let configurer = TlsClientConfigurer::create(
//!     Some(Arc::new(params)),
//!     Arc::new(ExecutionContext::new("/etc/myapp").with_resource_root("tls")),
//! );
//!
//! // An in-process client cannot carry TLS settings.
//! let uri = http::Uri::from_static("https://localhost/");
//! let mut client = WebClient::new(uri, Box::new(LocalConduit::default()));
//! assert!(matches!(
//!     configurer.configure_client(&mut client),
//!     Err(ConfigurationError::UnsupportedConduit(_))
//! ));
//! ```
//!
//! The actual TLS wiring lives in [`setup::apply_tls`], which loads key and
//! trust material through an [`ExecutionContext`] and leaves the conduit
//! untouched if anything fails. With the **args** feature (on by default)
//! the parameters can be taken from command line flags with [`Args`].

#![warn(missing_docs)]

#[cfg(feature = "args")]
pub mod args;
pub mod conduit;
pub mod configurer;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod params;
pub mod setup;
#[cfg(test)]
mod testdata;

#[cfg(feature = "args")]
pub use args::Args;
pub use conduit::{Conduit, HttpConduit, LocalConduit, TlsClientSettings};
pub use configurer::{ChainedConfigurer, EndpointConfigurer, TlsClientConfigurer};
pub use context::ExecutionContext;
pub use endpoint::{ClientFactory, HttpClient, ServerEndpoint, WebClient};
pub use error::ConfigurationError;
pub use params::TlsParameters;
