//! Clients, client factories and server endpoints that configurers act on.

use http::Uri;

use crate::conduit::{Conduit, HttpConduit, LocalConduit};
use crate::configurer::EndpointConfigurer;
use crate::error::ConfigurationError;

/// A live HTTP client bound to a transport conduit.
pub trait HttpClient {
    /// Base address requests are sent to.
    fn address(&self) -> &Uri;

    /// The client's transport conduit, for reconfiguring in place.
    fn conduit_mut(&mut self) -> &mut dyn Conduit;
}

/// HTTP client over a boxed [`Conduit`].
#[derive(Debug)]
pub struct WebClient {
    address: Uri,
    conduit: Box<dyn Conduit>,
}

impl WebClient {
    /// A client for `address` using `conduit` as transport.
    pub fn new(address: Uri, conduit: Box<dyn Conduit>) -> Self {
        Self { address, conduit }
    }

    /// A client for `address` over a fresh [`HttpConduit`].
    pub fn http(address: Uri) -> Self {
        let conduit = Box::new(HttpConduit::new(address.clone()));
        Self::new(address, conduit)
    }

    /// Shared view of the transport conduit.
    pub fn conduit(&self) -> &dyn Conduit {
        &*self.conduit
    }
}

impl HttpClient for WebClient {
    fn address(&self) -> &Uri {
        &self.address
    }

    fn conduit_mut(&mut self) -> &mut dyn Conduit {
        &mut *self.conduit
    }
}

/// Which transport a [`ClientFactory`] builds clients on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransportKind {
    /// Network transport through an [`HttpConduit`].
    #[default]
    Http,
    /// In-process transport through a [`LocalConduit`].
    Local,
}

/// Builds [`WebClient`]s for one address.
#[derive(Clone, Debug)]
pub struct ClientFactory {
    /// Address of the clients built.
    pub address: Uri,
    /// Transport of the clients built.
    pub transport: TransportKind,
}

impl ClientFactory {
    /// A factory for HTTP clients to `address`.
    pub fn new(address: Uri) -> Self {
        Self {
            address,
            transport: TransportKind::Http,
        }
    }

    /// Build an unconfigured client.
    pub fn create(&self) -> WebClient {
        match self.transport {
            TransportKind::Http => WebClient::http(self.address.clone()),
            TransportKind::Local => WebClient::new(
                self.address.clone(),
                Box::new(LocalConduit {
                    destination: self.address.to_string(),
                }),
            ),
        }
    }

    /// Run `configurer` over the factory and then over a freshly built
    /// client, returning the client once it is configured.
    pub fn create_configured(
        mut self,
        configurer: &dyn EndpointConfigurer,
    ) -> Result<WebClient, ConfigurationError> {
        configurer.configure_factory(&mut self);
        let mut client = self.create();
        configurer.configure_client(&mut client)?;
        Ok(client)
    }
}

/// A server endpoint published at an address.
#[derive(Clone, Debug)]
pub struct ServerEndpoint {
    /// Address the endpoint listens on.
    pub address: Uri,
}

impl ServerEndpoint {
    /// An endpoint at `address`.
    pub fn new(address: Uri) -> Self {
        Self { address }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_requested_transport() {
        let mut f = ClientFactory::new(Uri::from_static("https://example.com/api"));
        let mut c = f.create();
        assert_eq!(c.address(), "https://example.com/api");
        assert_eq!(c.conduit().kind(), "http");
        let http = c.conduit_mut().as_http_conduit_mut().expect("http conduit");
        assert_eq!(http.address(), "https://example.com/api");

        f.transport = TransportKind::Local;
        let mut c = f.create();
        assert_eq!(c.conduit().kind(), "local");
        assert!(c.conduit_mut().as_http_conduit_mut().is_none());
    }
}
