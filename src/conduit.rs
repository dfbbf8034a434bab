//! Transport conduits owned by HTTP clients.
//!
//! A conduit is the part of a client that holds the network connection
//! settings. Only some conduits carry TLS settings; they advertise this
//! through [`Conduit::as_http_conduit_mut`] instead of callers having to
//! know the concrete type.

use http::Uri;
use rustls::client::ClientConfig;
use rustls::RootCertStore;
use rustls_pki_types::ServerName;
use std::sync::Arc;

use crate::params::HostnameVerification;

/// The transport object inside an HTTP client.
pub trait Conduit: Send + std::fmt::Debug {
    /// Short name of the transport, for error messages.
    fn kind(&self) -> &'static str;

    /// The TLS-capable view of this conduit, if it has one.
    fn as_http_conduit_mut(&mut self) -> Option<&mut HttpConduit> {
        None
    }
}

/// TLS settings installed on an [`HttpConduit`].
#[derive(Clone, Debug)]
pub struct TlsClientSettings {
    pub(crate) client_config: Arc<ClientConfig>,
    pub(crate) server_name: ServerName<'static>,
    pub(crate) trust_anchors: Arc<RootCertStore>,
    pub(crate) hostname_verification: HostnameVerification,
}

impl TlsClientSettings {
    /// The rustls configuration to connect with.
    pub fn client_config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.client_config)
    }

    /// The name presented in SNI and checked against the server's
    /// certificate.
    pub fn server_name(&self) -> &ServerName<'static> {
        &self.server_name
    }

    /// Trust anchors the server's chain is verified against.
    pub fn trust_anchors(&self) -> &RootCertStore {
        &self.trust_anchors
    }

    /// Whether the server certificate's name is checked.
    pub fn hostname_verification(&self) -> HostnameVerification {
        self.hostname_verification
    }
}

/// HTTP conduit: a network transport that can be secured with TLS.
#[derive(Debug)]
pub struct HttpConduit {
    address: Uri,
    tls: Option<TlsClientSettings>,
}

impl HttpConduit {
    /// A plaintext conduit to `address`.
    pub fn new(address: Uri) -> Self {
        Self { address, tls: None }
    }

    /// Where this conduit connects to.
    pub fn address(&self) -> &Uri {
        &self.address
    }

    /// Current TLS settings, or `None` if none were applied.
    pub fn tls_settings(&self) -> Option<&TlsClientSettings> {
        self.tls.as_ref()
    }

    /// Replace the TLS settings.
    pub fn set_tls_settings(&mut self, settings: TlsClientSettings) {
        self.tls = Some(settings);
    }
}

impl Conduit for HttpConduit {
    fn kind(&self) -> &'static str {
        "http"
    }

    fn as_http_conduit_mut(&mut self) -> Option<&mut HttpConduit> {
        Some(self)
    }
}

/// In-process conduit which never leaves the process and so has no TLS
/// settings.
#[derive(Debug, Default)]
pub struct LocalConduit {
    /// Name of the in-process destination.
    pub destination: String,
}

impl Conduit for LocalConduit {
    fn kind(&self) -> &'static str {
        "local"
    }
}
