//! TLS client parameters.
//!
//! [`TlsParameters`] is a plain description of what a client's TLS leg
//! should look like: which trust anchors to accept, which identity to
//! present, which protocol versions and cipher suites to allow, and how
//! strictly to check the server's name. Key and trust material are named
//! by resource location and only loaded when the parameters are applied
//! (see [`crate::setup::apply_tls`]), so building a [`TlsParameters`]
//! never fails and never touches the filesystem.
//!
//! ```
//! use conduit_tls::params::{
//!     ClientParameters, HostnameVerification, ProtocolVersion, TlsParameters,
//!     TrustManagersParameters,
//! };
//!
//! let params = TlsParameters {
//!     trust_managers: Some(TrustManagersParameters::new("classpath:ca.pem")),
//!     secure_socket_protocols: Some(vec![ProtocolVersion::Tls13]),
//!     client_parameters: ClientParameters {
//!         hostname_verification: HostnameVerification::Strict,
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! # let _ = params;
//! ```

use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigurationError;

/// A TLS protocol version that can be enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    /// `TLSv1.2`
    Tls12,
    /// `TLSv1.3`
    Tls13,
}

impl ProtocolVersion {
    /// The protocol name as used in configuration, such as `TLSv1.3`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Tls12 => "TLSv1.2",
            Self::Tls13 => "TLSv1.3",
        }
    }

    pub(crate) fn rustls_version(self) -> &'static rustls::SupportedProtocolVersion {
        match self {
            Self::Tls12 => &rustls::version::TLS12,
            Self::Tls13 => &rustls::version::TLS13,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProtocolVersion {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "TLSv1.2" => Ok(Self::Tls12),
            "TLSv1.3" => Ok(Self::Tls13),
            other => Err(ConfigurationError::UnsupportedProtocol(other.into())),
        }
    }
}

/// Include and exclude patterns applied to a list of names.
///
/// Patterns are regular expressions which must match the whole name.
/// A name is kept if it matches at least one include pattern (or there
/// are no include patterns) and matches none of the exclude patterns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterParameters {
    /// Patterns for names to keep.
    pub include: Vec<String>,
    /// Patterns for names to drop, applied after `include`.
    pub exclude: Vec<String>,
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, regex::Error> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("^(?:{})$", p)))
        .collect()
}

/// Compiled form of [`FilterParameters`].
#[derive(Debug)]
pub(crate) struct Filter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl Filter {
    /// Whether any of `names` (aliases for the same item) passes.
    pub(crate) fn accepts<'a>(&self, names: impl IntoIterator<Item = &'a str> + Clone) -> bool {
        let included = self.include.is_empty()
            || names
                .clone()
                .into_iter()
                .any(|n| self.include.iter().any(|r| r.is_match(n)));
        included
            && !names
                .into_iter()
                .any(|n| self.exclude.iter().any(|r| r.is_match(n)))
    }
}

impl FilterParameters {
    pub(crate) fn compile(&self) -> Result<Filter, ConfigurationError> {
        Ok(Filter {
            include: compile(&self.include)?,
            exclude: compile(&self.exclude)?,
        })
    }
}

/// Location of the local identity presented for mutual TLS.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyManagersParameters {
    /// Resource holding the PEM certificate chain, leaf first.
    pub certificate_chain: String,
    /// Resource holding the PEM private key for the leaf certificate.
    pub private_key: String,
}

impl KeyManagersParameters {
    /// Names the chain and key resources.
    pub fn new(certificate_chain: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            certificate_chain: certificate_chain.into(),
            private_key: private_key.into(),
        }
    }
}

/// Location of the trust anchors used to verify servers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrustManagersParameters {
    /// Resource holding one or more PEM certificates.
    pub trust_store: String,
}

impl TrustManagersParameters {
    /// Names the trust store resource.
    pub fn new(trust_store: impl Into<String>) -> Self {
        Self {
            trust_store: trust_store.into(),
        }
    }
}

/// How the server certificate's name is checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HostnameVerification {
    /// The certificate must be valid for the server name.
    #[default]
    Strict,
    /// Any name is accepted. The chain is still verified against the
    /// trust anchors.
    Disabled,
}

/// Parameters specific to the client side of the connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientParameters {
    /// Server name to send in SNI and to verify against. Defaults to the
    /// host of the conduit's address.
    pub sni_host_name: Option<String>,
    /// Name check policy.
    pub hostname_verification: HostnameVerification,
    /// ALPN protocols to offer, in preference order.
    pub alpn_protocols: Vec<String>,
    /// Whether to send the SNI extension at all.
    pub enable_sni: bool,
}

impl Default for ClientParameters {
    fn default() -> Self {
        Self {
            sni_host_name: None,
            hostname_verification: HostnameVerification::default(),
            alpn_protocols: Vec::new(),
            enable_sni: true,
        }
    }
}

/// Complete set of TLS parameters for a client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TlsParameters {
    /// Local identity. Without it no client certificate is offered.
    pub key_managers: Option<KeyManagersParameters>,
    /// Trust anchors. Without them the built-in Web PKI roots are used
    /// if the `webpki-roots` feature is enabled.
    pub trust_managers: Option<TrustManagersParameters>,
    /// Protocol versions to enable. `None` selects TLS 1.2 and 1.3.
    pub secure_socket_protocols: Option<Vec<ProtocolVersion>>,
    /// Cipher suites to enable, filtered from the crypto provider's list.
    pub cipher_suites_filter: Option<FilterParameters>,
    /// Client-side parameters.
    pub client_parameters: ClientParameters,
}
