//! Error type for applying TLS parameters to a conduit.

use thiserror::Error;

/// Error type returned when TLS parameters cannot be applied.
///
/// Every failure to configure a client is reported through this one type,
/// whether the client's transport cannot take TLS settings at all or the
/// parameters themselves are unusable.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The client's transport conduit does not expose TLS settings.
    #[error("conduit of kind {0:?} does not support TLS configuration")]
    UnsupportedConduit(&'static str),
    /// A resource location used a scheme that cannot be resolved.
    #[error("unsupported resource scheme in {0:?}")]
    UnsupportedResourceScheme(String),
    /// A `classpath:` resource was not found under any resource root.
    #[error("resource {0:?} not found")]
    ResourceNotFound(String),
    /// A resource could not be read.
    #[error("reading {location}: {source}")]
    Io {
        /// Resource location as given in the parameters.
        location: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A PEM resource held no usable certificate.
    #[error("no certificates found in {0}")]
    NoCertificates(String),
    /// A PEM resource held no private key.
    #[error("no private key found in {0}")]
    NoPrivateKey(String),
    /// Only one of the certificate chain and the private key was given.
    #[error("client certificate chain and private key must be given together")]
    IncompleteKeyManagers,
    /// A protocol name other than `TLSv1.2` or `TLSv1.3`.
    #[error("unsupported TLS protocol {0:?}")]
    UnsupportedProtocol(String),
    /// The protocol list was empty.
    #[error("no TLS protocol versions enabled")]
    NoProtocolVersions,
    /// The cipher suite filter removed every suite.
    #[error("no cipher suites left after filtering")]
    NoCipherSuites,
    /// No trust store was given and no built-in roots are available.
    #[error("no trust anchors configured")]
    NoTrustAnchors,
    /// A filter pattern is not a valid regular expression.
    #[error("{0}")]
    InvalidPattern(#[from] regex::Error),
    /// The server name to present could not be determined.
    #[error("cannot derive a TLS server name from {0:?}")]
    InvalidServerName(String),
    /// Wrapper for rustls::client::VerifierBuilderError
    #[error("{0}")]
    Verifier(#[from] rustls::client::VerifierBuilderError),
    /// Wrapper for rustls::Error
    #[error("{0}")]
    Tls(#[from] rustls::Error),
}

impl ConfigurationError {
    pub(crate) fn io(location: &str, source: std::io::Error) -> Self {
        Self::Io {
            location: location.into(),
            source,
        }
    }
}
