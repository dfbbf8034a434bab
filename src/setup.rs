//! Turn [`TlsParameters`] into rustls client settings on an [`HttpConduit`].
//!
//! [`apply_tls`] loads the key and trust material named by the parameters
//! through an [`ExecutionContext`], builds a [`ClientConfig`] from it, and
//! installs the result on the conduit. The conduit is only touched once
//! everything has been built, so a failure leaves it as it was.

use http::Uri;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::{ClientConfig, WebPkiServerVerifier};
use rustls::crypto::CryptoProvider;
use rustls::{CertificateError, RootCertStore, SupportedCipherSuite, SupportedProtocolVersion};
use rustls_pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use std::io::Cursor;
use std::sync::Arc;
use time::OffsetDateTime;
use x509_parser::certificate::X509Certificate;
use x509_parser::prelude::FromDer;

use crate::conduit::{HttpConduit, TlsClientSettings};
use crate::context::ExecutionContext;
use crate::error::ConfigurationError;
use crate::params::{
    ClientParameters, FilterParameters, HostnameVerification, KeyManagersParameters,
    TlsParameters,
};

/// Apply `params` to `conduit`, replacing any TLS settings it had.
pub fn apply_tls(
    conduit: &mut HttpConduit,
    params: &TlsParameters,
    context: &ExecutionContext,
) -> Result<(), ConfigurationError> {
    let settings = build_settings(conduit.address(), params, context)?;
    log::info!(
        "Configured TLS for {} with server name {:?}",
        conduit.address(),
        settings.server_name
    );
    conduit.set_tls_settings(settings);
    Ok(())
}

/// Build the TLS settings [`apply_tls`] would install on a conduit
/// connecting to `address`, without installing them.
pub fn build_settings(
    address: &Uri,
    params: &TlsParameters,
    context: &ExecutionContext,
) -> Result<TlsClientSettings, ConfigurationError> {
    let client = &params.client_parameters;
    let server_name = server_name(address, client)?;
    let provider = filter_cipher_suites(
        context.crypto_provider(),
        params.cipher_suites_filter.as_ref(),
    )?;
    let versions = protocol_versions(params)?;
    let trust_anchors = Arc::new(trust_anchors(params, context)?);

    let webpki = WebPkiServerVerifier::builder_with_provider(
        Arc::clone(&trust_anchors),
        Arc::clone(&provider),
    )
    .build()?;
    let builder = ClientConfig::builder_with_provider(provider).with_protocol_versions(&versions)?;
    let builder = match client.hostname_verification {
        HostnameVerification::Strict => builder.with_webpki_verifier(webpki),
        HostnameVerification::Disabled => {
            log::warn!("Hostname verification is disabled for {}", address);
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(AnyServerName(webpki)))
        }
    };
    let mut client_config = match params.key_managers {
        Some(ref km) => {
            let (chain, key) = load_identity(km, context)?;
            builder.with_client_auth_cert(chain, key)?
        }
        None => builder.with_no_client_auth(),
    };
    client_config.alpn_protocols = client
        .alpn_protocols
        .iter()
        .map(|p| p.as_bytes().to_vec())
        .collect();
    client_config.enable_sni = client.enable_sni;

    Ok(TlsClientSettings {
        client_config: Arc::new(client_config),
        server_name,
        trust_anchors,
        hostname_verification: client.hostname_verification,
    })
}

fn server_name(
    address: &Uri,
    client: &ClientParameters,
) -> Result<ServerName<'static>, ConfigurationError> {
    let host = client
        .sni_host_name
        .as_deref()
        .or_else(|| address.host())
        .ok_or_else(|| ConfigurationError::InvalidServerName(address.to_string()))?;
    // Uri keeps the brackets around IPv6 literals.
    let host = host.trim_start_matches('[').trim_end_matches(']');
    ServerName::try_from(host.to_owned())
        .map_err(|_| ConfigurationError::InvalidServerName(host.into()))
}

fn suite_names(suite: &SupportedCipherSuite) -> [String; 2] {
    let name = format!("{:?}", suite.suite());
    // Configuration commonly uses the IANA names, which lack the "13".
    let iana = match name.strip_prefix("TLS13_") {
        Some(rest) => format!("TLS_{}", rest),
        None => name.clone(),
    };
    [name, iana]
}

fn filter_cipher_suites(
    provider: Arc<CryptoProvider>,
    filter: Option<&FilterParameters>,
) -> Result<Arc<CryptoProvider>, ConfigurationError> {
    let Some(filter) = filter else {
        return Ok(provider);
    };
    let filter = filter.compile()?;
    let mut filtered = CryptoProvider::clone(&provider);
    filtered.cipher_suites.retain(|suite| {
        let [name, iana] = suite_names(suite);
        filter.accepts([name.as_str(), iana.as_str()])
    });
    if filtered.cipher_suites.is_empty() {
        return Err(ConfigurationError::NoCipherSuites);
    }
    log::debug!(
        "Enabled cipher suites: {:?}",
        filtered
            .cipher_suites
            .iter()
            .map(|s| s.suite())
            .collect::<Vec<_>>()
    );
    Ok(Arc::new(filtered))
}

fn protocol_versions(
    params: &TlsParameters,
) -> Result<Vec<&'static SupportedProtocolVersion>, ConfigurationError> {
    let versions = match params.secure_socket_protocols {
        None => rustls::DEFAULT_VERSIONS.to_vec(),
        Some(ref protocols) => {
            let mut v: Vec<&'static SupportedProtocolVersion> = Vec::new();
            for p in protocols.iter().map(|p| p.rustls_version()) {
                if !v.iter().any(|seen| seen.version == p.version) {
                    v.push(p);
                }
            }
            v
        }
    };
    if versions.is_empty() {
        return Err(ConfigurationError::NoProtocolVersions);
    }
    Ok(versions)
}

#[cfg(feature = "webpki-roots")]
fn default_trust_anchors() -> Result<RootCertStore, ConfigurationError> {
    Ok(RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    })
}

#[cfg(not(feature = "webpki-roots"))]
fn default_trust_anchors() -> Result<RootCertStore, ConfigurationError> {
    Err(ConfigurationError::NoTrustAnchors)
}

fn trust_anchors(
    params: &TlsParameters,
    context: &ExecutionContext,
) -> Result<RootCertStore, ConfigurationError> {
    let Some(ref tm) = params.trust_managers else {
        return default_trust_anchors();
    };
    let mut roots = RootCertStore::empty();
    let (added, ignored) =
        roots.add_parsable_certificates(load_certs(context, &tm.trust_store)?);
    if ignored > 0 {
        log::warn!(
            "Ignored {} unusable trust anchors in {}",
            ignored,
            tm.trust_store
        );
    }
    if added == 0 {
        return Err(ConfigurationError::NoCertificates(tm.trust_store.clone()));
    }
    Ok(roots)
}

fn load_identity(
    km: &KeyManagersParameters,
    context: &ExecutionContext,
) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>), ConfigurationError> {
    let chain = load_certs(context, &km.certificate_chain)?;
    let pem = context.load(&km.private_key)?;
    let key = rustls_pemfile::private_key(&mut Cursor::new(&pem))
        .map_err(|e| ConfigurationError::io(&km.private_key, e))?
        .ok_or_else(|| ConfigurationError::NoPrivateKey(km.private_key.clone()))?;
    Ok((chain, key))
}

fn load_certs(
    context: &ExecutionContext,
    location: &str,
) -> Result<Vec<CertificateDer<'static>>, ConfigurationError> {
    let pem = context.load(location)?;
    let certs = rustls_pemfile::certs(&mut Cursor::new(&pem))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ConfigurationError::io(location, e))?;
    if certs.is_empty() {
        return Err(ConfigurationError::NoCertificates(location.into()));
    }
    describe_certificates(location, &certs, OffsetDateTime::now_utc());
    Ok(certs)
}

fn describe_certificates(location: &str, certs: &[CertificateDer<'_>], now: OffsetDateTime) {
    for der in certs {
        match X509Certificate::from_der(der.as_ref()) {
            Ok((_, cert)) => {
                let validity = cert.validity();
                log::debug!("{}: certificate for {}", location, cert.subject());
                if !is_current(&cert, now) {
                    log::warn!(
                        "{}: certificate for {} is only valid from {} to {}",
                        location,
                        cert.subject(),
                        validity.not_before,
                        validity.not_after
                    );
                }
            }
            Err(e) => log::warn!("{}: unparseable certificate: {}", location, e),
        }
    }
}

fn is_current(cert: &X509Certificate<'_>, now: OffsetDateTime) -> bool {
    let validity = cert.validity();
    validity.not_before.to_datetime() <= now && now <= validity.not_after.to_datetime()
}

/// Server verifier which checks the chain but accepts any server name.
#[derive(Debug)]
struct AnyServerName(Arc<WebPkiServerVerifier>);

impl ServerCertVerifier for AnyServerName {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        // The name is checked last, after the chain.
        match self.0.verify_server_cert(
            end_entity,
            intermediates,
            server_name,
            ocsp_response,
            now,
        ) {
            Err(rustls::Error::InvalidCertificate(
                CertificateError::NotValidForName | CertificateError::NotValidForNameContext { .. },
            )) => Ok(ServerCertVerified::assertion()),
            other => other,
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.0.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.0.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        self.0.supported_verify_schemes()
    }
}
