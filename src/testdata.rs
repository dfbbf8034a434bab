//! Throw-away PKI for tests: a CA and leaf identities it issues, written as
//! PEM files under a temporary directory.
//!
//! The unit tests and the integration tests under `tests/` share this file,
//! so it only reaches the rest of the crate through its parent module.

use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa,
    KeyPair, KeyUsagePurpose,
};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};
use rustls_pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use std::sync::Arc;

use super::ExecutionContext;

pub(crate) struct Pki {
    pub(crate) dir: tempfile::TempDir,
    ca_cert: Certificate,
    ca_key: KeyPair,
}

pub(crate) struct Identity {
    pub(crate) chain: Vec<CertificateDer<'static>>,
    pub(crate) key: PrivateKeyDer<'static>,
    /// Bare relative path of the certificate PEM.
    pub(crate) cert_location: String,
    /// `classpath:` location of the key PEM.
    pub(crate) key_location: String,
}

impl Pki {
    pub(crate) fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("certs")).expect("mkdir certs");
        let ca_key = KeyPair::generate().expect("CA key");
        let mut params = CertificateParams::new(Vec::<String>::new()).expect("CA params");
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params
            .distinguished_name
            .push(DnType::CommonName, "conduit_tls test CA");
        params.key_usages = vec![
            KeyUsagePurpose::KeyCertSign,
            KeyUsagePurpose::CrlSign,
            KeyUsagePurpose::DigitalSignature,
        ];
        let ca_cert = params.self_signed(&ca_key).expect("CA cert");
        std::fs::write(dir.path().join("certs/ca.pem"), ca_cert.pem()).expect("write CA");
        Self {
            dir,
            ca_cert,
            ca_key,
        }
    }

    /// Resolves bare paths against the temp dir and `classpath:` against
    /// its `certs` subdirectory, where everything is written.
    pub(crate) fn context(&self) -> ExecutionContext {
        ExecutionContext::new(self.dir.path()).with_resource_root("certs")
    }

    pub(crate) fn ca_der(&self) -> CertificateDer<'static> {
        self.ca_cert.der().clone()
    }

    pub(crate) fn issue(&self, name: &str, dns_names: &[&str]) -> Identity {
        let key = KeyPair::generate().expect("leaf key");
        let mut params = CertificateParams::new(
            dns_names.iter().map(|n| n.to_string()).collect::<Vec<_>>(),
        )
        .expect("leaf params");
        params.distinguished_name.push(DnType::CommonName, name);
        params.extended_key_usages = vec![
            ExtendedKeyUsagePurpose::ServerAuth,
            ExtendedKeyUsagePurpose::ClientAuth,
        ];
        let cert = params
            .signed_by(&key, &self.ca_cert, &self.ca_key)
            .expect("leaf cert");
        let certs = self.dir.path().join("certs");
        std::fs::write(certs.join(format!("{}.crt", name)), cert.pem()).expect("write cert");
        std::fs::write(certs.join(format!("{}.key", name)), key.serialize_pem())
            .expect("write key");
        Identity {
            chain: vec![cert.der().clone()],
            key: PrivatePkcs8KeyDer::from(key.serialize_der()).into(),
            cert_location: format!("certs/{}.crt", name),
            key_location: format!("classpath:{}.key", name),
        }
    }

    /// A server presenting a fresh leaf for `dns_names`, not asking for a
    /// client certificate.
    pub(crate) fn server_config(&self, dns_names: &[&str]) -> ServerConfig {
        let id = self.issue("server", dns_names);
        ServerConfig::builder_with_provider(Arc::new(
            rustls::crypto::aws_lc_rs::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .expect("server versions")
        .with_no_client_auth()
        .with_single_cert(id.chain, id.key)
        .expect("server config")
    }

    /// Like [`Pki::server_config`], but the server demands a client
    /// certificate issued by this CA.
    pub(crate) fn server_config_requiring_client_cert(&self, dns_names: &[&str]) -> ServerConfig {
        let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
        let mut roots = RootCertStore::empty();
        roots.add(self.ca_der()).expect("ca");
        let verifier =
            WebPkiClientVerifier::builder_with_provider(Arc::new(roots), Arc::clone(&provider))
                .build()
                .expect("client verifier");
        let id = self.issue("server", dns_names);
        ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .expect("server versions")
            .with_client_cert_verifier(verifier)
            .with_single_cert(id.chain, id.key)
            .expect("server config")
    }
}
