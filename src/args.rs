//! Command line flags for TLS client parameters.
//!
//! # Command line flags
//!
//! | Flag                                  | Default   | Meaning                 |
//! |---------------------------------------|-----------|-------------------------|
//! | `--tls-trust-store`                   | Web PKI   | Resource with PEM-format X.509 trust anchor certificate(s) |
//! | `--tls-cert-path`                     | None      | Resource with PEM-format X.509 client certificate(s) |
//! | `--tls-key-path`                      | None      | Resource with PEM-format X.509 client private key |
//! | `--tls-protocols`                     | Both      | Comma-separated list of `TLSv1.2`, `TLSv1.3` |
//! | `--tls-cipher-suites-include`         | All       | Comma-separated regular expressions of cipher suites to enable |
//! | `--tls-cipher-suites-exclude`         | None      | Comma-separated regular expressions of cipher suites to disable |
//! | `--tls-sni-host-name`                 | From URI  | Server name to send and verify |
//! | `--tls-disable-hostname-verification` | false     | Accept server certificates issued for any name |
//! | `--tls-alpn`                          | None      | Comma-separated ALPN protocols to offer |
//!
//! If none of these flags are given then there are no TLS parameters and
//! [`TlsClientConfigurer::create`](crate::TlsClientConfigurer::create)
//! yields the no-op configurer.

use crate::error::ConfigurationError;
use crate::params::{
    ClientParameters, FilterParameters, HostnameVerification, KeyManagersParameters,
    ProtocolVersion, TlsParameters, TrustManagersParameters,
};

/// Command line arguments producing optional [`TlsParameters`].
#[derive(clap::Args, Debug, Default)]
#[group(id = "conduit_tls_args")]
pub struct Args {
    #[arg(long, help = "Resource with TLS trust anchors in PEM format.")]
    tls_trust_store: Option<String>,

    #[arg(
        long,
        help = "Resource with TLS client certificate chain in PEM format. Requires --tls-key-path."
    )]
    tls_cert_path: Option<String>,

    #[arg(
        long,
        help = "Resource with TLS client private key in PEM format. Requires --tls-cert-path."
    )]
    tls_key_path: Option<String>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "TLS protocol versions to enable (TLSv1.2, TLSv1.3)."
    )]
    tls_protocols: Vec<ProtocolVersion>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Regular expressions of TLS cipher suites to enable."
    )]
    tls_cipher_suites_include: Vec<String>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Regular expressions of TLS cipher suites to disable."
    )]
    tls_cipher_suites_exclude: Vec<String>,

    #[arg(long, help = "TLS server name, instead of the host of the endpoint address.")]
    tls_sni_host_name: Option<String>,

    #[arg(long, help = "Do not check the TLS server certificate's name.")]
    tls_disable_hostname_verification: bool,

    #[arg(long, value_delimiter = ',', help = "ALPN protocols to offer.")]
    tls_alpn: Vec<String>,
}

impl Args {
    fn is_empty(&self) -> bool {
        self.tls_trust_store.is_none()
            && self.tls_cert_path.is_none()
            && self.tls_key_path.is_none()
            && self.tls_protocols.is_empty()
            && self.tls_cipher_suites_include.is_empty()
            && self.tls_cipher_suites_exclude.is_empty()
            && self.tls_sni_host_name.is_none()
            && !self.tls_disable_hostname_verification
            && self.tls_alpn.is_empty()
    }

    /// The parameters described by the flags, or `None` if no TLS flag was
    /// given.
    pub fn into_parameters(self) -> Result<Option<TlsParameters>, ConfigurationError> {
        if self.is_empty() {
            return Ok(None);
        }
        let key_managers = match (self.tls_cert_path, self.tls_key_path) {
            (Some(cert), Some(key)) => Some(KeyManagersParameters::new(cert, key)),
            (None, None) => None,
            _ => return Err(ConfigurationError::IncompleteKeyManagers),
        };
        let cipher_suites_filter = if self.tls_cipher_suites_include.is_empty()
            && self.tls_cipher_suites_exclude.is_empty()
        {
            None
        } else {
            Some(FilterParameters {
                include: self.tls_cipher_suites_include,
                exclude: self.tls_cipher_suites_exclude,
            })
        };
        Ok(Some(TlsParameters {
            key_managers,
            trust_managers: self.tls_trust_store.map(TrustManagersParameters::new),
            secure_socket_protocols: (!self.tls_protocols.is_empty())
                .then_some(self.tls_protocols),
            cipher_suites_filter,
            client_parameters: ClientParameters {
                sni_host_name: self.tls_sni_host_name,
                hostname_verification: if self.tls_disable_hostname_verification {
                    HostnameVerification::Disabled
                } else {
                    HostnameVerification::Strict
                },
                alpn_protocols: self.tls_alpn,
                ..Default::default()
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Cli {
        #[command(flatten)]
        tls: Args,
    }

    fn parse(argv: &[&str]) -> Result<Option<TlsParameters>, ConfigurationError> {
        Cli::try_parse_from(std::iter::once("cmd").chain(argv.iter().copied()))
            .expect("parse flags")
            .tls
            .into_parameters()
    }

    #[test]
    fn no_flags() {
        assert!(parse(&[]).expect("no flags").is_none());
    }

    #[test]
    fn all_flags() {
        let p = parse(&[
            "--tls-trust-store",
            "classpath:ca.pem",
            "--tls-cert-path",
            "client.crt",
            "--tls-key-path",
            "file:client.key",
            "--tls-protocols",
            "TLSv1.2,TLSv1.3",
            "--tls-cipher-suites-include",
            ".*GCM.*,.*CHACHA20.*",
            "--tls-cipher-suites-exclude",
            ".*AES_128.*",
            "--tls-sni-host-name",
            "api.internal",
            "--tls-disable-hostname-verification",
            "--tls-alpn",
            "h2,http/1.1",
        ])
        .expect("valid flags")
        .expect("parameters");
        assert_eq!(
            p,
            TlsParameters {
                key_managers: Some(KeyManagersParameters::new("client.crt", "file:client.key")),
                trust_managers: Some(TrustManagersParameters::new("classpath:ca.pem")),
                secure_socket_protocols: Some(vec![ProtocolVersion::Tls12, ProtocolVersion::Tls13]),
                cipher_suites_filter: Some(FilterParameters {
                    include: vec![".*GCM.*".into(), ".*CHACHA20.*".into()],
                    exclude: vec![".*AES_128.*".into()],
                }),
                client_parameters: ClientParameters {
                    sni_host_name: Some("api.internal".into()),
                    hostname_verification: HostnameVerification::Disabled,
                    alpn_protocols: vec!["h2".into(), "http/1.1".into()],
                    enable_sni: true,
                },
            }
        );
    }

    #[test]
    fn single_flag_enables_tls() {
        let p = parse(&["--tls-disable-hostname-verification"])
            .expect("valid flags")
            .expect("parameters");
        assert!(p.trust_managers.is_none());
        assert_eq!(
            p.client_parameters.hostname_verification,
            HostnameVerification::Disabled
        );
    }

    #[test]
    fn cert_without_key() {
        assert!(matches!(
            parse(&["--tls-cert-path", "client.crt"]),
            Err(ConfigurationError::IncompleteKeyManagers)
        ));
    }

    #[test]
    fn bad_protocol_rejected_by_parser() {
        let r = Cli::try_parse_from(["cmd", "--tls-protocols", "SSLv3"]);
        assert!(r.is_err());
    }
}
