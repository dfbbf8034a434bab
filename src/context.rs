//! Environment needed to materialise TLS parameters.
//!
//! An [`ExecutionContext`] resolves the resource locations named in
//! [`TlsParameters`](crate::params::TlsParameters) and supplies the rustls
//! [`CryptoProvider`]. Resource locations take one of these forms:
//!
//! | Location             | Resolved as |
//! |----------------------|-------------|
//! | `file:path`          | `path`, relative to the base directory |
//! | `classpath:name`     | `name` under the first resource root that has it |
//! | `path`               | same as `file:path` |

use rustls::crypto::CryptoProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ConfigurationError;

/// Provide access to the process-global default [`CryptoProvider`] if there
/// is one, otherwise the `aws-lc-rs` one.
pub fn default_crypto_provider() -> Arc<CryptoProvider> {
    CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

/// Resource resolution and crypto for applying TLS parameters.
#[derive(Debug)]
pub struct ExecutionContext {
    base_dir: PathBuf,
    resource_roots: Vec<PathBuf>,
    crypto_provider: Arc<CryptoProvider>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(".")
    }
}

enum Location<'a> {
    File(&'a str),
    Classpath(&'a str),
}

fn parse_location(location: &str) -> Result<Location<'_>, ConfigurationError> {
    if let Some(path) = location.strip_prefix("file:") {
        return Ok(Location::File(path));
    }
    if let Some(name) = location.strip_prefix("classpath:") {
        return Ok(Location::Classpath(name.trim_start_matches('/')));
    }
    match location.split_once(':') {
        // A single letter is a drive, not a scheme.
        Some((scheme, _))
            if scheme.len() > 1
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            Err(ConfigurationError::UnsupportedResourceScheme(
                location.into(),
            ))
        }
        _ => Ok(Location::File(location)),
    }
}

impl ExecutionContext {
    /// A context resolving relative paths against `base_dir`, with no
    /// resource roots and the default crypto provider.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            resource_roots: Vec::new(),
            crypto_provider: default_crypto_provider(),
        }
    }

    /// Append a directory searched by `classpath:` locations. Roots are
    /// searched in the order they were added.
    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_roots.push(root.into());
        self
    }

    /// Use `provider` instead of the default crypto provider.
    pub fn with_crypto_provider(mut self, provider: Arc<CryptoProvider>) -> Self {
        self.crypto_provider = provider;
        self
    }

    /// Directory that relative file locations are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The crypto provider TLS configuration is built with.
    pub fn crypto_provider(&self) -> Arc<CryptoProvider> {
        Arc::clone(&self.crypto_provider)
    }

    /// Map a resource location to a path on disk. File locations are not
    /// checked for existence; `classpath:` locations must exist under some
    /// root.
    pub fn resolve(&self, location: &str) -> Result<PathBuf, ConfigurationError> {
        match parse_location(location)? {
            Location::File(path) => Ok(self.base_dir.join(path)),
            Location::Classpath(name) => self
                .resource_roots
                .iter()
                .map(|root| self.base_dir.join(root).join(name))
                .find(|p| p.is_file())
                .ok_or_else(|| ConfigurationError::ResourceNotFound(location.into())),
        }
    }

    /// Read the whole resource named by `location`.
    pub fn load(&self, location: &str) -> Result<Vec<u8>, ConfigurationError> {
        let path = self.resolve(location)?;
        log::debug!("Loading {} from {}", location, path.display());
        std::fs::read(&path).map_err(|e| ConfigurationError::io(location, e))
    }
}
