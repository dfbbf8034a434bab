use conduit_tls::{ExecutionContext, TlsClientSettings};
use rustls::ServerConfig;
use rustls::pki_types::CertificateDer;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_rustls::{TlsAcceptor, TlsConnector};

#[allow(dead_code)]
#[path = "../../src/testdata.rs"]
mod testdata;

pub(crate) use testdata::Pki;

/// What a client and server saw of one exchange over [`talk_with`].
pub struct Exchange {
    /// Whether the client got the server's reply.
    pub replied: bool,
    /// Certificates the client presented, as seen by the server.
    pub client_certificates: Option<Vec<CertificateDer<'static>>>,
}

/// Handshakes over an in-memory pipe and exchanges a greeting.
pub async fn talk_with(settings: &TlsClientSettings, server: ServerConfig) -> Exchange {
    let (client, server_io) = tokio::io::duplex(4096);
    let connect = TlsConnector::from(settings.client_config())
        .connect(settings.server_name().clone(), client);
    let accept = TlsAcceptor::from(Arc::new(server)).accept(server_io);
    let client_task = async move {
        let mut stream = connect.await.ok()?;
        stream.write_all(b"hello").await.ok()?;
        let mut buf = vec![0u8; 3];
        stream.read_exact(&mut buf).await.ok()?;
        Some(buf == b"bye")
    };
    let server_task = async move {
        let mut stream = accept.await.ok()?;
        let peer = stream.get_ref().1.peer_certificates().map(|c| c.to_vec());
        let mut buf = vec![0u8; 5];
        stream.read_exact(&mut buf).await.ok()?;
        stream.write_all(b"bye").await.ok()?;
        stream.shutdown().await.ok()?;
        peer
    };
    let (replied, client_certificates) = tokio::join!(client_task, server_task);
    Exchange {
        replied: replied.unwrap_or(false),
        client_certificates,
    }
}

/// Returns whether the client got the server's reply.
pub async fn talk(settings: &TlsClientSettings, server: ServerConfig) -> bool {
    talk_with(settings, server).await.replied
}
