use super::transport::{Transport, TransportError};
use bytes::BytesMut;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, warn};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Stream transport over a single TCP connection.
///
/// Any I/O failure poisons the transport; the connection is not re-opened.
pub struct TcpTransport {
    stream: TcpStream,
    pending: BytesMut,
    peer: String,
    poisoned: bool,
}

impl TcpTransport {
    pub async fn connect(addr: &str, timeout: Duration) -> Result<Self, TransportError> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| TransportError::ConnectTimeout {
                addr: addr.to_string(),
                timeout,
            })?
            .map_err(|source| TransportError::Connect {
                addr: addr.to_string(),
                source,
            })?;

        if let Err(e) = stream.set_nodelay(true) {
            debug!("Could not set TCP_NODELAY on {addr}: {e}");
        }

        debug!("Connected TCP transport to {addr}");
        Ok(Self::from_stream(stream, addr))
    }

    pub fn from_stream(stream: TcpStream, peer: impl Into<String>) -> Self {
        Self {
            stream,
            pending: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            peer: peer.into(),
            poisoned: false,
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn pending_bytes(&self) -> usize {
        self.pending.len()
    }
}

impl Transport for TcpTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.poisoned {
            return Err(TransportError::Closed);
        }
        self.pending.extend_from_slice(bytes);
        Ok(())
    }

    async fn drain(&mut self) -> Result<(), TransportError> {
        if self.poisoned {
            return Err(TransportError::Closed);
        }
        if self.pending.is_empty() {
            return Ok(());
        }

        let result = async {
            self.stream.write_all_buf(&mut self.pending).await?;
            self.stream.flush().await
        }
        .await;

        if let Err(e) = result {
            warn!("TCP transport to {} failed: {}", self.peer, e);
            self.poisoned = true;
            return Err(TransportError::Io(e));
        }
        Ok(())
    }
}
