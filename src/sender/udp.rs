use super::transport::{Transport, TransportError};
use bytes::Bytes;
use std::collections::VecDeque;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::{UdpSocket, lookup_host};
use tracing::{debug, warn};

/// Datagram transport: every `write` becomes one datagram on the next drain.
pub struct UdpTransport {
    socket: UdpSocket,
    pending: VecDeque<Bytes>,
    peer: SocketAddr,
    poisoned: bool,
}

impl UdpTransport {
    pub async fn connect(addr: &str) -> Result<Self, TransportError> {
        let peer = lookup_host(addr)
            .await
            .map_err(|source| TransportError::Connect {
                addr: addr.to_string(),
                source,
            })?
            .next()
            .ok_or_else(|| TransportError::Unresolved(addr.to_string()))?;

        let bind_addr = if peer.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };

        let socket = UdpSocket::bind(bind_addr).await?;
        socket
            .connect(peer)
            .await
            .map_err(|source| TransportError::Connect {
                addr: addr.to_string(),
                source,
            })?;

        debug!("Connected UDP transport to {peer}");
        Ok(Self {
            socket,
            pending: VecDeque::new(),
            peer,
            poisoned: false,
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Transport for UdpTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.poisoned {
            return Err(TransportError::Closed);
        }
        let datagram = bytes.strip_suffix(b"\n").unwrap_or(bytes);
        self.pending.push_back(Bytes::copy_from_slice(datagram));
        Ok(())
    }

    async fn drain(&mut self) -> Result<(), TransportError> {
        if self.poisoned {
            return Err(TransportError::Closed);
        }
        while let Some(datagram) = self.pending.pop_front() {
            if let Err(e) = self.socket.send(&datagram).await {
                warn!("UDP transport to {} failed: {}", self.peer, e);
                self.poisoned = true;
                return Err(TransportError::Io(e));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_each_write_is_one_datagram_without_newline() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = receiver.local_addr().unwrap().to_string();

        let mut transport = UdpTransport::connect(&addr).await.unwrap();
        transport.write(b"first\n").unwrap();
        transport.write(b"second").unwrap();
        transport.drain().await.unwrap();

        let mut buf = [0u8; 64];
        let n = receiver.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"first");
        let n = receiver.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"second");
    }
}
