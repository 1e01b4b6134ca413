use std::future::Future;
use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("Timed out after {timeout:?} connecting to {addr}")]
    ConnectTimeout { addr: String, timeout: Duration },
    #[error("No address resolved for {0}")]
    Unresolved(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Transport closed after an earlier failure")]
    Closed,
}

/// A flow-controlled byte sink.
///
/// `write` only queues bytes; nothing is guaranteed to have left the process
/// until `drain` returns. Callers that care about backpressure drain after
/// every write.
pub trait Transport: Send {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    fn drain(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;
}
