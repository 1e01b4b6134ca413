pub mod tcp;
pub mod transport;
pub mod udp;

pub use tcp::TcpTransport;
pub use transport::{Transport, TransportError};
pub use udp::UdpTransport;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wire protocol used to reach the SIEM / syslog collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    #[serde(rename = "connect_timeout_ms", with = "crate::app::config::duration_ms")]
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::Tcp,
            host: "127.0.0.1".to_string(),
            port: 514,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Transport selected at runtime from configuration.
pub enum SyslogTransport {
    Tcp(TcpTransport),
    Udp(UdpTransport),
}

impl SyslogTransport {
    pub async fn connect(config: &TransportConfig) -> Result<Self, TransportError> {
        let addr = config.address();
        match config.protocol {
            Protocol::Tcp => Ok(Self::Tcp(
                TcpTransport::connect(&addr, config.connect_timeout).await?,
            )),
            Protocol::Udp => Ok(Self::Udp(UdpTransport::connect(&addr).await?)),
        }
    }
}

impl Transport for SyslogTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        match self {
            SyslogTransport::Tcp(t) => t.write(bytes),
            SyslogTransport::Udp(u) => u.write(bytes),
        }
    }

    async fn drain(&mut self) -> Result<(), TransportError> {
        match self {
            SyslogTransport::Tcp(t) => t.drain().await,
            SyslogTransport::Udp(u) => u.drain().await,
        }
    }
}
