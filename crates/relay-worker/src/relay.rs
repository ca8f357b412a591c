// UDP relay - receive vendor syslog, decode, forward JSON downstream

use crate::config::ListenerConfig;
use relay_core::line::decode_datagram;
use relay_core::Decoder;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("failed to bind {addr}: {source} (is the port already in use?)")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("no decoder registered for vendor '{0}'")]
    UnknownVendor(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub struct Relay {
    vendor: String,
    decoder: Arc<Decoder>,
    socket: UdpSocket,
    // unbound-port socket used for every forwarded datagram
    forward_socket: UdpSocket,
    forward: SocketAddr,
    max_datagram: usize,
    processed: Arc<AtomicU64>,
}

impl Relay {
    pub async fn bind(config: &ListenerConfig, decoder: Arc<Decoder>) -> Result<Self, RelayError> {
        let socket = UdpSocket::bind(config.listen)
            .await
            .map_err(|source| RelayError::Bind {
                addr: config.listen,
                source,
            })?;

        let forward_bind: SocketAddr = if config.forward.is_ipv6() {
            SocketAddr::from(([0u16; 8], 0))
        } else {
            SocketAddr::from(([0, 0, 0, 0], 0))
        };
        let forward_socket = UdpSocket::bind(forward_bind)
            .await
            .map_err(|source| RelayError::Bind {
                addr: forward_bind,
                source,
            })?;

        Ok(Self {
            vendor: config.vendor.clone(),
            decoder,
            socket,
            forward_socket,
            forward: config.forward,
            max_datagram: config.max_datagram(),
            processed: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.socket.local_addr()?)
    }

    /// Counter of datagrams handled so far, readable after the relay is moved.
    pub fn processed(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.processed)
    }

    /// Receive loop. Per-datagram failures are logged and skipped, the loop
    /// only ends when the task is dropped.
    pub async fn run(self) -> Result<(), RelayError> {
        info!(
            vendor = %self.vendor,
            listen = %self.local_addr()?,
            forward = %self.forward,
            "Ready - waiting for logs..."
        );

        let mut buf = vec![0u8; self.max_datagram];
        loop {
            let (len, peer) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    error!(vendor = %self.vendor, "Failed to receive datagram: {}", e);
                    continue;
                }
            };
            self.processed.fetch_add(1, Ordering::Relaxed);

            let line = decode_datagram(&buf[..len]);
            debug!(vendor = %self.vendor, %peer, bytes = len, "Received datagram");

            let output = self.decoder.process(&line);
            if let Err(e) = self
                .forward_socket
                .send_to(output.as_bytes(), self.forward)
                .await
            {
                error!(vendor = %self.vendor, forward = %self.forward, "Failed to forward: {}", e);
            }
        }
    }
}
