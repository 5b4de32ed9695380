//! Responder configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use identd_core::constants::{DEFAULT_IDENT_PORT, DEFAULT_READ_TIMEOUT, MAX_REQUEST_LINE};

/// Configuration for the ident responder.
///
/// Hosts that listen dual-stack pass `::` as the bind address; the resolver's
/// address normalization absorbs the resulting v4-mapped peer addresses.
#[derive(Debug, Clone)]
pub struct IdentConfig {
    /// Address the listener binds to.
    pub bind_addr: IpAddr,
    /// Port the listener binds to. Zero selects an ephemeral port (test use).
    pub port: u16,
    /// Idle cap on reading the single request line.
    pub read_timeout: Duration,
    /// Request-line byte cap.
    pub max_line: usize,
}

impl Default for IdentConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_IDENT_PORT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_line: MAX_REQUEST_LINE,
        }
    }
}

impl IdentConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_addr(mut self, addr: IpAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the listen port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the request-line read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the request-line byte cap.
    pub fn with_max_line(mut self, max: usize) -> Self {
        self.max_line = max;
        self
    }

    /// The socket address the listener will bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
