//! Server configuration.

use std::net::{SocketAddr, ToSocketAddrs};

use crate::config::{Config, NegotiationConfig};
use crate::error::{ConnegError, Result};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub addr: SocketAddr,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
    /// Decoder registry
    pub negotiation: NegotiationConfig,
    /// Enable request tracing
    pub logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_body_size: 2 * 1024 * 1024, // 2MB
            negotiation: NegotiationConfig::default(),
            logging: true,
        }
    }
}

impl ServerConfig {
    /// Build from the file/environment configuration.
    ///
    /// The host may be an IPv4 or IPv6 literal or a name such as `localhost`,
    /// which is resolved once here.
    pub fn from_config(config: &Config) -> Result<Self> {
        let listen = config.server.listen_addr();
        let addr = listen
            .to_socket_addrs()
            .map_err(|e| ConnegError::Config(format!("Invalid listen address {listen}: {e}")))?
            .next()
            .ok_or_else(|| ConnegError::Config(format!("{listen} resolved to no address")))?;

        Ok(Self {
            addr,
            max_body_size: config.server.max_body_size,
            negotiation: config.negotiation.clone(),
            ..Default::default()
        })
    }

    /// Create with custom port
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }

    /// Bind to all interfaces
    pub fn bind_all(mut self) -> Self {
        self.addr.set_ip([0, 0, 0, 0].into());
        self
    }

    /// Set address directly
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Set max body size
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Set the decoder registry
    pub fn with_negotiation(mut self, negotiation: NegotiationConfig) -> Self {
        self.negotiation = negotiation;
        self
    }

    /// Disable logging
    pub fn without_logging(mut self) -> Self {
        self.logging = false;
        self
    }
}
