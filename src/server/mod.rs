//! HTTP service in front of the negotiator.
//!
//! Provides a small HTTP API around content negotiation:
//! - `GET /health`: liveness
//! - `GET /negotiate`: classify the request's `Accept` header
//! - `POST /decode`: decode the body with the negotiated decoder
//!
//! # Example
//!
//! ```rust,ignore
//! use conneg::server::{Server, ServerConfig};
//!
//! let config = ServerConfig::default().with_port(8080);
//! let server = Server::new(config);
//! server.run().await?;
//! ```

mod config;
mod handlers;
mod state;

pub use config::ServerConfig;
pub use handlers::{create_router, health_check, DecodeResponse, NegotiateResponse};
pub use state::AppState;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::error::{ConnegError, Result};

/// HTTP server
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a server from its configuration
    pub fn new(config: ServerConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(config)),
        }
    }

    /// Shared state
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Bind and serve until the listener fails
    pub async fn run(&self) -> Result<()> {
        let addr = self.state.config.addr;
        let router = create_router(self.state.clone());

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ConnegError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        tracing::info!("Conneg server listening on http://{}", addr);
        tracing::info!(
            "Decoder families: {}",
            self.state
                .negotiator
                .registry()
                .families()
                .iter()
                .map(|f| format!("{}/{}={}", f.media_type, f.subtype, f.decode_type))
                .collect::<Vec<_>>()
                .join(", ")
        );

        axum::serve(listener, router)
            .await
            .map_err(|e| ConnegError::Server(format!("Server error: {}", e)))?;

        Ok(())
    }
}
