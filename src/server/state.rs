//! Server state.

use std::time::{Duration, Instant};

use super::config::ServerConfig;
use crate::negotiation::Negotiator;

/// Application state shared across handlers
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Negotiator built from the configured registry
    pub negotiator: Negotiator,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(config: ServerConfig) -> Self {
        let negotiator = config.negotiation.negotiator();

        Self {
            config,
            negotiator,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
