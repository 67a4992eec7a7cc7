//! # Conneg - HTTP Content Negotiation
//!
//! Parses `Accept`-family headers (RFC 2616 §14) into ranked preferences and
//! picks the decoder family a request body should be handled with.
//!
//! ## Features
//!
//! - **Per-range failure isolation**: a malformed media range is dropped,
//!   never the whole header
//! - **Deterministic ranking**: q-value, type and subtype specificity,
//!   extension count, then header position
//! - **Configurable registry**: decoder families are configuration, not code
//! - **Request signing**: HMAC-SHA256 API-key signing for outbound requests
//! - **HTTP surface**: Axum service exposing negotiation and decoding
//!
//! ## Ranking
//!
//! | Key | Rule                         | Example winner                   |
//! |-----|------------------------------|----------------------------------|
//! | 1   | higher `q` first             | `text/html;q=0.9` over `;q=0.8`  |
//! | 2   | concrete type before `*`     | `text/*` over `*/*`              |
//! | 3   | concrete subtype before `*`  | `text/html` over `text/*`        |
//! | 4   | more extensions first        | `text/html;level=1` over `text/html` |
//! | 5   | earlier in the header first  | first of two identical ranges    |
//!
//! ## Selection
//!
//! The ranked list is walked in order. `*/*` resolves to the registry
//! default, a range accepted by a registered family resolves to that family,
//! and anything else is skipped. An absent or blank header resolves to the
//! default; a header with no acceptable range resolves to
//! [`DecodeType::Unknown`].
//!
//! ## Quick Start
//!
//! ```
//! use conneg::{AcceptList, DecodeType, Negotiator};
//!
//! let negotiator = Negotiator::default();
//! assert_eq!(negotiator.negotiate("application/json"), DecodeType::Json);
//! assert_eq!(negotiator.negotiate("text/html"), DecodeType::Unknown);
//!
//! let ranked = AcceptList::parse("text/*;q=0.5, text/html, */*;q=0.1");
//! assert_eq!(ranked.first().unwrap().essence(), "text/html");
//! ```
//!
//! ## Modules
//!
//! - [`negotiation`]: Splitting, entry building, ranking and selection
//! - [`auth`]: API-key request signing (`crypto` feature)
//! - [`server`]: HTTP API server (Axum-based)
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

#[cfg(feature = "crypto")]
pub mod auth;
pub mod config;
pub mod error;
pub mod negotiation;
pub mod server;

// Re-exports for convenience
#[cfg(feature = "crypto")]
pub use auth::{ApiKeyConfig, ApiKeySigner, SignedClient};
pub use config::Config;
pub use error::{ConnegError, Result};
pub use negotiation::{
    AcceptList, DecodeType, DecoderFamily, DecoderRegistry, Negotiator, PreferenceEntry,
};
pub use server::{AppState, Server, ServerConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Classify a header with the default registry (`application/json`).
pub fn best_fit_decode_type(header: &str) -> DecodeType {
    Negotiator::default().negotiate(header)
}
