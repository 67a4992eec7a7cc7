//! Per-token parse failures.
//!
//! These never escape [`super::Negotiator::negotiate`]: the failing media range
//! is logged and dropped, and the remaining ranges are still considered.

use thiserror::Error;

/// Why a single media range was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The type/subtype segment contained more than one `/`.
    #[error("Invalid type '{0}'")]
    MalformedTypeSubtype(String),

    /// A parameter had no `name=value` shape, or `q` was not a
    /// non-negative number.
    #[error("Invalid parameter '{0}'")]
    InvalidParameter(String),
}
