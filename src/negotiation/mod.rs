//! Content negotiation for Accept-family headers (RFC 2616 §14).
//!
//! A header value goes through four stages:
//!
//! ```text
//! "application/xml;q=0.9, application/json;q=0.8, */*;q=0.1"
//!        │
//!        v
//!  [split]   media_range  ── tokens, type/subtype, raw params
//!        │
//!        v
//!  [build]   entry        ── q-value + extensions, malformed ranges dropped
//!        │
//!        v
//!  [rank]    ranking      ── q, type, subtype, extensions, position
//!        │
//!        v
//!  [select]  selector     ── first range a registered decoder accepts
//! ```
//!
//! The same grammar applies to `Accept`, `Accept-Charset`, `Accept-Encoding`
//! and `Accept-Language`. Nothing in this module returns an error to the
//! caller: a malformed range is dropped, and the worst outcome is
//! [`DecodeType::Unknown`].

mod entry;
mod error;
mod media_range;
mod ranking;
mod selector;

pub use entry::{PreferenceEntry, DEFAULT_QUALITY};
pub use error::ParseError;
pub use media_range::{split_header, MediaRange};
pub use ranking::{compare, rank, AcceptList};
pub use selector::{DecodeType, DecoderFamily, DecoderRegistry, Negotiator};

/// Wildcard token for type or subtype
pub const WILDCARD: &str = "*";
