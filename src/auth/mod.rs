//! Outbound request authentication.
//!
//! Requests to an upstream API are signed with an API key: an HMAC-SHA256
//! digest over the timestamp, method, path and body, attached as headers
//! together with the key identifier and timestamp.
//!
//! ```rust,ignore
//! use conneg::auth::{ApiKeyConfig, SignedClient};
//!
//! let client = SignedClient::from_config(ApiKeyConfig::new(
//!     "https://api.example.com",
//!     "my-key",
//!     "c2VjcmV0",
//! ))?;
//! let request = client.client().get("https://api.example.com/v2/accounts").build()?;
//! let response = client.execute(request).await?;
//! ```

mod api_key;

pub use api_key::{
    signature, ApiKeyConfig, ApiKeySigner, SignError, SignedClient, DEFAULT_HEADER_PREFIX,
};
