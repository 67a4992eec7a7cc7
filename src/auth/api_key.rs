//! HMAC-SHA256 API-key signing for outbound requests.
//!
//! The signature covers `timestamp + method + path + body` and is keyed with
//! the base64-decoded API secret. It is sent base64-encoded alongside the
//! key, optional passphrase and timestamp headers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Request, Response, Url};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::error::Result;

type HmacSha256 = Hmac<Sha256>;

/// Default prefix for the signature headers
pub const DEFAULT_HEADER_PREFIX: &str = "cb-access";

/// Errors from request signing
#[derive(Debug, Error)]
pub enum SignError {
    /// No base URL configured
    #[error("Base URL is required")]
    UrlRequired,

    /// Base URL could not be parsed or applied
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// Secret is not valid base64 or cannot key the MAC
    #[error("Invalid secret: {0}")]
    InvalidSecret(String),

    /// Header name or value contains invalid characters
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Request body is a stream and cannot be read for signing
    #[error("Request body must be buffered to be signed")]
    UnbufferedBody,
}

/// API-key credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    /// Base URL requests are sent to, e.g. `https://api.example.com`
    pub base_url: String,
    /// Key identifier sent in `<prefix>-key`
    pub key: String,
    /// Optional passphrase sent in `<prefix>-passphrase`
    #[serde(default)]
    pub passphrase: Option<String>,
    /// Base64-encoded signing secret
    pub secret: String,
    /// Prefix for the signature headers
    #[serde(default = "default_header_prefix")]
    pub header_prefix: String,
}

fn default_header_prefix() -> String {
    DEFAULT_HEADER_PREFIX.to_string()
}

impl ApiKeyConfig {
    /// Create credentials with the default header prefix
    pub fn new(base_url: &str, key: &str, secret: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            key: key.to_string(),
            passphrase: None,
            secret: secret.to_string(),
            header_prefix: default_header_prefix(),
        }
    }

    /// Set the passphrase
    pub fn with_passphrase(mut self, passphrase: &str) -> Self {
        self.passphrase = Some(passphrase.to_string());
        self
    }

    /// Set the header prefix
    pub fn with_header_prefix(mut self, prefix: &str) -> Self {
        self.header_prefix = prefix.to_string();
        self
    }
}

/// Signs requests with an API key
#[derive(Clone)]
pub struct ApiKeySigner {
    base_url: Url,
    key: String,
    passphrase: Option<String>,
    secret: Vec<u8>,
    header_prefix: String,
}

impl std::fmt::Debug for ApiKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeySigner")
            .field("base_url", &self.base_url.as_str())
            .field("key", &self.key)
            .field("header_prefix", &self.header_prefix)
            .finish_non_exhaustive()
    }
}

impl ApiKeySigner {
    /// Validate credentials and build a signer
    pub fn new(config: ApiKeyConfig) -> std::result::Result<Self, SignError> {
        if config.base_url.trim().is_empty() {
            return Err(SignError::UrlRequired);
        }
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| SignError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.host_str().is_none() {
            return Err(SignError::InvalidUrl(format!(
                "{}: missing host",
                config.base_url
            )));
        }

        let secret = decode_secret(&config.secret)?;

        Ok(Self {
            base_url,
            key: config.key,
            passphrase: config.passphrase,
            secret,
            header_prefix: config.header_prefix,
        })
    }

    /// Base URL requests are redirected to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Compute the base64 signature for one request.
    ///
    /// Same inputs always give the same signature.
    pub fn signature(
        &self,
        method: &str,
        path: &str,
        body: &[u8],
        timestamp: &str,
    ) -> std::result::Result<String, SignError> {
        hmac_signature(&self.secret, method, path, body, timestamp)
    }

    /// Sign a request using the current time
    pub fn sign(&self, request: &mut Request) -> std::result::Result<(), SignError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        self.sign_at(request, &timestamp)
    }

    /// Sign a request with an explicit Unix timestamp.
    ///
    /// Points the request at the base URL's scheme, host and port, and adds
    /// the signature headers. Nothing else about the request changes.
    pub fn sign_at(
        &self,
        request: &mut Request,
        timestamp: &str,
    ) -> std::result::Result<(), SignError> {
        let body: &[u8] = match request.body() {
            Some(body) => body.as_bytes().ok_or(SignError::UnbufferedBody)?,
            None => &[],
        };
        let path = request_path(&self.base_url, request.url());
        let sig = self.signature(request.method().as_str(), &path, body, timestamp)?;

        self.retarget(request.url_mut())?;

        let headers = request.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.append(headers, "key", &self.key)?;
        if let Some(ref passphrase) = self.passphrase {
            self.append(headers, "passphrase", passphrase)?;
        }
        self.append(headers, "sign", &sig)?;
        self.append(headers, "timestamp", timestamp)?;

        tracing::debug!(
            method = %request.method(),
            path = %path,
            timestamp,
            "signed request"
        );
        Ok(())
    }

    fn retarget(&self, url: &mut Url) -> std::result::Result<(), SignError> {
        let scheme = self.base_url.scheme();
        url.set_scheme(scheme)
            .map_err(|()| SignError::InvalidUrl(format!("cannot use scheme {scheme}")))?;
        url.set_host(self.base_url.host_str())
            .map_err(|e| SignError::InvalidUrl(e.to_string()))?;
        url.set_port(self.base_url.port())
            .map_err(|()| SignError::InvalidUrl("cannot set port".to_string()))?;
        Ok(())
    }

    fn append(
        &self,
        headers: &mut HeaderMap,
        suffix: &str,
        value: &str,
    ) -> std::result::Result<(), SignError> {
        let name = format!("{}-{suffix}", self.header_prefix);
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| SignError::InvalidHeader(format!("{name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| SignError::InvalidHeader(format!("{name}: {e}")))?;
        headers.append(name, value);
        Ok(())
    }
}

/// Signature for a base64-encoded secret, without building a signer
pub fn signature(
    secret: &str,
    method: &str,
    path: &str,
    body: &[u8],
    timestamp: &str,
) -> std::result::Result<String, SignError> {
    let secret = decode_secret(secret)?;
    hmac_signature(&secret, method, path, body, timestamp)
}

fn decode_secret(secret: &str) -> std::result::Result<Vec<u8>, SignError> {
    STANDARD
        .decode(secret.trim())
        .map_err(|e| SignError::InvalidSecret(format!("error decoding secret: {e}")))
}

/// `base64(HMAC-SHA256(secret, timestamp + method + path + body))`
fn hmac_signature(
    secret: &[u8],
    method: &str,
    path: &str,
    body: &[u8],
    timestamp: &str,
) -> std::result::Result<String, SignError> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| SignError::InvalidSecret(e.to_string()))?;
    mac.update(timestamp.as_bytes());
    mac.update(method.as_bytes());
    mac.update(path.as_bytes());
    mac.update(body);

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Path and query of a URL, as covered by the signature.
///
/// The path is taken relative to the base URL's path, so with a base of
/// `https://api.example.com/v1` a request for `/v1/orders` signs `/orders`.
fn request_path(base: &Url, url: &Url) -> String {
    let base_path = base.path().trim_end_matches('/');
    let path = match url.path().strip_prefix(base_path) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => url.path(),
    };
    match url.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    }
}

/// HTTP client that signs every request before sending it
#[derive(Debug, Clone)]
pub struct SignedClient {
    client: Client,
    signer: ApiKeySigner,
}

impl SignedClient {
    /// Wrap a client
    pub fn new(client: Client, signer: ApiKeySigner) -> Self {
        Self { client, signer }
    }

    /// Build from credentials with a default client
    pub fn from_config(config: ApiKeyConfig) -> Result<Self> {
        Ok(Self::new(Client::new(), ApiKeySigner::new(config)?))
    }

    /// Underlying client, for building requests
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Signer in use
    pub fn signer(&self) -> &ApiKeySigner {
        &self.signer
    }

    /// Sign and send a request
    pub async fn execute(&self, mut request: Request) -> Result<Response> {
        self.signer.sign(&mut request)?;
        let response = self.client.execute(request).await?;
        Ok(response)
    }
}
