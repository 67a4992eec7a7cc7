//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (for the server)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[cfg(feature = "crypto")]
use crate::auth::ApiKeyConfig;
use crate::error::{ConnegError, Result};
use crate::negotiation::{DecodeType, DecoderRegistry, Negotiator};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Decoder registry configuration
    #[serde(default)]
    pub negotiation: NegotiationConfig,

    /// Outbound API-key credentials
    #[cfg(feature = "crypto")]
    #[serde(default)]
    pub auth: Option<ApiKeyConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConnegError::Config(format!("Failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| ConnegError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load from `path` (or the default location if it exists), then apply
    /// environment overrides.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = path.or_else(|| default_path().filter(|p| p.exists()));

        let mut config = match path {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(path)?
            },
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Override fields from `CONNEG_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("CONNEG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_number("CONNEG_PORT") {
            self.server.port = port;
        }
        if let Some(size) = env_number("CONNEG_MAX_BODY_SIZE") {
            self.server.max_body_size = size;
        }

        #[cfg(feature = "crypto")]
        self.apply_auth_env();
    }

    #[cfg(feature = "crypto")]
    fn apply_auth_env(&mut self) {
        let url = std::env::var("CONNEG_API_URL").ok();
        let key = std::env::var("CONNEG_API_KEY").ok();
        let secret = std::env::var("CONNEG_API_SECRET").ok();
        let passphrase = std::env::var("CONNEG_API_PASSPHRASE").ok();

        // A passphrase alone is not enough to make up credentials
        if self.auth.is_none() && url.is_none() && key.is_none() && secret.is_none() {
            return;
        }

        let auth = self
            .auth
            .get_or_insert_with(|| ApiKeyConfig::new("", "", ""));
        if let Some(url) = url {
            auth.base_url = url;
        }
        if let Some(key) = key {
            auth.key = key;
        }
        if let Some(secret) = secret {
            auth.secret = secret;
        }
        if passphrase.is_some() {
            auth.passphrase = passphrase;
        }
    }
}

/// Numeric environment override; unparseable values are ignored
fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = std::env::var(name).ok()?;
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!("Ignoring {name}={value}: not a number");
            None
        },
    }
}

/// Default config file location: `<config_dir>/conneg/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("conneg").join("config.toml"))
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_body_size: 2 * 1024 * 1024, // 2 MB
        }
    }
}

impl ServerSettings {
    /// Get the full listen address. IPv6 literals are bracketed.
    pub fn listen_addr(&self) -> String {
        let host = self.host.trim();
        if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{}", self.port)
        } else {
            format!("{host}:{}", self.port)
        }
    }
}

/// One registered decoder family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyConfig {
    /// Primary type, e.g. `application`
    #[serde(rename = "type")]
    pub media_type: String,

    /// Subtype, e.g. `json`
    pub subtype: String,

    /// Decoder handling this family
    pub decoder: DecodeType,
}

/// Decoder registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Family used for `*/*` and for requests without an Accept header
    pub default_family: DecodeType,

    /// Registered families, tried in order
    pub families: Vec<FamilyConfig>,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            default_family: DecodeType::Json,
            families: vec![FamilyConfig {
                media_type: "application".to_string(),
                subtype: "json".to_string(),
                decoder: DecodeType::Json,
            }],
        }
    }
}

impl NegotiationConfig {
    /// Build the decoder registry
    pub fn registry(&self) -> DecoderRegistry {
        self.families
            .iter()
            .fold(DecoderRegistry::new(self.default_family), |registry, family| {
                registry.register(&family.media_type, &family.subtype, family.decoder)
            })
    }

    /// Build a negotiator over the configured registry
    pub fn negotiator(&self) -> Negotiator {
        Negotiator::new(self.registry())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.negotiation.default_family, DecodeType::Json);
        assert_eq!(config.negotiation.registry(), DecoderRegistry::default());
    }

    #[test]
    fn test_listen_addr() {
        let settings = ServerSettings::default();
        assert_eq!(settings.listen_addr(), "127.0.0.1:8080");

        let settings = ServerSettings {
            host: "::1".to_string(),
            ..ServerSettings::default()
        };
        assert_eq!(settings.listen_addr(), "[::1]:8080");
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [server]
            host = "0.0.0.0"
            port = 9090

            [negotiation]
            default_family = "json"

            [[negotiation.families]]
            type = "application"
            subtype = "json"
            decoder = "json"

            [[negotiation.families]]
            type = "application"
            subtype = "vnd.api+json"
            decoder = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        // unspecified fields keep their defaults
        assert_eq!(config.server.max_body_size, 2 * 1024 * 1024);
        assert_eq!(config.negotiation.families.len(), 2);

        let negotiator = config.negotiation.negotiator();
        assert_eq!(negotiator.negotiate("application/vnd.api+json"), DecodeType::Json);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.negotiation.families.len(), 1);
    }

    #[test]
    fn test_unknown_decoder_rejected() {
        let toml = r#"
            [[negotiation.families]]
            type = "application"
            subtype = "xml"
            decoder = "xml"
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[cfg(feature = "crypto")]
    #[test]
    fn test_auth_from_toml() {
        let toml = r#"
            [auth]
            base_url = "https://api.example.com"
            key = "key-1"
            secret = "c2VjcmV0"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let auth = config.auth.unwrap();
        assert_eq!(auth.key, "key-1");
        assert_eq!(auth.header_prefix, "cb-access");
        assert!(auth.passphrase.is_none());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 7000\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.port, 7000);
    }

    // Held by every test that touches CONNEG_* variables
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    const ENV_VARS: [&str; 7] = [
        "CONNEG_HOST",
        "CONNEG_PORT",
        "CONNEG_MAX_BODY_SIZE",
        "CONNEG_API_URL",
        "CONNEG_API_KEY",
        "CONNEG_API_SECRET",
        "CONNEG_API_PASSPHRASE",
    ];

    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
        for (name, value) in vars {
            std::env::set_var(name, value);
        }
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));
        for (name, _) in vars {
            std::env::remove_var(name);
        }
        if let Err(panic) = result {
            std::panic::resume_unwind(panic);
        }
    }

    #[test]
    fn test_from_env() {
        with_env(
            &[
                ("CONNEG_HOST", "0.0.0.0"),
                ("CONNEG_PORT", "9191"),
                ("CONNEG_MAX_BODY_SIZE", "4096"),
            ],
            || {
                let config = Config::from_env();
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.server.port, 9191);
                assert_eq!(config.server.max_body_size, 4096);
                #[cfg(feature = "crypto")]
                assert!(config.auth.is_none());
            },
        );
    }

    #[test]
    fn test_from_env_unset_is_default() {
        with_env(&[], || {
            let config = Config::from_env();
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.server.host, "127.0.0.1");
        });
    }

    #[test]
    fn test_env_bad_number_keeps_value() {
        with_env(
            &[("CONNEG_PORT", "eighty"), ("CONNEG_MAX_BODY_SIZE", "-1")],
            || {
                let config = Config::from_env();
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.server.max_body_size, 2 * 1024 * 1024);
            },
        );
    }

    #[test]
    fn test_load_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nhost = \"10.0.0.1\"\nport = 7000\n").unwrap();

        with_env(&[("CONNEG_PORT", "7100")], || {
            let config = Config::load(Some(path.clone())).unwrap();
            assert_eq!(config.server.port, 7100);
            // not overridden, so the file wins
            assert_eq!(config.server.host, "10.0.0.1");
        });
    }

    #[test]
    fn test_load_missing_explicit_path() {
        with_env(&[], || {
            let err = Config::load(Some(PathBuf::from("/nonexistent/conneg.toml"))).unwrap_err();
            assert!(matches!(err, ConnegError::Config(_)));
        });
    }

    #[cfg(feature = "crypto")]
    #[test]
    fn test_auth_from_env() {
        with_env(
            &[
                ("CONNEG_API_URL", "https://api.example.com"),
                ("CONNEG_API_KEY", "key-env"),
                ("CONNEG_API_SECRET", "c2VjcmV0"),
                ("CONNEG_API_PASSPHRASE", "pass"),
            ],
            || {
                let auth = Config::from_env().auth.unwrap();
                assert_eq!(auth.base_url, "https://api.example.com");
                assert_eq!(auth.key, "key-env");
                assert_eq!(auth.secret, "c2VjcmV0");
                assert_eq!(auth.passphrase.as_deref(), Some("pass"));
                assert_eq!(auth.header_prefix, "cb-access");
            },
        );
    }

    #[cfg(feature = "crypto")]
    #[test]
    fn test_passphrase_alone_creates_no_auth() {
        with_env(&[("CONNEG_API_PASSPHRASE", "pass")], || {
            assert!(Config::from_env().auth.is_none());
        });
    }

    #[cfg(feature = "crypto")]
    #[test]
    fn test_env_overrides_file_auth() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let toml = r#"
            [auth]
            base_url = "https://a.example.com"
            key = "k"
            secret = "c2VjcmV0"
        "#;
        std::fs::write(&path, toml).unwrap();

        with_env(&[("CONNEG_API_PASSPHRASE", "pass")], || {
            let auth = Config::load(Some(path.clone())).unwrap().auth.unwrap();
            assert_eq!(auth.key, "k");
            assert_eq!(auth.passphrase.as_deref(), Some("pass"));
        });
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/nonexistent/conneg.toml").unwrap_err();
        assert!(matches!(err, ConnegError::Config(_)));
    }
}
