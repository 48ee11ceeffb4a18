//! Application configuration loaded from environment variables.

use std::fmt;

use serde::Deserialize;

use crate::error::{BotError, Result};

/// Application configuration loaded from environment variables.
#[derive(Clone, Deserialize)]
pub struct Config {
    // === Testnet Credentials ===
    /// API key issued by the Spot Testnet.
    #[serde(default)]
    pub binance_testnet_api_key: Option<String>,

    /// API secret issued by the Spot Testnet.
    #[serde(default)]
    pub binance_testnet_api_secret: Option<String>,

    // === Exchange ===
    /// REST base URL.
    #[serde(default = "default_base_url")]
    pub binance_base_url: String,

    /// Request timeout for every exchange call.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    /// `recvWindow` sent with signed requests.
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,

    /// Validate orders against the test-order endpoint instead of placing them.
    #[serde(default)]
    pub dry_run: bool,

    // === Operator ===
    /// Asset whose free balance is shown at startup.
    #[serde(default = "default_balance_asset")]
    pub balance_asset: String,

    /// Append-only audit log path.
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Console log filter (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_base_url() -> String {
    "https://testnet.binance.vision".to_string()
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

fn default_recv_window_ms() -> u64 {
    5_000
}

fn default_balance_asset() -> String {
    "USDT".to_string()
}

fn default_log_file() -> String {
    "trading_bot.log".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            binance_testnet_api_key: None,
            binance_testnet_api_secret: None,
            binance_base_url: default_base_url(),
            http_timeout_ms: default_http_timeout_ms(),
            recv_window_ms: default_recv_window_ms(),
            dry_run: false,
            balance_asset: default_balance_asset(),
            log_file: default_log_file(),
            rust_log: default_log_level(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("binance_testnet_api_key", &redacted(&self.binance_testnet_api_key))
            .field("binance_testnet_api_secret", &redacted(&self.binance_testnet_api_secret))
            .field("binance_base_url", &self.binance_base_url)
            .field("http_timeout_ms", &self.http_timeout_ms)
            .field("recv_window_ms", &self.recv_window_ms)
            .field("dry_run", &self.dry_run)
            .field("balance_asset", &self.balance_asset)
            .field("log_file", &self.log_file)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

fn redacted(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "<set>")
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check if the configuration is valid.
    ///
    /// Credentials are checked separately by [`Config::credentials`] so that
    /// `check-config` can report them without failing outright.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let url = &self.binance_base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err("BINANCE_BASE_URL must be an http(s) URL".to_string());
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be greater than 0".to_string());
        }

        // Exchange rejects recvWindow above 60000.
        if self.recv_window_ms == 0 || self.recv_window_ms > 60_000 {
            return Err("RECV_WINDOW_MS must be between 1 and 60000".to_string());
        }

        if self.balance_asset.trim().is_empty() {
            return Err("BALANCE_ASSET must not be empty".to_string());
        }

        if self.log_file.trim().is_empty() {
            return Err("LOG_FILE must not be empty".to_string());
        }

        Ok(())
    }

    /// Extract the key/secret pair, failing if either is missing or blank.
    pub fn credentials(&self) -> Result<Credentials> {
        let key = self.binance_testnet_api_key.as_deref().unwrap_or_default().trim();
        let secret = self.binance_testnet_api_secret.as_deref().unwrap_or_default().trim();

        if key.is_empty() || secret.is_empty() {
            return Err(BotError::MissingCredentials);
        }

        Ok(Credentials::new(key, secret))
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.binance_base_url.trim_end_matches('/')
    }
}

/// Static API key/secret pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// The public API key, sent as a header.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The secret used to sign requests. Never sent.
    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}
