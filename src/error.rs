//! Unified error types for the spot order client.

use thiserror::Error;

use crate::trading::OrderType;

/// Process-level error type.
///
/// Only startup failures travel through this type; order submission problems
/// are reported as [`crate::trading::OrderResult`] values instead.
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("configuration validation failed: {0}")]
    InvalidConfig(String),

    /// API key or secret absent from the environment.
    #[error("API keys not found: set BINANCE_TESTNET_API_KEY and BINANCE_TESTNET_API_SECRET in the environment or .env file")]
    MissingCredentials,

    /// Connectivity check against the exchange failed.
    #[error(transparent)]
    Initialization(#[from] InitializationError),

    /// Exchange client could not be built.
    #[error("exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    /// Audit log could not be opened or flushed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Startup connectivity check failure. Always fatal.
#[derive(Error, Debug)]
#[error("initialization error: {source}")]
pub struct InitializationError {
    /// The failing exchange call.
    #[source]
    pub source: ExchangeError,
}

impl From<ExchangeError> for InitializationError {
    fn from(source: ExchangeError) -> Self {
        Self { source }
    }
}

/// Order rejected locally, before anything is sent to the exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Symbol was blank.
    #[error("Symbol is required.")]
    EmptySymbol,

    /// Quantity was zero or negative.
    #[error("Quantity must be greater than zero.")]
    NonPositiveQuantity,

    /// LIMIT or STOP_LOSS submitted without a price.
    #[error("Price is required for {order_type} orders.")]
    MissingPrice {
        /// The order type that needs a price.
        order_type: OrderType,
    },

    /// Price supplied but zero or negative.
    #[error("Price must be greater than zero.")]
    NonPositivePrice,
}

/// Errors returned by an exchange transport.
#[derive(Error, Debug, Clone)]
pub enum ExchangeError {
    /// The exchange understood the request and refused it
    /// (insufficient balance, unknown symbol, filter failure, ...).
    #[error("{message}")]
    Api {
        /// HTTP status of the response.
        status: u16,
        /// Exchange error code, e.g. -2010.
        code: i64,
        /// Exchange error message.
        message: String,
    },

    /// Non-success response without a recognizable error body.
    #[error("HTTP {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Request could not be built or sent (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Request(String),

    /// Response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),

    /// Request could not be signed.
    #[error("signing failed: {0}")]
    Signing(String),
}

impl ExchangeError {
    /// Whether this is a business rejection reported by the exchange itself.
    pub fn is_business(&self) -> bool {
        matches!(self, ExchangeError::Api { .. })
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ExchangeError::Decode(err.to_string())
        } else {
            ExchangeError::Request(err.to_string())
        }
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, BotError>;
