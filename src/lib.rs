//! Spot order client for the Binance Spot Testnet.
//!
//! Takes one order at a time from an operator, turns it into the exchange's
//! wire parameters, submits it, and reports the outcome.
//!
//! # Order types
//!
//! ```text
//! MARKET     -> type=MARKET
//! LIMIT      -> type=LIMIT            timeInForce=GTC price=P
//! STOP_LOSS  -> type=STOP_LOSS_LIMIT  timeInForce=GTC price=P stopPrice=P
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`audit`]: Append-only audit log
//! - [`signing`]: HMAC request signing
//! - [`exchange`]: Exchange seam, REST client and mock
//! - [`trading`]: Order types, parameter construction and submission
//! - [`shell`]: Interactive operator shell

pub mod audit;
pub mod config;
pub mod error;
pub mod exchange;
pub mod shell;
pub mod signing;
pub mod trading;

pub use config::Config;
pub use error::{BotError, Result};
