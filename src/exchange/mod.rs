//! Exchange transport.
//!
//! This module handles:
//! - The `SpotExchange` seam the order adapter talks to
//! - Signed REST client for the Spot Testnet
//! - Response payload types
//! - Mock exchange for testing

pub mod client;
pub mod mock;
pub mod types;

use async_trait::async_trait;

use crate::error::ExchangeError;
use crate::trading::OrderParams;

pub use client::BinanceClient;
pub use mock::{MockConfig, MockExchange, MockOrderBehavior};
pub use types::{AccountInfo, Balance, OrderAck};

/// A spot exchange reachable over a live session.
#[async_trait]
pub trait SpotExchange: Send + Sync {
    /// Fetch the account snapshot, including balances.
    async fn account_info(&self) -> Result<AccountInfo, ExchangeError>;

    /// Submit one order exactly as given.
    async fn create_order(&self, params: &OrderParams) -> Result<OrderAck, ExchangeError>;

    /// Exchange name for logging.
    fn name(&self) -> &'static str;
}
