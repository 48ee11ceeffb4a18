//! Mock exchange for unit and integration testing.
//!
//! Records every dispatched order so tests can assert on the exact wire
//! parameters without making network requests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::ExchangeError;
use crate::trading::OrderParams;

use super::types::{AccountInfo, Balance, OrderAck};
use super::SpotExchange;

/// How the mock answers order submissions.
#[derive(Debug, Clone, Default)]
pub enum MockOrderBehavior {
    /// Accept with sequential order ids and status `NEW`.
    #[default]
    Accept,
    /// Reject with an exchange business error.
    Reject {
        /// Exchange error code.
        code: i64,
        /// Exchange error message.
        message: String,
    },
    /// Fail as if the network or decoding broke.
    Fail(String),
}

/// Configuration for mock exchange behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Balances returned by `account_info`.
    pub balances: Vec<Balance>,
    /// Whether to fail account requests.
    pub fail_account: bool,
    /// Order submission behavior.
    pub orders: MockOrderBehavior,
}

/// Mock spot exchange. Clones share recorded state.
#[derive(Debug, Clone)]
pub struct MockExchange {
    /// Mock configuration.
    config: Arc<Mutex<MockConfig>>,
    /// Orders received, in order.
    dispatched: Arc<Mutex<Vec<OrderParams>>>,
    /// Number of account fetches.
    account_calls: Arc<Mutex<usize>>,
}

impl MockExchange {
    /// Create a mock that accepts everything and holds no balances.
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create a mock with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
            dispatched: Arc::new(Mutex::new(Vec::new())),
            account_calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Add a balance entry.
    pub fn add_balance(&self, asset: &str, free: &str) {
        self.config.lock().unwrap().balances.push(Balance::new(asset, free));
    }

    /// Make account fetches fail (or succeed again).
    pub fn set_fail_account(&self, fail: bool) {
        self.config.lock().unwrap().fail_account = fail;
    }

    /// Change how orders are answered.
    pub fn set_order_behavior(&self, behavior: MockOrderBehavior) {
        self.config.lock().unwrap().orders = behavior;
    }

    /// Orders dispatched so far.
    pub fn dispatched(&self) -> Vec<OrderParams> {
        self.dispatched.lock().unwrap().clone()
    }

    /// Number of account fetches so far.
    pub fn account_calls(&self) -> usize {
        *self.account_calls.lock().unwrap()
    }

    /// Clear recorded calls.
    pub fn clear(&self) {
        self.dispatched.lock().unwrap().clear();
        *self.account_calls.lock().unwrap() = 0;
    }
}

impl Default for MockExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpotExchange for MockExchange {
    async fn account_info(&self) -> Result<AccountInfo, ExchangeError> {
        *self.account_calls.lock().unwrap() += 1;

        let config = self.config.lock().unwrap();
        if config.fail_account {
            return Err(ExchangeError::Request("Mock account failure".to_string()));
        }

        Ok(AccountInfo {
            can_trade: true,
            account_type: Some("SPOT".to_string()),
            balances: config.balances.clone(),
        })
    }

    async fn create_order(&self, params: &OrderParams) -> Result<OrderAck, ExchangeError> {
        let order_id = {
            let mut dispatched = self.dispatched.lock().unwrap();
            dispatched.push(params.clone());
            dispatched.len() as u64
        };

        match &self.config.lock().unwrap().orders {
            MockOrderBehavior::Accept => Ok(OrderAck::new(order_id, "NEW")
                .with_field("symbol", params.symbol.clone())
                .with_field("side", params.side.to_string())
                .with_field("type", params.kind.to_string())
                .with_field("origQty", params.quantity.to_string())),
            MockOrderBehavior::Reject { code, message } => Err(ExchangeError::Api {
                status: 400,
                code: *code,
                message: message.clone(),
            }),
            MockOrderBehavior::Fail(message) => Err(ExchangeError::Request(message.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
