//! Order submission and result normalization.
//!
//! [`SpotTrader`] is the only thing the shell talks to. It validates and
//! augments the operator's request, makes exactly one exchange call, and
//! folds every possible outcome into an [`OrderResult`]: nothing raised by
//! the exchange escapes `place_order`.

use tracing::{debug, instrument};

use super::order::{OrderParams, OrderRequest};
use crate::audit::AuditLog;
use crate::error::{ExchangeError, InitializationError, ValidationError};
use crate::exchange::{OrderAck, SpotExchange};

/// Free balance reported when the asset is not in the account snapshot.
pub const BALANCE_ABSENT: &str = "0.0";

/// Free balance reported when the account snapshot cannot be fetched.
pub const BALANCE_UNAVAILABLE: &str = "N/A";

/// Outcome of one order submission.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderResult {
    /// Exchange accepted the order.
    Placed(OrderAck),
    /// Rejected locally; nothing was sent.
    Invalid(ValidationError),
    /// Exchange refused the order for a business reason.
    Rejected {
        /// Exchange error code.
        code: i64,
        /// Exchange error message.
        message: String,
    },
    /// Transport, HTTP or decoding failure.
    Failed {
        /// Error description.
        message: String,
    },
}

impl OrderResult {
    /// Whether the exchange accepted the order.
    pub fn is_placed(&self) -> bool {
        matches!(self, OrderResult::Placed(_))
    }

    /// The acknowledgement, if placed.
    pub fn ack(&self) -> Option<&OrderAck> {
        match self {
            OrderResult::Placed(ack) => Some(ack),
            _ => None,
        }
    }

    /// The single error message carried by every failure variant.
    pub fn error_message(&self) -> Option<String> {
        match self {
            OrderResult::Placed(_) => None,
            OrderResult::Invalid(err) => Some(err.to_string()),
            OrderResult::Rejected { message, .. } => Some(message.clone()),
            OrderResult::Failed { message } => Some(message.clone()),
        }
    }
}

impl From<ExchangeError> for OrderResult {
    /// Business rejections become `Rejected`, everything else `Failed`.
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::Api { code, message, .. } => OrderResult::Rejected { code, message },
            other => OrderResult::Failed {
                message: other.to_string(),
            },
        }
    }
}

/// Order adapter over a live exchange session.
#[derive(Debug)]
pub struct SpotTrader<E> {
    exchange: E,
    audit: AuditLog,
}

impl<E: SpotExchange> SpotTrader<E> {
    /// Verify the session with one account fetch and wrap it.
    ///
    /// Any failure is fatal to the caller; there is no retry.
    #[instrument(skip_all, fields(exchange = exchange.name()))]
    pub async fn initialize(exchange: E, audit: AuditLog) -> Result<Self, InitializationError> {
        match exchange.account_info().await {
            Ok(info) => {
                debug!(balances = info.balances.len(), can_trade = info.can_trade, "Connectivity check passed");
                audit.info("Initialized Binance Client on Spot Testnet.");
                Ok(Self { exchange, audit })
            }
            Err(e) => {
                audit.error(format!("Initialization Error: {e}"));
                Err(InitializationError::from(e))
            }
        }
    }

    /// Submit one order and normalize the outcome.
    #[instrument(skip_all, fields(symbol = %request.symbol, side = %request.side, order_type = %request.order_type))]
    pub async fn place_order(&self, request: &OrderRequest) -> OrderResult {
        self.audit.info(format!(
            "Attempting to place {} {} order for {} {}",
            request.side, request.order_type, request.quantity, request.symbol
        ));

        let params = match OrderParams::from_request(request) {
            Ok(params) => params,
            Err(e) => {
                self.audit.error(format!("Validation Error: {e}"));
                return OrderResult::Invalid(e);
            }
        };

        debug!(?params, "Dispatching order");

        match self.exchange.create_order(&params).await {
            Ok(ack) => {
                let echoed = serde_json::to_string(&ack).unwrap_or_else(|_| format!("{ack:?}"));
                self.audit.info(format!("Order Success: {echoed}"));
                OrderResult::Placed(ack)
            }
            Err(e) if e.is_business() => {
                self.audit.error(format!("Binance API Error: {e}"));
                OrderResult::from(e)
            }
            Err(e) => {
                self.audit.error(format!("General Error: {e}"));
                OrderResult::from(e)
            }
        }
    }

    /// Free balance of `asset`, `"0.0"` if absent, `"N/A"` if the fetch fails.
    #[instrument(skip(self))]
    pub async fn account_balance(&self, asset: &str) -> String {
        match self.exchange.account_info().await {
            Ok(info) => info
                .balance(asset)
                .map(|b| b.free.clone())
                .unwrap_or_else(|| BALANCE_ABSENT.to_string()),
            Err(e) => {
                self.audit.error(format!("Error fetching balance: {e}"));
                BALANCE_UNAVAILABLE.to_string()
            }
        }
    }

    /// The audit log.
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Tear down, returning the audit log so the caller can close it.
    pub fn into_audit(self) -> AuditLog {
        self.audit
    }
}
