//! Exchange response payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account snapshot from `GET /api/v3/account`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// Whether the account may trade.
    #[serde(default)]
    pub can_trade: bool,
    /// Account type, e.g. `SPOT`.
    #[serde(default)]
    pub account_type: Option<String>,
    /// Per-asset balances.
    #[serde(default)]
    pub balances: Vec<Balance>,
}

impl AccountInfo {
    /// Find the balance entry for an asset (exact match).
    pub fn balance(&self, asset: &str) -> Option<&Balance> {
        self.balances.iter().find(|b| b.asset == asset)
    }
}

/// Single asset balance. Amounts stay as the exchange's decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Asset code, e.g. `USDT`.
    pub asset: String,
    /// Available amount.
    pub free: String,
    /// Amount held by open orders.
    #[serde(default)]
    pub locked: String,
}

impl Balance {
    /// Create a balance entry with nothing locked.
    pub fn new(asset: impl Into<String>, free: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            free: free.into(),
            locked: "0.00000000".to_string(),
        }
    }
}

/// Order acknowledgement from `POST /api/v3/order`.
///
/// `order_id` and `status` are pulled out; every other field the exchange
/// echoed back is kept in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    /// Exchange-assigned id. Absent for test orders.
    #[serde(rename = "orderId", default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<u64>,
    /// Order status, e.g. `NEW` or `FILLED`. Empty for `ACK` responses.
    #[serde(default)]
    pub status: String,
    /// Remaining echoed fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Status reported for orders sent to the test-order endpoint.
pub const TEST_ORDER_STATUS: &str = "TEST";

impl OrderAck {
    /// Acknowledgement for a live order.
    pub fn new(order_id: u64, status: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id),
            status: status.into(),
            fields: Map::new(),
        }
    }

    /// Acknowledgement for an order that was validated but not placed.
    pub fn test_order() -> Self {
        Self {
            order_id: None,
            status: TEST_ORDER_STATUS.to_string(),
            fields: Map::new(),
        }
    }

    /// Attach an echoed field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Look up an echoed field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Negative exchange error code.
    pub code: i64,
    /// Human-readable message.
    pub msg: String,
}
