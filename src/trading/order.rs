//! Order types and wire parameter construction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ValidationError;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order.
    #[strum(serialize = "BUY", serialize = "buy")]
    Buy,
    /// Sell order.
    #[strum(serialize = "SELL", serialize = "sell")]
    Sell,
}

/// Order type as chosen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Fill immediately at the best available price.
    #[strum(serialize = "MARKET", serialize = "market")]
    Market,
    /// Rest on the book at a fixed price.
    #[strum(serialize = "LIMIT", serialize = "limit")]
    Limit,
    /// Limit order armed once the stop price trades.
    #[strum(serialize = "STOP_LOSS", serialize = "stop_loss")]
    StopLoss,
}

impl OrderType {
    /// All operator-facing types, in prompt order.
    pub const ALL: [OrderType; 3] = [OrderType::Market, OrderType::Limit, OrderType::StopLoss];

    /// Whether a price must accompany this type.
    pub fn requires_price(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLoss)
    }
}

/// Order type as sent to the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    /// `MARKET`
    #[strum(serialize = "MARKET")]
    Market,
    /// `LIMIT`
    #[strum(serialize = "LIMIT")]
    Limit,
    /// `STOP_LOSS_LIMIT`; spot stop-losses must carry a limit price.
    #[strum(serialize = "STOP_LOSS_LIMIT")]
    StopLossLimit,
}

/// Order time-in-force. Priced orders always rest until filled or cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good-till-cancelled.
    #[strum(serialize = "GTC", serialize = "gtc")]
    GTC,
}

/// What the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// Exchange instrument id, e.g. `BTCUSDT`.
    pub symbol: String,
    /// Order side.
    pub side: Side,
    /// Operator-facing order type.
    pub order_type: OrderType,
    /// Base-asset quantity.
    pub quantity: Decimal,
    /// Limit/stop price. Ignored for MARKET.
    pub price: Option<Decimal>,
}

impl OrderRequest {
    /// Create a request without a price.
    pub fn new(symbol: impl Into<String>, side: Side, order_type: OrderType, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type,
            quantity,
            price: None,
        }
    }

    /// Attach a price.
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Attach an optional price.
    pub fn with_optional_price(mut self, price: Option<Decimal>) -> Self {
        self.price = price;
        self
    }
}

/// Order parameters exactly as dispatched to the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderParams {
    /// Instrument id.
    pub symbol: String,
    /// Order side.
    pub side: Side,
    /// Wire order type.
    #[serde(rename = "type")]
    pub kind: OrderKind,
    /// Base-asset quantity.
    pub quantity: Decimal,
    /// Time-in-force, limit-style orders only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    /// Limit price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Trigger price, stop orders only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
}

impl OrderParams {
    /// Build wire parameters from an operator request.
    ///
    /// Pure: the result depends only on the request. MARKET never carries a
    /// price, STOP_LOSS becomes STOP_LOSS_LIMIT with stop and limit price both
    /// set to the requested price.
    pub fn from_request(request: &OrderRequest) -> Result<Self, ValidationError> {
        let symbol = request.symbol.trim();
        if symbol.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        if request.quantity <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveQuantity);
        }

        let mut params = Self {
            symbol: symbol.to_string(),
            side: request.side,
            kind: OrderKind::Market,
            quantity: request.quantity.normalize(),
            time_in_force: None,
            price: None,
            stop_price: None,
        };

        let kind = match request.order_type {
            OrderType::Market => return Ok(params),
            OrderType::Limit => OrderKind::Limit,
            OrderType::StopLoss => OrderKind::StopLossLimit,
        };

        let price = request
            .price
            .ok_or(ValidationError::MissingPrice {
                order_type: request.order_type,
            })?;
        if price <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice);
        }
        let price = price.normalize();

        params.kind = kind;
        params.time_in_force = Some(TimeInForce::GTC);
        params.price = Some(price);
        if kind == OrderKind::StopLossLimit {
            params.stop_price = Some(price);
        }

        Ok(params)
    }

    /// Parameters as ordered `(name, value)` pairs for the query string.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("symbol", self.symbol.clone()),
            ("side", self.side.to_string()),
            ("type", self.kind.to_string()),
            ("quantity", self.quantity.to_string()),
        ];
        if let Some(tif) = self.time_in_force {
            pairs.push(("timeInForce", tif.to_string()));
        }
        if let Some(price) = self.price {
            pairs.push(("price", price.to_string()));
        }
        if let Some(stop_price) = self.stop_price {
            pairs.push(("stopPrice", stop_price.to_string()));
        }
        pairs
    }
}
