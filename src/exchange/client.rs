//! Binance Spot REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::{Config, Credentials};
use crate::error::ExchangeError;
use crate::signing;
use crate::trading::OrderParams;

use super::types::{AccountInfo, ApiErrorBody, OrderAck};
use super::SpotExchange;

const ACCOUNT_PATH: &str = "/api/v3/account";
const ORDER_PATH: &str = "/api/v3/order";
const TEST_ORDER_PATH: &str = "/api/v3/order/test";

/// Signed REST client for the Spot API.
///
/// Holds the long-lived HTTP session; every call is a single request with no
/// retry.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL, no trailing slash.
    base_url: String,
    /// Static key/secret pair.
    credentials: Credentials,
    /// `recvWindow` for signed requests.
    recv_window_ms: u64,
    /// Send orders to the test-order endpoint.
    dry_run: bool,
}

impl BinanceClient {
    /// Create a client from config.
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self, ExchangeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .connect_timeout(Duration::from_secs(5))
            .tcp_nodelay(true)
            .user_agent(concat!("spot-order/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExchangeError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            credentials,
            recv_window_ms: config.recv_window_ms,
            dry_run: config.dry_run,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether orders go to the test-order endpoint.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Send a signed request and return the raw response.
    async fn send_signed(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Response, ExchangeError> {
        let query = signing::signed_query(
            params,
            self.credentials.api_secret(),
            self.recv_window_ms,
            signing::timestamp_ms(),
        )?;
        let url = format!("{}{}?{}", self.base_url, path, query);

        let response = self
            .http
            .request(method, &url)
            .header(signing::API_KEY_HEADER, self.credentials.api_key())
            .send()
            .await?;

        Ok(response)
    }

    /// Read status and body.
    async fn read(response: Response) -> Result<(StatusCode, String), ExchangeError> {
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

/// Decode a response body, mapping non-2xx responses to [`ExchangeError`].
///
/// A non-2xx body shaped like `{"code":..,"msg":..}` is a business rejection;
/// anything else is a plain HTTP failure.
fn parse_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ExchangeError> {
    if !status.is_success() {
        return Err(match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(err) => ExchangeError::Api {
                status: status.as_u16(),
                code: err.code,
                message: err.msg,
            },
            Err(_) => ExchangeError::Http {
                status: status.as_u16(),
                body: body.to_string(),
            },
        });
    }

    serde_json::from_str(body).map_err(|e| ExchangeError::Decode(e.to_string()))
}

/// Interpret the response to an order submission.
///
/// The test-order endpoint answers `{}`, which becomes [`OrderAck::test_order`].
/// A live order must come back with an `orderId`.
fn classify_order(status: StatusCode, body: &str, dry_run: bool) -> Result<OrderAck, ExchangeError> {
    let ack: OrderAck = parse_body(status, body)?;

    if dry_run {
        return Ok(OrderAck::test_order());
    }

    if ack.order_id.is_none() {
        warn!("Order response has no orderId");
        return Err(ExchangeError::Decode("response missing orderId".to_string()));
    }

    Ok(ack)
}

#[async_trait]
impl SpotExchange for BinanceClient {
    #[instrument(skip(self))]
    async fn account_info(&self) -> Result<AccountInfo, ExchangeError> {
        debug!("Fetching account info");

        let response = self.send_signed(Method::GET, ACCOUNT_PATH, &[]).await?;
        let (status, body) = Self::read(response).await?;
        let info: AccountInfo = parse_body(status, &body)?;

        debug!(balances = info.balances.len(), "Retrieved account info");
        Ok(info)
    }

    #[instrument(skip(self, params), fields(symbol = %params.symbol, side = %params.side, kind = %params.kind))]
    async fn create_order(&self, params: &OrderParams) -> Result<OrderAck, ExchangeError> {
        let path = if self.dry_run { TEST_ORDER_PATH } else { ORDER_PATH };
        debug!(path, "Submitting order");

        let response = self.send_signed(Method::POST, path, &params.to_pairs()).await?;
        let (status, body) = Self::read(response).await?;
        let ack = classify_order(status, &body, self.dry_run)?;

        debug!(order_id = ?ack.order_id, status = %ack.status, "Order accepted");
        Ok(ack)
    }

    fn name(&self) -> &'static str {
        if self.dry_run {
            "binance-spot-testnet (test orders)"
        } else {
            "binance-spot-testnet"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::types::TEST_ORDER_STATUS;
    use crate::trading::OrderResult;

    const INSUFFICIENT: &str = "Account has insufficient balance for requested action.";

    fn test_config() -> Config {
        Config {
            binance_testnet_api_key: Some("key".to_string()),
            binance_testnet_api_secret: Some("secret".to_string()),
            binance_base_url: "https://testnet.binance.vision/".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn client_creation_works() {
        let config = test_config();
        let client = BinanceClient::new(&config, config.credentials().unwrap()).unwrap();
        assert_eq!(client.base_url(), "https://testnet.binance.vision");
        assert!(!client.is_dry_run());
        assert_eq!(client.name(), "binance-spot-testnet");
    }

    #[test]
    fn dry_run_is_carried_from_config() {
        let config = Config {
            dry_run: true,
            ..test_config()
        };
        let client = BinanceClient::new(&config, config.credentials().unwrap()).unwrap();
        assert!(client.is_dry_run());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let config = Config {
            binance_base_url: "http://127.0.0.1:9".to_string(),
            http_timeout_ms: 2_000,
            ..test_config()
        };
        let client = BinanceClient::new(&config, config.credentials().unwrap()).unwrap();

        let err = client.account_info().await.unwrap_err();
        assert!(matches!(err, ExchangeError::Request(_)), "got {err:?}");
        assert!(!err.is_business());
    }

    #[test]
    fn error_body_becomes_business_rejection() {
        let body = format!(r#"{{"code":-2010,"msg":"{INSUFFICIENT}"}}"#);
        let err = classify_order(StatusCode::BAD_REQUEST, &body, false).unwrap_err();

        match &err {
            ExchangeError::Api { status, code, message } => {
                assert_eq!(*status, 400);
                assert_eq!(*code, -2010);
                assert_eq!(message, INSUFFICIENT);
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert!(err.is_business());
        assert_eq!(
            OrderResult::from(err).error_message().as_deref(),
            Some(INSUFFICIENT)
        );
    }

    #[test]
    fn non_json_error_body_is_http_failure() {
        let body = "<html><body>502 Bad Gateway</body></html>";
        let err = classify_order(StatusCode::BAD_GATEWAY, body, false).unwrap_err();

        assert!(matches!(&err, ExchangeError::Http { status: 502, body: b } if b == body));
        assert!(!err.is_business());
        assert!(matches!(OrderResult::from(err), OrderResult::Failed { .. }));
    }

    #[test]
    fn error_body_on_dry_run_is_still_rejected() {
        let body = r#"{"code":-1121,"msg":"Invalid symbol."}"#;
        let err = classify_order(StatusCode::BAD_REQUEST, body, true).unwrap_err();
        assert_eq!(err.to_string(), "Invalid symbol.");
    }

    #[test]
    fn empty_success_body_depends_on_endpoint() {
        let ack = classify_order(StatusCode::OK, "{}", true).unwrap();
        assert_eq!(ack, OrderAck::test_order());
        assert_eq!(ack.status, TEST_ORDER_STATUS);

        let err = classify_order(StatusCode::OK, "{}", false).unwrap_err();
        assert!(matches!(err, ExchangeError::Decode(_)), "got {err:?}");
    }

    #[test]
    fn live_order_without_id_is_decode_error() {
        let body = r#"{"symbol":"BTCUSDT","status":"NEW","clientOrderId":"abc"}"#;
        let err = classify_order(StatusCode::OK, body, false).unwrap_err();
        assert_eq!(err.to_string(), "malformed response: response missing orderId");
    }

    #[test]
    fn live_order_keeps_exchange_status() {
        let body = r#"{"symbol":"BTCUSDT","orderId":42,"status":"FILLED"}"#;
        let ack = classify_order(StatusCode::OK, body, false).unwrap();
        assert_eq!(ack.order_id, Some(42));
        assert_eq!(ack.status, "FILLED");
    }

    #[test]
    fn undecodable_success_body_is_decode_error() {
        let err = parse_body::<AccountInfo>(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, ExchangeError::Decode(_)));

        let info: AccountInfo = parse_body(
            StatusCode::OK,
            r#"{"canTrade":true,"balances":[{"asset":"USDT","free":"1.0","locked":"0.0"}]}"#,
        )
        .unwrap();
        assert_eq!(info.balance("USDT").map(|b| b.free.as_str()), Some("1.0"));
    }
}
