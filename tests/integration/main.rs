//! Integration tests for the spot order client.
//!
//! Most tests drive the public API through `MockExchange`. The live test
//! needs Spot Testnet credentials and network access.
//! Run with: cargo test --test integration -- --ignored

use std::path::Path;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

use spot_order::audit::AuditLog;
use spot_order::config::Config;
use spot_order::exchange::{BinanceClient, MockExchange, MockOrderBehavior};
use spot_order::shell::{Shell, ShellOptions};
use spot_order::trading::{
    OrderKind, OrderRequest, OrderResult, OrderType, Side, SpotTrader, TimeInForce,
    BALANCE_ABSENT, BALANCE_UNAVAILABLE,
};

async fn trader_with_log(mock: &MockExchange, log: &Path) -> SpotTrader<MockExchange> {
    let audit = AuditLog::open(log).expect("open audit log");
    SpotTrader::initialize(mock.clone(), audit)
        .await
        .expect("mock initialization")
}

fn log_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn limit_scenario_dispatches_exact_params_and_logs() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("trading_bot.log");
    let mock = MockExchange::new();
    let trader = trader_with_log(&mock, &log).await;

    let request = OrderRequest::new("BTCUSDT", Side::Buy, OrderType::Limit, dec!(0.01))
        .with_price(dec!(50000));
    let result = trader.place_order(&request).await;
    trader.into_audit().close().unwrap();

    assert!(result.is_placed());
    let sent = mock.dispatched();
    assert_eq!(
        sent[0].to_pairs(),
        vec![
            ("symbol", "BTCUSDT".to_string()),
            ("side", "BUY".to_string()),
            ("type", "LIMIT".to_string()),
            ("quantity", "0.01".to_string()),
            ("timeInForce", "GTC".to_string()),
            ("price", "50000".to_string()),
        ]
    );

    let lines = log_lines(&log);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with(" - INFO - Initialized Binance Client on Spot Testnet."));
    assert!(lines[1].ends_with(" - INFO - Attempting to place BUY LIMIT order for 0.01 BTCUSDT"));
    assert!(lines[2].contains(" - INFO - Order Success: {"));
    assert!(lines[2].contains("\"orderId\":1"));
}

#[tokio::test]
async fn stop_loss_scenario_is_remapped() {
    let mock = MockExchange::new();
    let trader = SpotTrader::initialize(mock.clone(), AuditLog::disabled())
        .await
        .unwrap();

    let request = OrderRequest::new("ETHUSDT", Side::Sell, OrderType::StopLoss, dec!(1.0))
        .with_price(dec!(3000));
    assert!(trader.place_order(&request).await.is_placed());

    let sent = &mock.dispatched()[0];
    assert_eq!(sent.kind, OrderKind::StopLossLimit);
    assert_eq!(sent.time_in_force, Some(TimeInForce::GTC));

    let pairs = sent.to_pairs();
    assert!(pairs.contains(&("type", "STOP_LOSS_LIMIT".to_string())));
    assert!(pairs.contains(&("stopPrice", "3000".to_string())));
    assert!(pairs.contains(&("price", "3000".to_string())));
}

#[tokio::test]
async fn missing_price_scenario_makes_no_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("trading_bot.log");
    let mock = MockExchange::new();
    let trader = trader_with_log(&mock, &log).await;

    let request = OrderRequest::new("BTCUSDT", Side::Buy, OrderType::Limit, dec!(0.01));
    let result = trader.place_order(&request).await;
    drop(trader);

    assert!(matches!(result, OrderResult::Invalid(_)));
    assert_eq!(
        result.error_message().as_deref(),
        Some("Price is required for LIMIT orders.")
    );
    assert!(mock.dispatched().is_empty());

    let lines = log_lines(&log);
    assert!(lines
        .last()
        .unwrap()
        .ends_with(" - ERROR - Validation Error: Price is required for LIMIT orders."));
}

#[tokio::test]
async fn business_rejection_is_logged_and_returned() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("trading_bot.log");
    let mock = MockExchange::new();
    mock.set_order_behavior(MockOrderBehavior::Reject {
        code: -2010,
        message: "Account has insufficient balance for requested action.".to_string(),
    });
    let trader = trader_with_log(&mock, &log).await;

    let request = OrderRequest::new("BTCUSDT", Side::Buy, OrderType::Market, dec!(100));
    let result = trader.place_order(&request).await;
    drop(trader);

    assert_eq!(
        result.error_message().as_deref(),
        Some("Account has insufficient balance for requested action.")
    );
    assert!(log_lines(&log).last().unwrap().ends_with(
        " - ERROR - Binance API Error: Account has insufficient balance for requested action."
    ));
}

#[test]
fn balance_sentinels() {
    let mock = MockExchange::new();
    mock.add_balance("BTC", "1.00000000");

    tokio_test::block_on(async {
        let trader = SpotTrader::initialize(mock.clone(), AuditLog::disabled())
            .await
            .unwrap();

        assert_eq!(trader.account_balance("BTC").await, "1.00000000");
        assert_eq!(trader.account_balance("USDT").await, BALANCE_ABSENT);

        mock.set_fail_account(true);
        assert_eq!(trader.account_balance("USDT").await, BALANCE_UNAVAILABLE);
    });
}

#[tokio::test]
async fn failed_initialization_is_logged() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("trading_bot.log");
    let mock = MockExchange::new();
    mock.set_fail_account(true);

    let audit = AuditLog::open(&log).unwrap();
    assert!(SpotTrader::initialize(mock, audit).await.is_err());

    let lines = log_lines(&log);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(" - ERROR - Initialization Error: "));
}

#[tokio::test]
async fn shell_session_with_failure_then_success() {
    let mock = MockExchange::new();
    mock.add_balance("USDT", "500.00000000");
    mock.set_order_behavior(MockOrderBehavior::Fail("operation timed out".to_string()));
    let trader = SpotTrader::initialize(mock.clone(), AuditLog::disabled())
        .await
        .unwrap();

    let input = "btcusdt\nbuy\nmarket\n0.001\ny\n";
    let mut shell = Shell::new(input.as_bytes(), Vec::new(), ShellOptions::default());
    let submitted = shell.run(&trader).await.unwrap();
    let out = String::from_utf8(shell.into_output()).unwrap();

    assert_eq!(submitted, 1);
    assert!(out.contains("Current USDT Balance: 500.00000000"));
    assert!(out.contains("Order Failed: request failed: operation timed out"));

    mock.set_order_behavior(MockOrderBehavior::Accept);
    let mut shell = Shell::new(
        "ethusdt\nsell\nstop_loss\n1\n3000\nn\n".as_bytes(),
        Vec::new(),
        ShellOptions::default(),
    );
    shell.run(&trader).await.unwrap();
    let out = String::from_utf8(shell.into_output()).unwrap();

    assert!(out.contains("Order ID: 2"));
    assert_eq!(mock.dispatched()[1].kind, OrderKind::StopLossLimit);
}

/// Get a live config from environment.
fn live_config() -> Option<Config> {
    let config = Config::load().ok()?;
    config.credentials().ok()?;
    Some(config)
}

/// Check connectivity and place a validated-only order against the Spot Testnet.
#[tokio::test]
#[ignore = "requires BINANCE_TESTNET_API_KEY and BINANCE_TESTNET_API_SECRET"]
async fn live_testnet_dry_run_order() {
    let Some(mut config) = live_config() else {
        println!("Skipping: testnet credentials not set");
        return;
    };
    config.dry_run = true;

    let client = BinanceClient::new(&config, config.credentials().unwrap()).unwrap();
    let trader = SpotTrader::initialize(client, AuditLog::disabled())
        .await
        .expect("testnet connectivity check");

    let balance = trader.account_balance("USDT").await;
    assert_ne!(balance, BALANCE_UNAVAILABLE);
    println!("USDT balance: {}", balance);

    let request = OrderRequest::new("BTCUSDT", Side::Buy, OrderType::Limit, dec!(0.001))
        .with_price(dec!(10000));
    let result = trader.place_order(&request).await;
    assert!(result.is_placed(), "test order failed: {:?}", result.error_message());
}
