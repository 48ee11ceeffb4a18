//! Spot testnet order client entry point.

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use rust_decimal::Decimal;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spot_order::audit::AuditLog;
use spot_order::config::Config;
use spot_order::exchange::{BinanceClient, SpotExchange};
use spot_order::shell::{render_result, Shell, ShellOptions};
use spot_order::trading::{OrderRequest, OrderType, Side, SpotTrader, BALANCE_UNAVAILABLE};
use spot_order::BotError;

/// Place spot orders on the Binance Spot Testnet.
#[derive(Parser, Debug)]
#[command(name = "spot-order")]
#[command(about = "Interactive client for placing spot orders on the Binance Spot Testnet")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Validate orders with the test-order endpoint instead of placing them.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive order shell (default).
    Trade,

    /// Place a single order and exit.
    Place {
        /// Instrument, e.g. BTCUSDT.
        #[arg(long)]
        symbol: String,

        /// BUY or SELL.
        #[arg(long, value_parser = parse_side)]
        side: Side,

        /// MARKET, LIMIT or STOP_LOSS.
        #[arg(long = "type", value_parser = parse_order_type)]
        order_type: OrderType,

        /// Base-asset quantity.
        #[arg(long)]
        quantity: Decimal,

        /// Limit/stop price (LIMIT and STOP_LOSS only).
        #[arg(long)]
        price: Option<Decimal>,
    },

    /// Show the free balance of an asset.
    Balance {
        /// Asset code; defaults to BALANCE_ASSET.
        #[arg(long)]
        asset: Option<String>,
    },

    /// Check configuration validity without contacting the exchange.
    CheckConfig,
}

fn parse_side(raw: &str) -> Result<Side, String> {
    Side::from_str(&raw.to_uppercase()).map_err(|_| format!("invalid side '{raw}', expected BUY or SELL"))
}

fn parse_order_type(raw: &str) -> Result<OrderType, String> {
    OrderType::from_str(&raw.to_uppercase())
        .map_err(|_| format!("unsupported order type '{raw}', expected MARKET, LIMIT or STOP_LOSS"))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load().context("failed to load configuration")?;
    if args.dry_run {
        config.dry_run = true;
    }

    // Initialize console logging; the audit log is opened per command
    let filter = if args.verbose {
        EnvFilter::new("spot_order=debug,audit=debug,warn")
    } else {
        EnvFilter::try_new(&config.rust_log).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    // Handle subcommands
    match args.command.unwrap_or(Command::Trade) {
        Command::Trade => cmd_trade(&config).await,
        Command::Place {
            symbol,
            side,
            order_type,
            quantity,
            price,
        } => {
            let request = OrderRequest::new(symbol.to_uppercase(), side, order_type, quantity)
                .with_optional_price(price);
            cmd_place(&config, request).await
        }
        Command::Balance { asset } => {
            let asset = asset.unwrap_or_else(|| config.balance_asset.clone());
            cmd_balance(&config, &asset.to_uppercase()).await
        }
        Command::CheckConfig => cmd_check_config(&config),
    }
}

/// Validate config, open the audit log, and verify connectivity.
///
/// Missing credentials stop here before any network call.
async fn connect(config: &Config) -> spot_order::Result<SpotTrader<BinanceClient>> {
    config.validate().map_err(BotError::InvalidConfig)?;
    let credentials = config.credentials()?;

    let audit = AuditLog::open(&config.log_file).map_err(|e| {
        error!(path = %config.log_file, "Failed to open audit log: {}", e);
        e
    })?;

    let client = BinanceClient::new(config, credentials)?;
    info!(exchange = client.name(), url = client.base_url(), "Connecting");

    let trader = SpotTrader::initialize(client, audit).await.map_err(|e| {
        error!("Failed to connect: {}", e);
        e
    })?;

    if config.dry_run {
        trader
            .audit()
            .warn("Dry run enabled: orders are validated by the exchange but not placed.");
    }
    Ok(trader)
}

/// Run the interactive shell.
async fn cmd_trade(config: &Config) -> anyhow::Result<ExitCode> {
    let trader = connect(config).await?;
    let color = io::stdout().is_terminal();

    let connected = "Successfully connected to Binance Spot Testnet.";
    if color {
        println!("{}", connected.green());
    } else {
        println!("{connected}");
    }
    if config.dry_run {
        println!("Dry run: orders are validated by the exchange but not placed.");
    }

    let options = ShellOptions {
        balance_asset: config.balance_asset.clone(),
        log_file: config.log_file.clone(),
        color,
    };
    let mut shell = Shell::new(BufReader::new(tokio::io::stdin()), io::stdout(), options);
    let submitted = shell.run(&trader).await?;
    info!(submitted, "Session finished");

    trader.into_audit().close()?;
    Ok(ExitCode::SUCCESS)
}

/// Place one order non-interactively.
async fn cmd_place(config: &Config, request: OrderRequest) -> anyhow::Result<ExitCode> {
    let trader = connect(config).await?;

    let result = trader.place_order(&request).await;
    render_result(&mut io::stdout(), &result, io::stdout().is_terminal())?;

    trader.into_audit().close()?;
    Ok(if result.is_placed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print the free balance of one asset.
async fn cmd_balance(config: &Config, asset: &str) -> anyhow::Result<ExitCode> {
    let trader = connect(config).await?;

    let balance = trader.account_balance(asset).await;
    println!("Current {} Balance: {}", asset, balance);

    trader.into_audit().close()?;
    Ok(if balance == BALANCE_UNAVAILABLE {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<ExitCode> {
    println!("==================================================");
    println!("SPOT ORDER CLIENT - CONFIGURATION CHECK");
    println!("==================================================");

    // Validate configuration
    print!("Validating configuration... ");
    if let Err(e) = config.validate() {
        println!("FAILED");
        println!("  Error: {}", e);
        return Ok(ExitCode::FAILURE);
    }
    println!("OK");

    // Check credentials
    print!("Checking credentials... ");
    let credentials_ok = match config.credentials() {
        Ok(_) => {
            println!("OK");
            true
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            false
        }
    };

    // Show configuration summary
    println!("--------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Base URL: {}", config.base_url());
    println!("  Dry Run: {}", config.dry_run);
    println!("  Balance Asset: {}", config.balance_asset);
    println!("  Audit Log: {}", config.log_file);
    println!("  HTTP Timeout: {}ms", config.http_timeout_ms);
    println!("  Recv Window: {}ms", config.recv_window_ms);
    println!("==================================================");

    if credentials_ok {
        println!("CONFIGURATION CHECK PASSED");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("CONFIGURATION CHECK FAILED");
        Ok(ExitCode::FAILURE)
    }
}
