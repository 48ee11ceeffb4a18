//! Interactive operator shell.
//!
//! Prompts for one order at a time, hands it to [`SpotTrader`], and renders
//! the outcome. Reading and writing are generic so the whole loop can be
//! driven from a byte buffer in tests.

use std::io::{self, Write};
use std::str::FromStr;

use owo_colors::{OwoColorize, Style};
use rust_decimal::Decimal;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::exchange::SpotExchange;
use crate::trading::{OrderRequest, OrderResult, OrderType, Side, SpotTrader};

const RULE: &str = "==================================================";

/// Shell settings.
#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// Asset whose balance is shown at startup.
    pub balance_asset: String,
    /// Audit log path, mentioned on exit.
    pub log_file: String,
    /// Emit ANSI colors.
    pub color: bool,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            balance_asset: "USDT".to_string(),
            log_file: "trading_bot.log".to_string(),
            color: false,
        }
    }
}

/// Result of prompting for one order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Prompted {
    /// A complete request.
    Order(OrderRequest),
    /// Operator input could not be used; message already explains why.
    Retry(String),
    /// Input closed.
    Eof,
}

/// Interactive order loop.
pub struct Shell<R, W> {
    input: R,
    output: W,
    options: ShellOptions,
}

impl<R, W> Shell<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    /// Create a shell over the given input and output.
    pub fn new(input: R, output: W, options: ShellOptions) -> Self {
        Self {
            input,
            output,
            options,
        }
    }

    /// Give back the output writer.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until the operator declines to continue or input ends.
    ///
    /// Returns the number of orders handed to the trader.
    pub async fn run<E: SpotExchange>(&mut self, trader: &SpotTrader<E>) -> io::Result<usize> {
        print_header(&mut self.output, self.options.color)?;

        let balance = trader.account_balance(&self.options.balance_asset).await;
        writeln!(
            self.output,
            "Current {} Balance: {}\n",
            self.options.balance_asset,
            paint(&balance, Style::new().yellow(), self.options.color)
        )?;

        let mut submitted = 0;
        loop {
            let request = match self.prompt_order().await? {
                Prompted::Order(request) => request,
                Prompted::Retry(message) => {
                    writeln!(self.output, "{}", paint(&message, Style::new().red(), self.options.color))?;
                    continue;
                }
                Prompted::Eof => break,
            };

            writeln!(
                self.output,
                "{}",
                paint("\nProcessing Order...", Style::new().yellow(), self.options.color)
            )?;
            let result = trader.place_order(&request).await;
            submitted += 1;
            render_result(&mut self.output, &result, self.options.color)?;

            match self.read_line("\nPlace another order? (y/n): ").await? {
                Some(answer) if answer.eq_ignore_ascii_case("y") => {}
                _ => break,
            }
        }

        writeln!(
            self.output,
            "Exiting. Check {} for history.",
            self.options.log_file
        )?;
        self.output.flush()?;

        debug!(submitted, "Shell finished");
        Ok(submitted)
    }

    /// Collect one order from the operator.
    async fn prompt_order(&mut self) -> io::Result<Prompted> {
        let Some(symbol) = self.read_field("Enter Symbol (e.g., BTCUSDT): ").await? else {
            return Ok(Prompted::Eof);
        };

        let Some(side) = self.read_field("Enter Side (BUY/SELL): ").await? else {
            return Ok(Prompted::Eof);
        };
        let Ok(side) = Side::from_str(&side) else {
            return Ok(Prompted::Retry(format!(
                "Invalid side '{side}'. Please enter BUY or SELL."
            )));
        };

        let types = OrderType::ALL
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(self.output, "\nAvailable Types: {types}")?;
        let Some(order_type) = self.read_field("Enter Order Type: ").await? else {
            return Ok(Prompted::Eof);
        };
        let Ok(order_type) = OrderType::from_str(&order_type) else {
            return Ok(Prompted::Retry(format!(
                "Unsupported order type '{order_type}'. Available Types: {types}"
            )));
        };

        let Some(quantity) = self.read_line("Enter Quantity: ").await? else {
            return Ok(Prompted::Eof);
        };
        let Some(quantity) = parse_decimal(&quantity) else {
            return Ok(Prompted::Retry(invalid_number()));
        };

        let mut price = None;
        if order_type.requires_price() {
            let Some(raw) = self.read_line("Enter Price: ").await? else {
                return Ok(Prompted::Eof);
            };
            let Some(parsed) = parse_decimal(&raw) else {
                return Ok(Prompted::Retry(invalid_number()));
            };
            price = Some(parsed);
        }

        Ok(Prompted::Order(
            OrderRequest::new(symbol, side, order_type, quantity).with_optional_price(price),
        ))
    }

    /// Prompt for a text field, upper-cased.
    async fn read_field(&mut self, prompt: &str) -> io::Result<Option<String>> {
        Ok(self.read_line(prompt).await?.map(|s| s.to_uppercase()))
    }

    /// Prompt and read one trimmed line. `None` at end of input.
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", paint(prompt, Style::new().green(), self.options.color))?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Print the banner.
pub fn print_header(out: &mut impl Write, color: bool) -> io::Result<()> {
    let title = "       SPOT ORDER CLIENT (BINANCE TESTNET)       ";
    writeln!(out, "{}", paint(RULE, Style::new().cyan(), color))?;
    writeln!(out, "{}", paint(title, Style::new().cyan(), color))?;
    writeln!(out, "{}", paint(RULE, Style::new().cyan(), color))
}

/// Render an order outcome the same way for the shell and one-shot orders.
pub fn render_result(out: &mut impl Write, result: &OrderResult, color: bool) -> io::Result<()> {
    match result {
        OrderResult::Placed(ack) => {
            writeln!(out, "{}", paint("Order Executed Successfully!", Style::new().cyan(), color))?;
            match ack.order_id {
                Some(id) => writeln!(out, "Order ID: {id}")?,
                None => writeln!(out, "Order ID: none (validated only, not placed)")?,
            }
            writeln!(out, "Status: {}", ack.status)
        }
        failed => {
            let message = failed.error_message().unwrap_or_default();
            writeln!(
                out,
                "{}",
                paint(&format!("Order Failed: {message}"), Style::new().red(), color)
            )
        }
    }
}

fn paint(text: &str, style: Style, color: bool) -> String {
    if color {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .ok()
}

fn invalid_number() -> String {
    "Invalid number format. Please try again.".to_string()
}
