//! Trading module for order construction and submission.
//!
//! This module handles:
//! - Order types and wire parameter construction
//! - Order submission and result normalization

pub mod execution;
pub mod order;

pub use execution::{OrderResult, SpotTrader, BALANCE_ABSENT, BALANCE_UNAVAILABLE};
pub use order::{OrderKind, OrderParams, OrderRequest, OrderType, Side, TimeInForce};
