//! Pre-flight order checks against market minimums and exchange rules.

mod rules;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use rules::TickRules;

/// Smallest order a market accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MinimalOrder {
    pub amount: Decimal,
}

/// Market metadata needed to check an order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Market {
    pub minimal_order: MinimalOrder,
}

/// Exchange-specific order restrictions. Exchanges without a restriction keep
/// the default, which accepts everything.
pub trait OrderRules {
    fn is_valid_price(&self, _price: Decimal) -> bool {
        true
    }

    fn is_valid_lot(&self, _price: Decimal, _amount: Decimal) -> bool {
        true
    }
}

/// Exchange with no price or lot restrictions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRules;

impl OrderRules for NoRules {}

/// Why an order was rejected before it reached the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("Amount is too small")]
    AmountTooSmall,
    #[error("Price is not valid")]
    InvalidPrice,
    #[error("Lot size is too small")]
    LotTooSmall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderValidity {
    pub valid: bool,
    pub reason: Option<InvalidReason>,
}

impl OrderValidity {
    fn from_reason(reason: Option<InvalidReason>) -> Self {
        Self {
            valid: reason.is_none(),
            reason,
        }
    }
}

/// Check amount, then price, then lot size; report only the first failure.
pub fn is_valid_order<R>(api: &R, market: &Market, amount: Decimal, price: Decimal) -> OrderValidity
where
    R: OrderRules + ?Sized,
{
    let reason = if amount < market.minimal_order.amount {
        Some(InvalidReason::AmountTooSmall)
    } else if !api.is_valid_price(price) {
        Some(InvalidReason::InvalidPrice)
    } else if !api.is_valid_lot(price, amount) {
        Some(InvalidReason::LotTooSmall)
    } else {
        None
    };
    OrderValidity::from_reason(reason)
}
