use rust_decimal::Decimal;

use super::OrderRules;

/// Price tick and minimum notional, the two restrictions most spot exchanges
/// publish per market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickRules {
    /// Prices must be a multiple of this.
    pub price_tick: Option<Decimal>,
    /// `price * amount` must be at least this. A notional too large for
    /// `Decimal` passes.
    pub min_notional: Option<Decimal>,
}

impl OrderRules for TickRules {
    fn is_valid_price(&self, price: Decimal) -> bool {
        match self.price_tick {
            Some(tick) if !tick.is_zero() => price.checked_rem(tick).map_or(false, |r| r.is_zero()),
            _ => true,
        }
    }

    fn is_valid_lot(&self, price: Decimal, amount: Decimal) -> bool {
        self.min_notional.map_or(true, |min| {
            price.checked_mul(amount).map_or(true, |notional| notional >= min)
        })
    }
}
