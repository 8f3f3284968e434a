//! `exutil validate-order` – pre-flight check of amount, price and lot size.

use anyhow::Result;
use exutil_core::order::{is_valid_order, Market, MinimalOrder, TickRules};
use rust_decimal::Decimal;

pub fn run_validate_order(
    min_amount: Decimal,
    amount: Decimal,
    price: Decimal,
    price_tick: Option<Decimal>,
    min_notional: Option<Decimal>,
) -> Result<()> {
    let market = Market {
        minimal_order: MinimalOrder { amount: min_amount },
    };
    let rules = TickRules {
        price_tick,
        min_notional,
    };
    let validity = is_valid_order(&rules, &market, amount, price);
    match validity.reason {
        None => println!("valid"),
        Some(reason) => {
            tracing::info!(%amount, %price, "order rejected: {}", reason);
            println!("invalid: {}", reason);
        }
    }
    Ok(())
}
