//! Consumer pricing rules: availability, stock reservation, and the tiered
//! basket markup.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;
use crate::errors::DomainError;

/// Basket-size markup tiers. The multiplier is applied exactly once, to the
/// raw sum of the whole basket, never per item.
pub fn tier_multiplier(items: usize) -> Decimal {
    if items < 10 {
        Decimal::new(121, 2)
    } else if items < 20 {
        Decimal::new(117, 2)
    } else {
        Decimal::new(115, 2)
    }
}

/// Reserve one unit: decrement stock and yield the unit price, or report the
/// product as unavailable (out of stock or unpublished).
pub fn reserve(product: &mut Product) -> Result<Decimal, DomainError> {
    if !product.is_available() {
        return Err(DomainError::invalid("product not available"));
    }
    product.quantity -= 1;
    Ok(product.price)
}

/// Apply the tier multiplier for `items` to the raw sum and round the result
/// to two decimal places.
pub fn apply_tier(raw_total: Decimal, items: usize) -> Decimal {
    (raw_total * tier_multiplier(items))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A finished checkout quote: the marked-up total and the number of items it
/// covers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub total: Decimal,
    pub items: usize,
}
