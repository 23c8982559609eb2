use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Arithmetic mean of `prices`, `None` for an empty slice
pub fn mean(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    Some(prices.iter().sum::<f64>() / prices.len() as f64)
}

/// Round to cents, ties to even, on the exact stored value of `value`.
/// `None` for NaN or infinite input.
pub fn round_to_cents(value: f64) -> Option<f64> {
    Decimal::from_f64_retain(value)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
        .to_f64()
}

/// Mean price rounded to cents, `None` when there is nothing to average
pub fn mean_price(prices: &[f64]) -> Option<f64> {
    mean(prices).and_then(round_to_cents)
}
