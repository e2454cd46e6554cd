//! Shared helpers for money arithmetic.
//!
//! Internal calculations stay in full [`Decimal`] precision; rounding to
//! cents happens only where a figure is about to be shown to someone.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up
/// rounding (midpoints go away from zero), the usual convention for
/// dollar amounts.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Formats a dollar amount for display: rounded to cents, two decimal
/// places, leading `$`. Every rendered document and screen goes through
/// this one function so figures never disagree between surfaces.
pub fn format_money(value: Decimal) -> String {
    format!("${:.2}", round_half_up(value))
}
