use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a dollar amount.
#[derive(Debug, Error)]
#[error("invalid amount '{input}': {source}")]
pub struct ParseMoneyError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for money parsing: trims whitespace and removes commas
/// (thousands separator) and a leading dollar sign.
fn normalize_money_input(s: &str) -> String {
    s.trim().trim_start_matches('$').replace(',', "")
}

/// Parses a string into a [`Decimal`] dollar amount.
///
/// Handles `$` prefixes and comma thousands separators (e.g. `"$1,234.56"`).
/// Empty or whitespace-only input is treated as 0.
pub fn parse_money(s: &str) -> Result<Decimal, ParseMoneyError> {
    let normalized = normalize_money_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid amount: {}", e);
        ParseMoneyError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Parses a string into an optional dollar amount. Returns `None` for empty
/// or whitespace-only input, or when parsing fails (logs a warning on parse
/// failure).
pub fn parse_optional_money(s: &str) -> Option<Decimal> {
    let normalized = normalize_money_input(s);
    if normalized.is_empty() {
        None
    } else {
        normalized.parse().map_or_else(
            |e| {
                tracing::warn!(input = %s, "invalid optional amount: {}", e);
                None
            },
            Some,
        )
    }
}

/// Parses a quantity field. Unparseable input coerces to 1 and anything
/// below 1 clamps up, matching the estimate builder's entry rule.
pub fn parse_quantity(s: &str) -> i64 {
    s.trim().parse::<i64>().unwrap_or(1).max(1)
}
