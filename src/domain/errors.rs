use rust_decimal::Decimal;
use thiserror::Error;

/// Hard input errors raised by the fee module before any arithmetic runs.
///
/// Every variant means "do not place this order". Callers must abort the
/// order they were costing, never retry with clamped or defaulted inputs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeeError {
    #[error("Margin must be positive, got {margin}")]
    NonPositiveMargin { margin: Decimal },

    #[error("Leverage must be positive, got {leverage}")]
    NonPositiveLeverage { leverage: Decimal },

    #[error("Entry price must be positive, got {price}")]
    NonPositiveEntryPrice { price: Decimal },

    #[error("Weighted breakeven requires at least one entry fill")]
    EmptyWeightedEntries,

    #[error("Weighted entry needs positive price and quantity, got price {price}, quantity {quantity}")]
    InvalidWeightedEntry { price: Decimal, quantity: Decimal },
}

/// Error for wire strings that do not map onto a closed enum.
///
/// Order type, position side and market segment arrive from signals as
/// plain text; parsing them up front keeps unknown strings out of the
/// decision logic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unrecognized {what}: '{input}'")]
pub struct ParseEnumError {
    pub what: &'static str,
    pub input: String,
}

impl ParseEnumError {
    pub fn new(what: &'static str, input: &str) -> Self {
        Self {
            what,
            input: input.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fee_error_formatting() {
        let err = FeeError::NonPositiveMargin {
            margin: dec!(-1000),
        };
        assert_eq!(err.to_string(), "Margin must be positive, got -1000");

        let err = FeeError::InvalidWeightedEntry {
            price: dec!(0),
            quantity: dec!(2),
        };
        let msg = err.to_string();
        assert!(msg.contains("price 0"));
        assert!(msg.contains("quantity 2"));
    }

    #[test]
    fn test_parse_enum_error_formatting() {
        let err = ParseEnumError::new("order type", "TWAP");
        assert_eq!(err.to_string(), "Unrecognized order type: 'TWAP'");
    }
}
