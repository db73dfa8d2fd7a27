//! Per-symbol precision rules loaded from a KuCoin symbol dump.
//!
//! The exchange declares, per symbol, the minimum/maximum order size,
//! the quantity and price increments, and whether trading is enabled.
//! The table is loaded once at construction and read-only afterwards.
//! A missing or malformed dump degrades to an empty table so the bot
//! keeps running without it.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Absolute slack when checking increment alignment. Absorbs binary
/// floating-point noise picked up before quantities reach this crate,
/// not economically meaningful tolerance.
pub const INCREMENT_TOLERANCE: Decimal = dec!(0.0000000001);

/// Granularity and bounds KuCoin declares for one symbol.
///
/// Field names follow the exchange's own JSON casing. Every field is
/// optional because the dump is not guaranteed complete; the accessors
/// on [`PrecisionTable`] define what each absence means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SymbolPrecisionRule {
    pub base_min_size: Option<Decimal>,
    pub base_max_size: Option<Decimal>,
    pub base_increment: Option<Decimal>,
    pub quote_min_size: Option<Decimal>,
    pub price_increment: Option<Decimal>,
    pub enable_trading: Option<bool>,
}

/// Read-only lookup of [`SymbolPrecisionRule`]s keyed by the
/// exchange-native symbol string.
#[derive(Debug, Clone, Default)]
pub struct PrecisionTable {
    rules: HashMap<String, SymbolPrecisionRule>,
}

impl PrecisionTable {
    /// Table with no rules: all validation passes, no symbol is enabled.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: HashMap<String, SymbolPrecisionRule>) -> Self {
        Self { rules }
    }

    /// Parse a precision dump held in memory, degrading to an empty
    /// table on malformed input.
    pub fn from_json_str(json: &str) -> Self {
        match serde_json::from_str(json).context("Failed to parse precision rules JSON") {
            Ok(rules) => Self { rules },
            Err(err) => {
                warn!("Precision rules unusable ({err:#}), continuing with empty table");
                Self::empty()
            }
        }
    }

    /// Load the precision dump from disk.
    ///
    /// Never fails: a missing or unparseable file is logged and the
    /// table starts empty, since the trading core must survive without
    /// this reference data.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(rules) => {
                info!("Loaded {} precision rules from {:?}", rules.len(), path);
                Self { rules }
            }
            Err(err) => {
                warn!(
                    "Precision rules unavailable ({err:#}), continuing with empty table"
                );
                Self::empty()
            }
        }
    }

    fn try_load(path: &Path) -> Result<HashMap<String, SymbolPrecisionRule>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read precision rules from {:?}", path))?;
        serde_json::from_str(&content).context("Failed to parse precision rules JSON")
    }

    pub fn rule(&self, symbol: &str) -> Option<&SymbolPrecisionRule> {
        self.rules.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check an order quantity against the symbol's declared bounds and
    /// increment.
    ///
    /// Fail-open: a symbol with no rule, or a rule with absent fields,
    /// permits any quantity. Trading-enablement is the conservative
    /// check ([`Self::is_symbol_supported`]); order-shape validation
    /// deliberately is not.
    pub fn validate_quantity(&self, symbol: &str, quantity: Decimal) -> bool {
        let Some(rule) = self.rules.get(symbol) else {
            return true;
        };
        if let Some(min) = rule.base_min_size {
            if quantity < min {
                return false;
            }
        }
        if let Some(max) = rule.base_max_size {
            if quantity > max {
                return false;
            }
        }
        match rule.base_increment {
            Some(increment) => aligned(quantity, increment),
            None => true,
        }
    }

    /// Check an order price against the symbol's minimum quote size and
    /// price increment. Same fail-open default as quantities.
    pub fn validate_price(&self, symbol: &str, price: Decimal) -> bool {
        let Some(rule) = self.rules.get(symbol) else {
            return true;
        };
        if let Some(min) = rule.quote_min_size {
            if price < min {
                return false;
            }
        }
        match rule.price_increment {
            Some(increment) => aligned(price, increment),
            None => true,
        }
    }

    /// Render a quantity rounded to the symbol's quantity increment.
    pub fn format_quantity(&self, symbol: &str, quantity: Decimal) -> String {
        let increment = self.rules.get(symbol).and_then(|rule| rule.base_increment);
        format_to_increment(quantity, increment)
    }

    /// Render a price rounded to the symbol's price increment.
    pub fn format_price(&self, symbol: &str, price: Decimal) -> String {
        let increment = self.rules.get(symbol).and_then(|rule| rule.price_increment);
        format_to_increment(price, increment)
    }

    /// Whether the exchange has trading enabled for this symbol.
    ///
    /// Fail-closed: an unknown symbol or an absent flag reads as not
    /// tradable. This is the opposite bias from `validate_*` on
    /// purpose; enablement gates real orders and stays conservative.
    pub fn is_symbol_supported(&self, symbol: &str) -> bool {
        self.rules
            .get(symbol)
            .and_then(|rule| rule.enable_trading)
            .unwrap_or(false)
    }
}

/// Whether `value` sits on a multiple of `increment`, within
/// [`INCREMENT_TOLERANCE`] on either side of the boundary.
fn aligned(value: Decimal, increment: Decimal) -> bool {
    if increment <= Decimal::ZERO {
        return true;
    }
    let remainder = (value % increment).abs();
    remainder <= INCREMENT_TOLERANCE || increment - remainder <= INCREMENT_TOLERANCE
}

/// Round to the nearest multiple of the increment (half to even) and
/// render with the increment's own decimal-place count.
fn format_to_increment(value: Decimal, increment: Option<Decimal>) -> String {
    match increment {
        Some(increment) if increment > Decimal::ZERO => {
            let mut rounded = (value / increment).round() * increment;
            rounded.rescale(increment.scale());
            rounded.to_string()
        }
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn sample_rule() -> SymbolPrecisionRule {
        SymbolPrecisionRule {
            base_min_size: Some(dec!(0.01)),
            base_max_size: Some(dec!(10000)),
            base_increment: Some(dec!(0.001)),
            quote_min_size: Some(dec!(0.1)),
            price_increment: Some(dec!(0.0001)),
            enable_trading: Some(true),
        }
    }

    fn sample_table() -> PrecisionTable {
        let mut rules = HashMap::new();
        rules.insert("ASTER-USDT".to_string(), sample_rule());
        PrecisionTable::from_rules(rules)
    }

    fn create_test_dir() -> std::path::PathBuf {
        let unique_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir().join(format!(
            "sigtrade_test_{}_{}_{}_precision",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
            unique_id
        ));
        fs::create_dir_all(&temp_dir).expect("Failed to create test temp dir");
        temp_dir
    }

    fn cleanup_test_dir(temp_dir: std::path::PathBuf) {
        fs::remove_dir_all(temp_dir).ok();
    }

    #[test]
    fn test_load_from_exchange_shaped_json() {
        let temp_dir = create_test_dir();
        let file_path = temp_dir.join("precision.json");
        fs::write(
            &file_path,
            r#"{
                "ASTER-USDT": {
                    "baseMinSize": "0.01",
                    "baseMaxSize": "10000",
                    "baseIncrement": "0.001",
                    "quoteMinSize": "0.1",
                    "priceIncrement": "0.0001",
                    "enableTrading": true
                },
                "BTC-USDT": {
                    "baseIncrement": "0.00001"
                }
            }"#,
        )
        .expect("Failed to write test fixture");

        let table = PrecisionTable::load(&file_path);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rule("ASTER-USDT"), Some(&sample_rule()));

        let partial = table.rule("BTC-USDT").expect("rule should be present");
        assert_eq!(partial.base_increment, Some(dec!(0.00001)));
        assert_eq!(partial.enable_trading, None);
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let temp_dir = create_test_dir();
        let table = PrecisionTable::load(temp_dir.join("does_not_exist.json"));
        assert!(table.is_empty());
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_malformed_json_degrades_to_empty() {
        let table = PrecisionTable::from_json_str("{ not json ]");
        assert!(table.is_empty());
    }

    #[test]
    fn test_validation_is_fail_open_without_a_rule() {
        let table = PrecisionTable::empty();
        assert!(table.validate_quantity("UNKNOWN-USDT", dec!(123.456)));
        assert!(table.validate_price("UNKNOWN-USDT", dec!(0.00001)));
    }

    #[test]
    fn test_enablement_is_fail_closed_without_a_rule() {
        let table = sample_table();
        assert!(table.is_symbol_supported("ASTER-USDT"));
        assert!(!table.is_symbol_supported("UNKNOWN-USDT"));

        // An explicit false and an absent flag both read as unsupported.
        let mut rules = HashMap::new();
        rules.insert(
            "HALTED-USDT".to_string(),
            SymbolPrecisionRule {
                enable_trading: Some(false),
                ..Default::default()
            },
        );
        rules.insert("BLANK-USDT".to_string(), SymbolPrecisionRule::default());
        let table = PrecisionTable::from_rules(rules);
        assert!(!table.is_symbol_supported("HALTED-USDT"));
        assert!(!table.is_symbol_supported("BLANK-USDT"));
    }

    #[test]
    fn test_quantity_bounds() {
        let table = sample_table();
        // Below baseMinSize 0.01
        assert!(!table.validate_quantity("ASTER-USDT", dec!(0.005)));
        // Above baseMaxSize 10000
        assert!(!table.validate_quantity("ASTER-USDT", dec!(10000.001)));
        // Within bounds and on the 0.001 increment
        assert!(table.validate_quantity("ASTER-USDT", dec!(50.123)));
    }

    #[test]
    fn test_increment_alignment_with_tolerance() {
        let table = sample_table();

        // Exactly on a 0.001 boundary
        assert!(table.validate_quantity("ASTER-USDT", dec!(0.123)));
        // Off the boundary by 0.0005, far beyond the tolerance
        assert!(!table.validate_quantity("ASTER-USDT", dec!(0.1235)));
        // Off by 1e-11 on either side, inside the 1e-10 tolerance
        assert!(table.validate_quantity("ASTER-USDT", dec!(0.12300000001)));
        assert!(table.validate_quantity("ASTER-USDT", dec!(0.12299999999)));
    }

    #[test]
    fn test_price_validation() {
        let table = sample_table();
        // Below quoteMinSize 0.1
        assert!(!table.validate_price("ASTER-USDT", dec!(0.05)));
        // On the 0.0001 price increment
        assert!(table.validate_price("ASTER-USDT", dec!(1.2345)));
        // Between increments
        assert!(!table.validate_price("ASTER-USDT", dec!(1.23456)));
    }

    #[test]
    fn test_format_rounds_to_increment_places() {
        let mut rules = HashMap::new();
        rules.insert(
            "BTC-USDT".to_string(),
            SymbolPrecisionRule {
                base_increment: Some(dec!(0.00001)),
                price_increment: Some(dec!(0.1)),
                ..Default::default()
            },
        );
        let table = PrecisionTable::from_rules(rules);

        // 0.123456789 / 0.00001 = 12345.6789 -> 12346 -> 0.12346
        assert_eq!(table.format_quantity("BTC-USDT", dec!(0.123456789)), "0.12346");
        // 123.456 / 0.1 = 1234.56 -> 1235 -> 123.5
        assert_eq!(table.format_price("BTC-USDT", dec!(123.456)), "123.5");
        // Already aligned values keep the increment's width
        assert_eq!(table.format_quantity("BTC-USDT", dec!(0.5)), "0.50000");
    }

    #[test]
    fn test_format_halfway_rounds_to_even() {
        let mut rules = HashMap::new();
        rules.insert(
            "ASTER-USDT".to_string(),
            SymbolPrecisionRule {
                base_increment: Some(dec!(0.001)),
                ..Default::default()
            },
        );
        let table = PrecisionTable::from_rules(rules);

        // 2.5 increments -> 2, 3.5 increments -> 4
        assert_eq!(table.format_quantity("ASTER-USDT", dec!(0.0025)), "0.002");
        assert_eq!(table.format_quantity("ASTER-USDT", dec!(0.0035)), "0.004");
    }

    #[test]
    fn test_format_without_rule_keeps_default_rendering() {
        let table = PrecisionTable::empty();
        assert_eq!(table.format_quantity("UNKNOWN-USDT", dec!(1.5)), "1.5");
        assert_eq!(table.format_price("UNKNOWN-USDT", dec!(0.123456789)), "0.123456789");
    }
}
