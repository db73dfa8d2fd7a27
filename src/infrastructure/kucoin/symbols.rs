//! Conversion between bot-format symbols and KuCoin-native formats.
//!
//! The bot names every USDT-quoted market as one flat string, e.g.
//! `ASTERUSDT`. KuCoin spot lists the same market as `ASTER-USDT` and
//! KuCoin futures as `ASTERUSDTM`. These transforms are pure string
//! work; matching against a live symbol list is membership lookup with
//! graduated fallbacks. "No match" is a normal negative result, never
//! an error.

use crate::domain::trading::types::MarketSegment;
use std::fmt;
use tracing::debug;

const QUOTE_CURRENCY: &str = "USDT";
const FUTURES_SUFFIX: &str = "USDTM";

/// Convert a bot-format symbol to KuCoin spot format.
///
/// # Arguments
/// * `bot_symbol` - Flat bot symbol such as `ASTERUSDT`
///
/// # Returns
/// The dashed spot symbol such as `ASTER-USDT`. Symbols that already
/// contain a dash, and empty input, pass through unchanged.
///
/// # Example
/// ```
/// use sigtrade::infrastructure::kucoin::symbols::to_spot_format;
///
/// assert_eq!(to_spot_format("ASTERUSDT"), "ASTER-USDT");
/// assert_eq!(to_spot_format("ASTER-USDT"), "ASTER-USDT");
/// assert_eq!(to_spot_format("BTC"), "BTC-USDT");
/// ```
pub fn to_spot_format(bot_symbol: &str) -> String {
    // Dashed input is already spot-shaped; checking it first keeps the
    // transform idempotent even though such input also ends in USDT.
    if bot_symbol.is_empty() || bot_symbol.contains('-') {
        return bot_symbol.to_string();
    }
    match bot_symbol.strip_suffix(QUOTE_CURRENCY) {
        Some(base) => format!("{base}-{QUOTE_CURRENCY}"),
        None => format!("{bot_symbol}-{QUOTE_CURRENCY}"),
    }
}

/// Convert a bot-format symbol to KuCoin futures format.
///
/// # Arguments
/// * `bot_symbol` - Flat bot symbol such as `ASTERUSDT`
///
/// # Returns
/// The M-suffixed futures symbol such as `ASTERUSDTM`. Input already in
/// futures format, and empty input, pass through unchanged; dashed spot
/// input is flattened first.
///
/// # Example
/// ```
/// use sigtrade::infrastructure::kucoin::symbols::to_futures_format;
///
/// assert_eq!(to_futures_format("ASTERUSDT"), "ASTERUSDTM");
/// assert_eq!(to_futures_format("ASTERUSDTM"), "ASTERUSDTM");
/// assert_eq!(to_futures_format("ASTER-USDT"), "ASTERUSDTM");
/// assert_eq!(to_futures_format("BTC"), "BTCUSDTM");
/// ```
pub fn to_futures_format(bot_symbol: &str) -> String {
    if bot_symbol.is_empty() {
        return bot_symbol.to_string();
    }
    if bot_symbol.contains('-') {
        return format!("{}M", bot_symbol.replace('-', ""));
    }
    if bot_symbol.ends_with(FUTURES_SUFFIX) {
        return bot_symbol.to_string();
    }
    if bot_symbol.ends_with(QUOTE_CURRENCY) {
        return format!("{bot_symbol}M");
    }
    format!("{bot_symbol}{FUTURES_SUFFIX}")
}

/// Convert any KuCoin-native symbol back to bot format.
///
/// # Example
/// ```
/// use sigtrade::infrastructure::kucoin::symbols::from_exchange_format;
///
/// assert_eq!(from_exchange_format("ASTER-USDT"), "ASTERUSDT");
/// assert_eq!(from_exchange_format("ASTERUSDTM"), "ASTERUSDT");
/// assert_eq!(from_exchange_format("ASTERUSDT"), "ASTERUSDT");
/// ```
pub fn from_exchange_format(exchange_symbol: &str) -> String {
    let flat = exchange_symbol.replace('-', "");
    match flat.strip_suffix(FUTURES_SUFFIX) {
        Some(base) => format!("{base}{QUOTE_CURRENCY}"),
        None => flat,
    }
}

/// Ordered, de-duplicated candidate spellings for one bot symbol:
/// spot format, futures format, then the raw input.
pub fn variants(bot_symbol: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(3);
    for candidate in [
        to_spot_format(bot_symbol),
        to_futures_format(bot_symbol),
        bot_symbol.to_string(),
    ] {
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

/// Locate the listing for a bot symbol in a live exchange symbol list.
///
/// Tries the segment's target format verbatim, then every variant
/// spelling, then a case-insensitive pass that preserves the list's
/// original casing. `None` means the exchange does not list the symbol.
pub fn find_match(
    bot_symbol: &str,
    available_symbols: &[String],
    segment: MarketSegment,
) -> Option<String> {
    let target = match segment {
        MarketSegment::Spot => to_spot_format(bot_symbol),
        MarketSegment::Futures => to_futures_format(bot_symbol),
    };
    if available_symbols.iter().any(|symbol| *symbol == target) {
        return Some(target);
    }

    for variant in variants(bot_symbol) {
        if available_symbols.iter().any(|symbol| *symbol == variant) {
            debug!(bot_symbol, matched = %variant, "symbol matched through variant spelling");
            return Some(variant);
        }
    }

    for variant in variants(bot_symbol) {
        if let Some(found) = available_symbols
            .iter()
            .find(|symbol| symbol.eq_ignore_ascii_case(&variant))
        {
            debug!(bot_symbol, matched = %found, "symbol matched case-insensitively");
            return Some(found.clone());
        }
    }

    None
}

/// Whether the exchange lists the bot symbol in the given segment.
pub fn is_supported(
    bot_symbol: &str,
    available_symbols: &[String],
    segment: MarketSegment,
) -> bool {
    find_match(bot_symbol, available_symbols, segment).is_some()
}

/// Aggregate view of one bot symbol across both KuCoin segments,
/// for logging and support diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMapping {
    pub bot_symbol: String,
    pub spot_format: String,
    pub futures_format: String,
    /// Listing actually found on spot, in the exchange's casing.
    pub spot_match: Option<String>,
    /// Listing actually found on futures, in the exchange's casing.
    pub futures_match: Option<String>,
}

impl SymbolMapping {
    pub fn is_tradable(&self) -> bool {
        self.spot_match.is_some() || self.futures_match.is_some()
    }
}

impl fmt::Display for SymbolMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: spot {} [{}], futures {} [{}]",
            self.bot_symbol,
            self.spot_format,
            self.spot_match.as_deref().unwrap_or("unlisted"),
            self.futures_format,
            self.futures_match.as_deref().unwrap_or("unlisted"),
        )
    }
}

/// Resolve one bot symbol against both segments' live listings.
pub fn symbol_info(
    bot_symbol: &str,
    spot_symbols: &[String],
    futures_symbols: &[String],
) -> SymbolMapping {
    SymbolMapping {
        bot_symbol: bot_symbol.to_string(),
        spot_format: to_spot_format(bot_symbol),
        futures_format: to_futures_format(bot_symbol),
        spot_match: find_match(bot_symbol, spot_symbols, MarketSegment::Spot),
        futures_match: find_match(bot_symbol, futures_symbols, MarketSegment::Futures),
    }
}
