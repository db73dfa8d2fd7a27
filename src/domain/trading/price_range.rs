//! Entry-price resolution for signals carrying zero or more candidate prices.
//!
//! A signal may name no price, a single price, a two-level range, or a
//! ladder of levels. Combined with the order type and position side this
//! resolves to either a concrete execution/limit price or a rejection.
//! Rejection is a normal outcome, not an error: callers must read a
//! `None` price as "do not place this order".

use crate::domain::trading::types::{OrderType, PositionSide};
use rust_decimal::Decimal;
use serde::Serialize;

/// Outcome of resolving a signal's candidate prices against the market.
///
/// `price` is `None` exactly when the order was rejected. `reason` is
/// always populated and feeds the audit log, so every branch records
/// where the current price sat relative to the supplied bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceDecision {
    pub price: Option<Decimal>,
    pub reason: String,
}

impl PriceDecision {
    pub fn execute(price: Decimal, reason: impl Into<String>) -> Self {
        Self {
            price: Some(price),
            reason: reason.into(),
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            price: None,
            reason: reason.into(),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.price.is_none()
    }
}

/// Describe where the current price sits relative to a price range.
fn placement(current_price: Decimal, lower: Decimal, upper: Decimal) -> String {
    if current_price > upper {
        format!("current price {current_price} is above range [{lower}, {upper}]")
    } else if current_price < lower {
        format!("current price {current_price} is below range [{lower}, {upper}]")
    } else {
        format!("current price {current_price} is within range [{lower}, {upper}]")
    }
}

/// Decide the effective order price for a signal.
///
/// With no supplied prices the current market price is used. A single
/// price is taken verbatim. A two-level range gates market orders (a
/// long must not chase above the upper bound, a short must not chase
/// below the lower bound) and pins limit orders to the favorable bound.
/// Ladders of three or more levels never gate market orders; laddered
/// limit longs take the lowest level and laddered limit shorts the
/// highest.
///
/// # Arguments
/// * `entry_prices` - Candidate entry prices from the signal, in the
///   order they were supplied
/// * `order_type` - How the order will execute
/// * `position` - Direction of the position being opened
/// * `current_price` - Latest market price for the symbol
///
/// # Returns
/// A [`PriceDecision`]; `price` is `None` only when a two-level market
/// order fell outside its range.
///
/// # Example
/// ```
/// use rust_decimal_macros::dec;
/// use sigtrade::domain::trading::price_range::resolve_entry_price;
/// use sigtrade::domain::trading::types::{OrderType, PositionSide};
///
/// let decision = resolve_entry_price(
///     &[dec!(90), dec!(110)],
///     OrderType::Limit,
///     PositionSide::Long,
///     dec!(100),
/// );
/// assert_eq!(decision.price, Some(dec!(110)));
/// ```
pub fn resolve_entry_price(
    entry_prices: &[Decimal],
    order_type: OrderType,
    position: PositionSide,
    current_price: Decimal,
) -> PriceDecision {
    match entry_prices {
        &[] => PriceDecision::execute(
            current_price,
            format!("no entry prices supplied, using current price {current_price}"),
        ),
        &[single] => {
            let relation = if current_price > single {
                "above"
            } else if current_price < single {
                "below"
            } else {
                "at"
            };
            PriceDecision::execute(
                single,
                format!(
                    "using single entry price {single}; current price {current_price} is {relation} the entry price"
                ),
            )
        }
        &[a, b] => resolve_range(a, b, order_type, position, current_price),
        &[first, ..] => resolve_ladder(entry_prices, first, order_type, position, current_price),
    }
}

/// Two-level range: the only shape that can reject a market order.
fn resolve_range(
    a: Decimal,
    b: Decimal,
    order_type: OrderType,
    position: PositionSide,
    current_price: Decimal,
) -> PriceDecision {
    let lower = a.min(b);
    let upper = a.max(b);
    let context = placement(current_price, lower, upper);

    match (order_type, position) {
        (OrderType::Market, PositionSide::Long) => {
            if current_price <= upper {
                PriceDecision::execute(
                    current_price,
                    format!("market long within buy ceiling {upper}; {context}"),
                )
            } else {
                PriceDecision::reject(format!(
                    "market long skipped, would chase past buy ceiling {upper}; {context}"
                ))
            }
        }
        (OrderType::Market, PositionSide::Short) => {
            if current_price >= lower {
                PriceDecision::execute(
                    current_price,
                    format!("market short within sell floor {lower}; {context}"),
                )
            } else {
                PriceDecision::reject(format!(
                    "market short skipped, would chase past sell floor {lower}; {context}"
                ))
            }
        }
        (OrderType::Market, PositionSide::Both) => PriceDecision::execute(
            current_price,
            format!("market order without direction, using current price; {context}"),
        ),
        (OrderType::Limit, PositionSide::Long) => PriceDecision::execute(
            upper,
            format!("limit long at range upper bound {upper}; {context}"),
        ),
        (OrderType::Limit, PositionSide::Short) => PriceDecision::execute(
            lower,
            format!("limit short at range lower bound {lower}; {context}"),
        ),
        (OrderType::Limit, PositionSide::Both) => PriceDecision::execute(
            lower,
            format!(
                "limit order without direction, falling back to range lower bound {lower}; {context}"
            ),
        ),
        (OrderType::Stop | OrderType::StopLimit, _) => PriceDecision::execute(
            a,
            format!("{order_type} order, using first supplied price {a}; {context}"),
        ),
    }
}

/// Ladder of three or more levels.
fn resolve_ladder(
    entry_prices: &[Decimal],
    first: Decimal,
    order_type: OrderType,
    position: PositionSide,
    current_price: Decimal,
) -> PriceDecision {
    let lower = entry_prices.iter().copied().fold(first, Decimal::min);
    let upper = entry_prices.iter().copied().fold(first, Decimal::max);
    let levels = entry_prices.len();
    let context = placement(current_price, lower, upper);

    match (order_type, position) {
        (OrderType::Market, _) => {
            // TODO: confirm whether laddered market entries should honor the
            // range gate the way two-level ranges do; callers currently rely
            // on this branch never rejecting.
            PriceDecision::execute(
                current_price,
                format!(
                    "laddered market entry across {levels} levels, using current price; {context}"
                ),
            )
        }
        (OrderType::Limit, PositionSide::Long) => PriceDecision::execute(
            lower,
            format!("laddered limit long at lowest level {lower} of {levels}; {context}"),
        ),
        (OrderType::Limit, PositionSide::Short) => PriceDecision::execute(
            upper,
            format!("laddered limit short at highest level {upper} of {levels}; {context}"),
        ),
        (OrderType::Limit, PositionSide::Both) => PriceDecision::execute(
            first,
            format!(
                "laddered limit without direction, using first supplied level {first}; {context}"
            ),
        ),
        (OrderType::Stop | OrderType::StopLimit, _) => PriceDecision::execute(
            first,
            format!("{order_type} order, using first supplied level {first}; {context}"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_no_prices_uses_current() {
        let decision = resolve_entry_price(&[], OrderType::Market, PositionSide::Long, dec!(100));
        assert_eq!(decision.price, Some(dec!(100)));
        assert!(decision.reason.contains("no entry prices"));
    }

    #[test]
    fn test_single_price_used_verbatim() {
        // Even market orders take the signal price when exactly one is given.
        let decision = resolve_entry_price(
            &[dec!(95.5)],
            OrderType::Market,
            PositionSide::Long,
            dec!(100),
        );
        assert_eq!(decision.price, Some(dec!(95.5)));
        assert!(decision.reason.contains("above"));

        let decision = resolve_entry_price(
            &[dec!(95.5)],
            OrderType::Limit,
            PositionSide::Short,
            dec!(90),
        );
        assert_eq!(decision.price, Some(dec!(95.5)));
        assert!(decision.reason.contains("below"));
    }

    #[test]
    fn test_market_long_within_range_executes() {
        let decision = resolve_entry_price(
            &[dec!(90), dec!(110)],
            OrderType::Market,
            PositionSide::Long,
            dec!(100),
        );
        assert_eq!(decision.price, Some(dec!(100)));
        assert!(!decision.is_rejected());
        assert!(decision.reason.contains("within range"));
    }

    #[test]
    fn test_market_long_above_range_rejects() {
        let decision = resolve_entry_price(
            &[dec!(90), dec!(110)],
            OrderType::Market,
            PositionSide::Long,
            dec!(120),
        );
        assert_eq!(decision.price, None);
        assert!(decision.is_rejected());
        assert!(decision.reason.contains("above range"));
    }

    #[test]
    fn test_market_long_at_upper_bound_executes() {
        // Boundary is inclusive: current == upper still executes.
        let decision = resolve_entry_price(
            &[dec!(90), dec!(110)],
            OrderType::Market,
            PositionSide::Long,
            dec!(110),
        );
        assert_eq!(decision.price, Some(dec!(110)));
    }

    #[test]
    fn test_market_long_below_range_executes() {
        // A long entering below the range is a bargain, never gated.
        let decision = resolve_entry_price(
            &[dec!(90), dec!(110)],
            OrderType::Market,
            PositionSide::Long,
            dec!(80),
        );
        assert_eq!(decision.price, Some(dec!(80)));
        assert!(decision.reason.contains("below range"));
    }

    #[test]
    fn test_market_short_below_range_rejects() {
        let decision = resolve_entry_price(
            &[dec!(90), dec!(110)],
            OrderType::Market,
            PositionSide::Short,
            dec!(80),
        );
        assert_eq!(decision.price, None);
        assert!(decision.reason.contains("below range"));
    }

    #[test]
    fn test_market_short_at_lower_bound_executes() {
        let decision = resolve_entry_price(
            &[dec!(90), dec!(110)],
            OrderType::Market,
            PositionSide::Short,
            dec!(90),
        );
        assert_eq!(decision.price, Some(dec!(90)));
    }

    #[test]
    fn test_market_without_direction_never_rejects() {
        let decision = resolve_entry_price(
            &[dec!(90), dec!(110)],
            OrderType::Market,
            PositionSide::Both,
            dec!(500),
        );
        assert_eq!(decision.price, Some(dec!(500)));
        assert!(decision.reason.contains("above range"));
    }

    #[test]
    fn test_limit_orders_pin_to_favorable_bound() {
        // Long buys up to the ceiling, short sells down to the floor.
        let long = resolve_entry_price(
            &[dec!(90), dec!(110)],
            OrderType::Limit,
            PositionSide::Long,
            dec!(100),
        );
        assert_eq!(long.price, Some(dec!(110)));

        let short = resolve_entry_price(
            &[dec!(90), dec!(110)],
            OrderType::Limit,
            PositionSide::Short,
            dec!(100),
        );
        assert_eq!(short.price, Some(dec!(90)));
    }

    #[test]
    fn test_limit_without_direction_falls_back_to_lower() {
        let decision = resolve_entry_price(
            &[dec!(110), dec!(90)],
            OrderType::Limit,
            PositionSide::Both,
            dec!(100),
        );
        assert_eq!(decision.price, Some(dec!(90)));
    }

    #[test]
    fn test_range_bounds_ignore_supplied_order() {
        // Reversed input still yields the same bounds.
        let decision = resolve_entry_price(
            &[dec!(110), dec!(90)],
            OrderType::Limit,
            PositionSide::Long,
            dec!(100),
        );
        assert_eq!(decision.price, Some(dec!(110)));
    }

    #[test]
    fn test_stop_orders_take_first_supplied_price() {
        let decision = resolve_entry_price(
            &[dec!(110), dec!(90)],
            OrderType::Stop,
            PositionSide::Long,
            dec!(100),
        );
        assert_eq!(decision.price, Some(dec!(110)));

        let decision = resolve_entry_price(
            &[dec!(110), dec!(90)],
            OrderType::StopLimit,
            PositionSide::Short,
            dec!(100),
        );
        assert_eq!(decision.price, Some(dec!(110)));
    }

    #[test]
    fn test_laddered_market_never_rejects() {
        // Current price far above every level still executes.
        let decision = resolve_entry_price(
            &[dec!(90), dec!(100), dec!(110)],
            OrderType::Market,
            PositionSide::Long,
            dec!(500),
        );
        assert_eq!(decision.price, Some(dec!(500)));
        assert!(decision.reason.contains("above range"));
    }

    #[test]
    fn test_laddered_limit_long_takes_lowest_level() {
        let decision = resolve_entry_price(
            &[dec!(100), dec!(95), dec!(90)],
            OrderType::Limit,
            PositionSide::Long,
            dec!(98),
        );
        assert_eq!(decision.price, Some(dec!(90)));
    }

    #[test]
    fn test_laddered_limit_short_takes_highest_level() {
        let decision = resolve_entry_price(
            &[dec!(100), dec!(95), dec!(110)],
            OrderType::Limit,
            PositionSide::Short,
            dec!(98),
        );
        assert_eq!(decision.price, Some(dec!(110)));
    }

    #[test]
    fn test_laddered_limit_without_direction_takes_first() {
        let decision = resolve_entry_price(
            &[dec!(100), dec!(95), dec!(110)],
            OrderType::Limit,
            PositionSide::Both,
            dec!(98),
        );
        assert_eq!(decision.price, Some(dec!(100)));
    }

    #[test]
    fn test_laddered_stop_takes_first() {
        let decision = resolve_entry_price(
            &[dec!(100), dec!(95), dec!(110)],
            OrderType::StopLimit,
            PositionSide::Long,
            dec!(98),
        );
        assert_eq!(decision.price, Some(dec!(100)));
    }

    #[test]
    fn test_every_branch_reports_placement() {
        let shapes: [&[Decimal]; 3] = [
            &[dec!(90), dec!(110)],
            &[dec!(90), dec!(100), dec!(110)],
            &[dec!(95)],
        ];
        for prices in shapes {
            for order_type in [OrderType::Market, OrderType::Limit, OrderType::Stop] {
                for position in [PositionSide::Long, PositionSide::Short, PositionSide::Both] {
                    let decision = resolve_entry_price(prices, order_type, position, dec!(120));
                    assert!(
                        decision.reason.contains("above"),
                        "missing placement for {order_type}/{position} on {prices:?}: {}",
                        decision.reason
                    );
                }
            }
        }
    }
}
