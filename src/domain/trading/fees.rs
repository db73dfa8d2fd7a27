//! Fee and breakeven arithmetic for leveraged futures positions.
//!
//! Two interchangeable strategies share one contract: the formula-based
//! Binance schedule (maker/taker split, optional BNB discount, optional
//! negotiated override) and a flat cap charged regardless of execution
//! style. All money math runs in `Decimal`; results are rounded half-up
//! to eight fractional digits. Binary floating point never touches a
//! fee or a breakeven price.

use crate::domain::errors::FeeError;
use crate::domain::trading::types::FeeTier;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt::Debug;

/// Fractional digits kept on every monetary result.
const FEE_SCALE: u32 = 8;

/// Round a computed monetary value to the reporting scale, half-up.
fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(FEE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn validate_position_inputs(margin: Decimal, leverage: Decimal) -> Result<(), FeeError> {
    if margin <= Decimal::ZERO {
        return Err(FeeError::NonPositiveMargin { margin });
    }
    if leverage <= Decimal::ZERO {
        return Err(FeeError::NonPositiveLeverage { leverage });
    }
    Ok(())
}

/// Full cost picture for opening and closing one leveraged position.
///
/// Produced fresh on every call for record keeping and client-facing
/// summaries; a plain value with no identity, never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeBreakdown {
    pub margin: Decimal,
    pub leverage: Decimal,
    /// Position exposure: `margin * leverage`.
    pub notional_value: Decimal,
    pub effective_fee_rate: Decimal,
    pub fee_tier: FeeTier,
    /// `None` when the strategy has no BNB discount concept (flat cap).
    pub bnb_discount_applied: Option<bool>,
    pub single_trade_fee: Decimal,
    /// Entry fill plus exit fill.
    pub total_fees: Decimal,
    pub breakeven_price: Decimal,
    pub breakeven_multiplier: Decimal,
    /// Round-trip fees as a percentage of committed margin.
    pub fee_pct_of_margin: Decimal,
}

/// Shared contract for the interchangeable fee strategies.
///
/// Implementations only choose the effective rate and its labeling; the
/// arithmetic lives in the provided methods so both strategies are
/// guaranteed to price identically whenever their rates coincide.
///
/// Inputs are validated before any arithmetic: non-positive margin,
/// leverage or entry price is a hard [`FeeError`], and callers must drop
/// the order rather than retry with adjusted numbers.
///
/// # Example
/// ```
/// use rust_decimal_macros::dec;
/// use sigtrade::domain::trading::fees::{BinanceFuturesFeeCalculator, FeeCalculator};
///
/// let calculator = BinanceFuturesFeeCalculator::taker();
/// // $1,000 margin at 10x exposes $10,000; one fill at 0.05% costs $5.
/// let fee = calculator.trading_fee(dec!(1000), dec!(10)).unwrap();
/// assert_eq!(fee, dec!(5));
/// ```
pub trait FeeCalculator: Debug + Send + Sync {
    /// Rate applied to notional value on a single fill.
    fn effective_fee_rate(&self) -> Decimal;

    /// Label describing how the effective rate was selected.
    fn fee_tier(&self) -> FeeTier;

    /// Whether the BNB balance discount is active; `None` when the
    /// concept does not apply to this strategy.
    fn bnb_discount(&self) -> Option<bool>;

    /// Fee for one fill: `margin * leverage * effective_fee_rate`.
    fn trading_fee(&self, margin: Decimal, leverage: Decimal) -> Result<Decimal, FeeError> {
        validate_position_inputs(margin, leverage)?;
        Ok(round_money(margin * leverage * self.effective_fee_rate()))
    }

    /// Cost of the full round trip: entry fill plus exit fill.
    fn round_trip_fees(&self, margin: Decimal, leverage: Decimal) -> Result<Decimal, FeeError> {
        let single = self.trading_fee(margin, leverage)?;
        Ok(round_money(single * dec!(2)))
    }

    /// Multiplier that turns an entry price into its breakeven price:
    /// `1 + 2 * effective_fee_rate`.
    fn breakeven_multiplier(&self) -> Decimal {
        Decimal::ONE + dec!(2) * self.effective_fee_rate()
    }

    /// Price at which the round-trip fees are exactly recovered.
    fn breakeven_price(&self, entry_price: Decimal) -> Result<Decimal, FeeError> {
        if entry_price <= Decimal::ZERO {
            return Err(FeeError::NonPositiveEntryPrice { price: entry_price });
        }
        Ok(round_money(entry_price * self.breakeven_multiplier()))
    }

    /// Breakeven for a position assembled from several fills.
    ///
    /// Each `(price, quantity)` pair must be strictly positive. The
    /// quantity-weighted average entry is run through the standard
    /// breakeven formula.
    fn weighted_breakeven_price(
        &self,
        entries: &[(Decimal, Decimal)],
    ) -> Result<Decimal, FeeError> {
        if entries.is_empty() {
            return Err(FeeError::EmptyWeightedEntries);
        }
        let mut notional = Decimal::ZERO;
        let mut total_quantity = Decimal::ZERO;
        for &(price, quantity) in entries {
            if price <= Decimal::ZERO || quantity <= Decimal::ZERO {
                return Err(FeeError::InvalidWeightedEntry { price, quantity });
            }
            notional += price * quantity;
            total_quantity += quantity;
        }
        self.breakeven_price(notional / total_quantity)
    }

    /// Bundle every figure a trade record or client summary needs.
    fn fee_breakdown(
        &self,
        margin: Decimal,
        leverage: Decimal,
        entry_price: Decimal,
    ) -> Result<FeeBreakdown, FeeError> {
        let single_trade_fee = self.trading_fee(margin, leverage)?;
        let total_fees = self.round_trip_fees(margin, leverage)?;
        let breakeven_price = self.breakeven_price(entry_price)?;
        Ok(FeeBreakdown {
            margin,
            leverage,
            notional_value: margin * leverage,
            effective_fee_rate: self.effective_fee_rate(),
            fee_tier: self.fee_tier(),
            bnb_discount_applied: self.bnb_discount(),
            single_trade_fee,
            total_fees,
            breakeven_price,
            breakeven_multiplier: self.breakeven_multiplier(),
            fee_pct_of_margin: round_money(total_fees / margin * dec!(100)),
        })
    }
}

/// Formula-based Binance USDT-margined futures fees.
///
/// Taker by default, maker when configured, with an optional 10%
/// discount for paying fees from a BNB balance and an optional flat
/// override for accounts on negotiated rates.
#[derive(Debug, Clone, PartialEq)]
pub struct BinanceFuturesFeeCalculator {
    rate: Decimal,
    tier: FeeTier,
    use_bnb: bool,
}

impl BinanceFuturesFeeCalculator {
    /// Standard USDT-margined taker rate (0.05%).
    pub const TAKER_RATE: Decimal = dec!(0.0005);
    /// Standard USDT-margined maker rate (0.02%).
    pub const MAKER_RATE: Decimal = dec!(0.0002);
    /// Multiplier applied when fees are paid from a BNB balance.
    pub const BNB_DISCOUNT_MULTIPLIER: Decimal = dec!(0.9);

    /// Taker-rate calculator; what market orders from signals pay.
    pub fn taker() -> Self {
        Self {
            rate: Self::TAKER_RATE,
            tier: FeeTier::Taker,
            use_bnb: false,
        }
    }

    /// Maker-rate calculator for resting limit entries.
    pub fn maker() -> Self {
        Self {
            rate: Self::MAKER_RATE,
            tier: FeeTier::Maker,
            use_bnb: false,
        }
    }

    /// Calculator with a negotiated flat rate instead of the schedule.
    pub fn with_rate(rate: Decimal) -> Self {
        Self {
            rate,
            tier: FeeTier::Custom,
            use_bnb: false,
        }
    }

    /// Toggle the BNB-balance discount on top of the configured rate.
    pub fn with_bnb_discount(mut self, enabled: bool) -> Self {
        self.use_bnb = enabled;
        self
    }
}

impl Default for BinanceFuturesFeeCalculator {
    fn default() -> Self {
        Self::taker()
    }
}

impl FeeCalculator for BinanceFuturesFeeCalculator {
    fn effective_fee_rate(&self) -> Decimal {
        if self.use_bnb {
            self.rate * Self::BNB_DISCOUNT_MULTIPLIER
        } else {
            self.rate
        }
    }

    fn fee_tier(&self) -> FeeTier {
        self.tier
    }

    fn bnb_discount(&self) -> Option<bool> {
        Some(self.use_bnb)
    }
}

/// Flat-cap fees: one configured rate regardless of execution style.
///
/// Used when the client agreement charges a fixed rate rather than the
/// exchange's maker/taker split. The BNB discount concept does not
/// apply and is reported as inapplicable in [`FeeBreakdown`].
#[derive(Debug, Clone, PartialEq)]
pub struct FixedFeeCalculator {
    rate: Decimal,
}

impl FixedFeeCalculator {
    /// Cap matching the Binance futures taker rate.
    pub const BINANCE_CAP: Decimal = dec!(0.0005);
    /// Cap matching the KuCoin futures taker rate.
    pub const KUCOIN_CAP: Decimal = dec!(0.0006);

    pub fn new(rate: Decimal) -> Self {
        Self { rate }
    }
}

impl Default for FixedFeeCalculator {
    fn default() -> Self {
        Self::new(Self::BINANCE_CAP)
    }
}

impl FeeCalculator for FixedFeeCalculator {
    fn effective_fee_rate(&self) -> Decimal {
        self.rate
    }

    fn fee_tier(&self) -> FeeTier {
        FeeTier::Fixed
    }

    fn bnb_discount(&self) -> Option<bool> {
        None
    }
}
