use crate::domain::errors::ParseEnumError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Stop => write!(f, "STOP"),
            OrderType::StopLimit => write!(f, "STOP_LIMIT"),
        }
    }
}

impl FromStr for OrderType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MARKET" => Ok(OrderType::Market),
            "LIMIT" => Ok(OrderType::Limit),
            "STOP" => Ok(OrderType::Stop),
            "STOP_LIMIT" => Ok(OrderType::StopLimit),
            _ => Err(ParseEnumError::new("order type", s)),
        }
    }
}

/// Direction of a leveraged position.
///
/// `Both` is the one-way (non-hedged) account mode where an entry is not
/// tagged long or short; the entry-price policy treats it as the neutral
/// fallback branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionSide {
    Long,
    Short,
    Both,
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
            PositionSide::Both => write!(f, "BOTH"),
        }
    }
}

impl FromStr for PositionSide {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LONG" => Ok(PositionSide::Long),
            "SHORT" => Ok(PositionSide::Short),
            "BOTH" => Ok(PositionSide::Both),
            _ => Err(ParseEnumError::new("position side", s)),
        }
    }
}

/// Market segment a symbol trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketSegment {
    Spot,
    Futures,
}

impl fmt::Display for MarketSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketSegment::Spot => write!(f, "spot"),
            MarketSegment::Futures => write!(f, "futures"),
        }
    }
}

impl FromStr for MarketSegment {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spot" => Ok(MarketSegment::Spot),
            "futures" => Ok(MarketSegment::Futures),
            _ => Err(ParseEnumError::new("market segment", s)),
        }
    }
}

/// How the effective fee rate of a calculator was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeTier {
    /// Standard taker schedule rate.
    Taker,
    /// Standard maker schedule rate.
    Maker,
    /// Caller-supplied override rate.
    Custom,
    /// Flat cap applied regardless of maker/taker status.
    Fixed,
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeTier::Taker => write!(f, "taker"),
            FeeTier::Maker => write!(f, "maker"),
            FeeTier::Custom => write!(f, "custom"),
            FeeTier::Fixed => write!(f, "fixed"),
        }
    }
}
