//! Currency conversion types and arithmetic.

use chrono::{DateTime, Utc};
use cryptoconv_common::{ConversionId, Currency, MarketPair, Money};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Fixed scale of amounts produced by inverse conversion.
pub const INVERSE_SCALE: u32 = 8;

/// Largest scale a `Decimal` can carry.
const MAX_SCALE: u32 = 28;

/// Largest mantissa a `Decimal` can carry (96 bits).
const MAX_MANTISSA: u128 = (1 << 96) - 1;

/// Why a price could not be applied to an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyError {
    /// Inverse conversion against a zero price.
    ZeroPrice,
    /// The exact result does not fit in a `Decimal`.
    OutOfRange,
}

/// Which orientation of the market the rate was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateDirection {
    /// Market `from+to` exists: multiply by its price.
    Direct,
    /// Only market `to+from` exists: divide by its price.
    Inverse,
}

impl RateDirection {
    /// Apply a market price to an amount.
    ///
    /// Direct conversion is exact: the product is never rounded, and a
    /// product that needs more than 28 fractional digits or 96 bits of
    /// mantissa is [`ApplyError::OutOfRange`]. Inverse conversion is rounded
    /// half-up to [`INVERSE_SCALE`] places and always carries that scale.
    pub fn apply(&self, amount: Decimal, price: Decimal) -> Result<Decimal, ApplyError> {
        match self {
            RateDirection::Direct => exact_product(amount, price).ok_or(ApplyError::OutOfRange),
            RateDirection::Inverse => {
                if price.is_zero() {
                    return Err(ApplyError::ZeroPrice);
                }
                let mut value = amount
                    .checked_div(price)
                    .ok_or(ApplyError::OutOfRange)?
                    .round_dp_with_strategy(INVERSE_SCALE, RoundingStrategy::MidpointAwayFromZero);
                value.rescale(INVERSE_SCALE);
                Ok(value)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RateDirection::Direct => "direct",
            RateDirection::Inverse => "inverse",
        }
    }
}

/// Multiply two decimals without rounding.
///
/// The product keeps the summed scale of its operands. Trailing zeros are
/// dropped only when needed to fit, which leaves the value unchanged.
fn exact_product(amount: Decimal, price: Decimal) -> Option<Decimal> {
    let mut mantissa = amount.mantissa().checked_mul(price.mantissa())?;
    let mut scale = amount.scale() + price.scale();

    while (scale > MAX_SCALE || mantissa.unsigned_abs() > MAX_MANTISSA)
        && scale > 0
        && mantissa % 10 == 0
    {
        mantissa /= 10;
        scale -= 1;
    }

    Decimal::try_from_i128_with_scale(mantissa, scale).ok()
}

/// Represents a completed currency conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    /// Unique conversion ID.
    pub id: ConversionId,
    /// Amount as requested.
    pub input: Money,
    /// Converted amount.
    pub output: Money,
    /// Raw last price of the market that resolved.
    pub rate: Decimal,
    /// Orientation the rate was taken from.
    pub direction: RateDirection,
    /// Market that resolved.
    pub market: MarketPair,
    /// When the conversion was executed.
    pub executed_at: DateTime<Utc>,
}

impl Conversion {
    /// Create a new conversion record.
    pub fn new(
        input: Money,
        output: Money,
        rate: Decimal,
        direction: RateDirection,
        market: MarketPair,
    ) -> Self {
        Self {
            id: ConversionId::new(),
            input,
            output,
            rate,
            direction,
            market,
            executed_at: Utc::now(),
        }
    }

    /// Get the API result for this conversion.
    pub fn result(&self) -> ConversionResult {
        ConversionResult::from(self)
    }
}

/// Conversion result as returned to API callers.
///
/// `rate` is the upstream price of whichever market resolved. For an
/// inverse conversion it is NOT inverted, so it is quoted in source units
/// per target unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub source_amount: Decimal,
    pub source_currency: Currency,
    pub target_amount: Decimal,
    pub target_currency: Currency,
    pub rate: Decimal,
}

impl From<&Conversion> for ConversionResult {
    fn from(conversion: &Conversion) -> Self {
        Self {
            source_amount: conversion.input.value,
            source_currency: conversion.input.currency.clone(),
            target_amount: conversion.output.value,
            target_currency: conversion.output.currency.clone(),
            rate: conversion.rate,
        }
    }
}
