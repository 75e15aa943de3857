//! Fixed-point trade prices.

use serde::{Deserialize, Serialize};

/// A trade price in fixed-point representation.
///
/// Source files carry prices as integers scaled by [`Price::SCALE`]
/// (one raw unit is 1e-9 of the quoted price). The raw value is kept as-is
/// through normalization and aggregation so that open/high/low/close are
/// exact. [`Display`](std::fmt::Display) renders the decimal form without
/// going through floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Raw units per whole price unit.
    pub const SCALE: i64 = 1_000_000_000;

    /// Number of decimal places implied by [`Price::SCALE`].
    pub const DECIMALS: i8 = 9;

    /// Creates a price from its raw scaled integer value.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw scaled integer value.
    #[must_use]
    pub const fn raw(&self) -> i64 {
        self.0
    }

    /// Returns true if the price is strictly positive.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = Self::SCALE.unsigned_abs();
        let whole = abs / scale;
        let frac = abs % scale;
        if frac == 0 {
            return write!(f, "{sign}{whole}");
        }
        let digits = format!("{frac:09}");
        write!(f, "{sign}{whole}.{}", digits.trim_end_matches('0'))
    }
}
