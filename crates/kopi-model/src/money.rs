// SPDX-License-Identifier: Apache-2.0

use crate::ids::ParseError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::str::FromStr;

/// A non-negative amount of money with exactly two fractional digits.
///
/// Catalog prices, snapshot unit prices, and order totals are all `Price`
/// values; arithmetic stays in decimal so totals are exact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Parses a decimal string such as `"4.50"` or `"12"`.
    ///
    /// Rejects negative amounts and anything with more than two fractional
    /// digits; the result is canonicalized to scale 2.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty("price"));
        }
        if input.trim() != input {
            return Err(ParseError::Trimmed("price"));
        }
        let raw = Decimal::from_str(input)
            .map_err(|_| ParseError::InvalidFormat("price must be a decimal number"))?;
        Self::from_decimal(raw)
    }

    pub fn from_decimal(raw: Decimal) -> Result<Self, ParseError> {
        if raw.is_sign_negative() {
            return Err(ParseError::InvalidFormat("price must not be negative"));
        }
        if raw.scale() > 2 {
            return Err(ParseError::InvalidFormat(
                "price must have at most two fractional digits",
            ));
        }
        let mut canonical = raw;
        canonical.rescale(2);
        Ok(Self(canonical))
    }

    #[must_use]
    pub const fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Canonical storage form, e.g. `"4.50"`.
    #[must_use]
    pub fn canonical_string(self) -> String {
        let mut v = self.0;
        v.rescale(2);
        v.to_string()
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|p| p.0).sum())
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical_string())
    }
}
