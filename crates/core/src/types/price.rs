//! Prices and totals using decimal arithmetic.
//!
//! The backend stores prices as plain JSON numbers in rupees. Some rows carry
//! the price as a string or omit it; both are accepted, a missing price
//! counting as zero.

use std::iter::Sum;
use std::ops::{Add, Mul};
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Quantity;

/// An amount in rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display, e.g. `Rs 499` or `Rs 12.5`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("Rs {}", self.0.normalize())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<Quantity> for Price {
    type Output = Self;

    fn mul(self, rhs: Quantity) -> Self {
        Self(self.0 * Decimal::from(rhs.get()))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.normalize().to_i64() {
            Some(whole) if self.0.fract().is_zero() => serializer.serialize_i64(whole),
            _ => serializer.serialize_f64(self.0.to_f64().unwrap_or_default()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = match Option::<RawPrice>::deserialize(deserializer)? {
            None => Decimal::ZERO,
            Some(RawPrice::Int(i)) => Decimal::from(i),
            Some(RawPrice::Float(f)) => Decimal::from_f64(f)
                .ok_or_else(|| serde::de::Error::custom(format!("price out of range: {f}")))?,
            Some(RawPrice::Text(s)) if s.trim().is_empty() => Decimal::ZERO,
            Some(RawPrice::Text(s)) => Decimal::from_str(s.trim())
                .map_err(|e| serde::de::Error::custom(format!("invalid price {s:?}: {e}")))?,
        };
        Ok(Self(amount))
    }
}
