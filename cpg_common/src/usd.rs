use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

pub const USD_CURRENCY_CODE: &str = "USD";

/// A US dollar amount, stored as an integer number of cents.
///
/// Provider APIs disagree on how prices are transmitted (PayPal wants a decimal string, MercadoPago
/// wants a JSON number), so conversions to both representations are provided here and nowhere else.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UsdAmount(i64);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a dollar amount: {0}")]
pub struct UsdConversionError(pub String);

impl UsdAmount {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// The amount as a fractional number of dollars. MercadoPago's `unit_price` field is a JSON
    /// number, so the f64 round trip is unavoidable there.
    pub fn to_dollars_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Display for UsdAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();
        write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

impl FromStr for UsdAmount {
    type Err = UsdConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (dollars, cents) = match s.split_once('.') {
            Some((d, c)) => (d, c),
            None => (s, "0"),
        };
        if cents.len() > 2 || cents.is_empty() {
            return Err(UsdConversionError(format!("invalid cents in '{s}'")));
        }
        let negative = dollars.starts_with('-');
        let dollars = dollars.parse::<i64>().map_err(|e| UsdConversionError(format!("'{s}': {e}")))?;
        let mut cents = cents.parse::<i64>().map_err(|e| UsdConversionError(format!("'{s}': {e}")))?;
        if cents < 0 {
            return Err(UsdConversionError(format!("invalid cents in '{s}'")));
        }
        if s.split_once('.').map(|(_, c)| c.len()) == Some(1) {
            cents *= 10;
        }
        let total = dollars.abs() * 100 + cents;
        Ok(Self(if negative { -total } else { total }))
    }
}

impl Add for UsdAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for UsdAmount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for UsdAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, v| acc + v)
    }
}
