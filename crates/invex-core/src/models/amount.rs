//! Numeric values carried by the record (amounts and quantities).

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// A finite number.
///
/// Values inside the decimal range are kept exact. Finite values outside it
/// (beyond about ±7.9e28, or with more than 28 fractional digits) are carried
/// as `f64` rather than being clamped, so they survive a trip through the
/// wire format unchanged.
///
/// Serialized as a bare JSON number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amount(Repr);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Repr {
    Exact(Decimal),
    Float(f64),
}

impl Amount {
    pub const ZERO: Amount = Amount(Repr::Exact(Decimal::ZERO));
    pub const ONE: Amount = Amount(Repr::Exact(Decimal::ONE));

    /// Convert a float, preferring the exact form of its shortest decimal
    /// text. Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        let number = serde_json::Number::from_f64(value)?;
        Some(Self::from_json_number(&number).unwrap_or(Amount(Repr::Float(value))))
    }

    /// Convert a JSON number. Only fails for values `serde_json` cannot
    /// represent as a finite `f64`.
    pub fn from_json_number(number: &serde_json::Number) -> Option<Self> {
        if let Some(i) = number.as_i64() {
            return Some(Decimal::from(i).into());
        }
        if let Some(u) = number.as_u64() {
            return Some(Decimal::from(u).into());
        }

        let text = number.to_string();
        match Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) {
            Ok(d) => Some(d.into()),
            Err(_) => number
                .as_f64()
                .filter(|f| f.is_finite())
                .map(|f| Amount(Repr::Float(f))),
        }
    }

    /// The exact decimal, when the value fits one.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self.0 {
            Repr::Exact(d) => Some(d),
            Repr::Float(_) => None,
        }
    }

    /// Nearest `f64`. Parsing the decimal text picks the closest float, so
    /// `1.60` becomes `1.6`.
    pub fn to_f64(&self) -> f64 {
        match self.0 {
            Repr::Exact(d) => d.to_string().parse().unwrap_or(0.0),
            Repr::Float(f) => f,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self.0 {
            Repr::Exact(d) => d.is_zero(),
            Repr::Float(f) => f == 0.0,
        }
    }

    /// Sum, or `None` if the result is not finite.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.combine(other, Decimal::checked_add, |a, b| a + b)
    }

    /// Product, or `None` if the result is not finite.
    pub fn checked_mul(self, other: Amount) -> Option<Amount> {
        self.combine(other, Decimal::checked_mul, |a, b| a * b)
    }

    /// Whether the two values differ by more than one cent.
    pub fn differs_from(&self, other: &Amount) -> bool {
        match (self.0, other.0) {
            (Repr::Exact(a), Repr::Exact(b)) => a
                .checked_sub(b)
                .map(|diff| diff.abs() > Decimal::new(1, 2))
                .unwrap_or(true),
            _ => (self.to_f64() - other.to_f64()).abs() > 0.01,
        }
    }

    fn combine(
        self,
        other: Amount,
        exact: fn(Decimal, Decimal) -> Option<Decimal>,
        float: fn(f64, f64) -> f64,
    ) -> Option<Amount> {
        if let (Repr::Exact(a), Repr::Exact(b)) = (self.0, other.0) {
            if let Some(d) = exact(a, b) {
                return Some(d.into());
            }
        }
        Amount::from_f64(float(self.to_f64(), other.to_f64()))
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::ZERO
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(Repr::Exact(value))
    }
}

impl PartialEq<Decimal> for Amount {
    fn eq(&self, other: &Decimal) -> bool {
        self.as_decimal().as_ref() == Some(other)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Repr::Exact(d) => write!(f, "{}", d),
            Repr::Float(v) => write!(f, "{:e}", v),
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.to_f64())
    }
}
