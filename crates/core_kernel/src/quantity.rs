//! Weight quantities in kilograms
//!
//! Weights follow the same rules as [`Money`](crate::Money): non-negative,
//! fixed-point, 4 decimal places, banker's rounding, checked arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::{round_bankers, MoneyError, INTERNAL_SCALE};

/// A non-negative weight in kilograms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weight(Decimal);

impl Weight {
    /// Zero kilograms
    pub const ZERO: Weight = Weight(Decimal::ZERO);

    /// Creates a weight, rejecting negative values
    pub fn from_kg(kg: Decimal) -> Result<Self, MoneyError> {
        if kg.is_sign_negative() && !kg.is_zero() {
            return Err(MoneyError::Negative(kg));
        }
        Ok(Self(round_bankers(kg, INTERNAL_SCALE)))
    }

    /// Returns the weight in kilograms
    pub fn kg(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition
    pub fn checked_add(&self, other: Weight) -> Result<Weight, MoneyError> {
        let sum = self.0.checked_add(other.0).ok_or(MoneyError::Overflow)?;
        Weight::from_kg(sum)
    }

    /// Checked subtraction that refuses to go below zero
    pub fn checked_sub(&self, other: Weight) -> Result<Weight, MoneyError> {
        if other.0 > self.0 {
            return Err(MoneyError::Underflow {
                minuend: self.0,
                subtrahend: other.0,
            });
        }
        Weight::from_kg(self.0 - other.0)
    }

    /// Scales this weight by a non-negative factor
    pub fn scale(&self, factor: Decimal) -> Result<Weight, MoneyError> {
        let product = self.0.checked_mul(factor).ok_or(MoneyError::Overflow)?;
        Weight::from_kg(product)
    }

    /// Returns `self / whole` as an unrounded ratio
    pub fn ratio_of(&self, whole: Weight) -> Result<Decimal, MoneyError> {
        if whole.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        self.0.checked_div(whole.0).ok_or(MoneyError::Overflow)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kg", self.0.normalize())
    }
}
