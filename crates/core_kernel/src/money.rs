//! Money types with precise decimal arithmetic
//!
//! Every amount the ledger handles is a non-negative fixed-point value backed by
//! rust_decimal. Operations that could go below zero or mix currencies return an
//! error instead of producing a silently wrong balance.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Internal scale for amounts before they are rounded to the currency
pub const INTERNAL_SCALE: u32 = 4;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// West African CFA franc
    XOF,
    /// Central African CFA franc
    XAF,
    /// Guinean franc
    GNF,
    USD,
    EUR,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::XOF | Currency::XAF | Currency::GNF => 0,
            Currency::USD | Currency::EUR => 2,
        }
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::XOF | Currency::XAF => "FCFA",
            Currency::GNF => "FG",
            Currency::USD => "$",
            Currency::EUR => "€",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::XOF => "XOF",
            Currency::XAF => "XAF",
            Currency::GNF => "GNF",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that can occur during money and quantity operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Negative value not allowed: {0}")]
    Negative(Decimal),

    #[error("Subtraction underflow: {minuend} - {subtrahend} would be negative")]
    Underflow { minuend: Decimal, subtrahend: Decimal },

    #[error("Invalid percentage: {0} (expected 0 to 100)")]
    InvalidPercentage(Decimal),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Overflow during calculation")]
    Overflow,

    #[error("{amount} {currency} has more than {decimal_places} decimal places")]
    ExcessPrecision {
        amount: Decimal,
        currency: Currency,
        decimal_places: u32,
    },
}

/// Rounds a decimal with banker's rounding (round half to even)
pub fn round_bankers(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven)
}

/// A non-negative monetary amount with associated currency
///
/// Amounts are stored with 4 decimal places internally so that intermediate
/// products (weight times unit price) keep their precision until the final
/// rounding to the currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value, rejecting negative amounts
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(amount));
        }
        Ok(Self {
            amount: round_bankers(amount, INTERNAL_SCALE),
            currency,
        })
    }

    /// Creates Money from an integer amount in minor units (e.g., cents)
    pub fn from_minor(minor_units: u64, currency: Currency) -> Self {
        let amount = Decimal::from(minor_units) / Decimal::from(10_u64.pow(currency.decimal_places()));
        Self { amount, currency }
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        !self.amount.is_zero()
    }

    /// Rounds to the currency's precision using banker's rounding
    pub fn round_to_currency(&self) -> Self {
        Self {
            amount: round_bankers(self.amount, self.currency.decimal_places()),
            currency: self.currency,
        }
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(())
    }

    /// Checked addition that returns an error on currency mismatch or overflow
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let sum = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Money::new(sum, self.currency)
    }

    /// Checked subtraction that refuses to go below zero
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        if other.amount > self.amount {
            return Err(MoneyError::Underflow {
                minuend: self.amount,
                subtrahend: other.amount,
            });
        }
        Money::new(self.amount - other.amount, self.currency)
    }

    /// Multiplies by a non-negative scalar (e.g., a weight in kilograms)
    pub fn multiply(&self, factor: Decimal) -> Result<Money, MoneyError> {
        let product = self
            .amount
            .checked_mul(factor)
            .ok_or(MoneyError::Overflow)?;
        Money::new(product, self.currency)
    }

    /// Multiplies by a non-negative scalar and rounds the exact product once,
    /// at the currency's precision
    pub fn multiply_to_currency(&self, factor: Decimal) -> Result<Money, MoneyError> {
        let product = self
            .amount
            .checked_mul(factor)
            .ok_or(MoneyError::Overflow)?;
        Money::new(round_bankers(product, self.currency.decimal_places()), self.currency)
    }

    /// Fails if the amount carries fractions of the currency's minor unit
    pub fn ensure_currency_precision(&self) -> Result<(), MoneyError> {
        let decimal_places = self.currency.decimal_places();
        if round_bankers(self.amount, decimal_places) != self.amount {
            return Err(MoneyError::ExcessPrecision {
                amount: self.amount,
                currency: self.currency,
                decimal_places,
            });
        }
        Ok(())
    }

    /// Compares two amounts of the same currency
    pub fn exceeds(&self, other: &Money) -> Result<bool, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(self.amount > other.amount)
    }

    /// The smaller of two amounts of the same currency
    pub fn min(&self, other: &Money) -> Result<Money, MoneyError> {
        Ok(if self.exceeds(other)? { *other } else { *self })
    }

    /// Sums an iterator of amounts, starting at zero in `currency`
    pub fn sum<'a, I>(currency: Currency, items: I) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        items
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.checked_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        write!(
            f,
            "{:.dp$} {}",
            self.amount,
            self.currency.symbol(),
            dp = dp as usize
        )
    }
}

/// A percentage rate such as a humidity reading or a desiccation target
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.12 for 12%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a percentage in the range 0..=100
    pub fn from_percentage(percentage: Decimal) -> Result<Self, MoneyError> {
        if percentage < Decimal::ZERO || percentage > dec!(100) {
            return Err(MoneyError::InvalidPercentage(percentage));
        }
        Ok(Self {
            value: percentage / dec!(100),
        })
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().round_dp(4))
    }
}
