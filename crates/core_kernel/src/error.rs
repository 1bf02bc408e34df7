//! Core error types used across the system

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::money::MoneyError;
use crate::temporal::TemporalError;

/// The error taxonomy callers match on
///
/// Every domain error maps onto exactly one kind so the presentation layer can
/// pick a message without inspecting crate-specific enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or out-of-range numeric input
    InvalidInput,
    /// Packaging weight not below gross weight
    InvalidPackaging,
    /// Operation forbidden in the entity's current lifecycle state
    InvalidState,
    /// Confirmation re-entry did not match the requested amount
    AmountMismatch,
    /// Advance cannot be cancelled because part of it was drawn
    AdvanceInUse,
    /// Draw larger than the advance's remaining balance
    InsufficientBalance,
    /// Payment larger than the settlement's open balance
    Overpayment,
    /// Release larger than the intake's remaining quantity
    ExceedsRemaining,
    /// Advance and intake belong to different suppliers
    SupplierMismatch,
    /// Supplier blocked by the eligibility policy
    IneligibleSupplier,
    NotFound,
    /// Concurrent modification could not be resolved by retrying
    Conflict,
    /// Backing store failure
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::InvalidPackaging => "invalid_packaging",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::AmountMismatch => "amount_mismatch",
            ErrorKind::AdvanceInUse => "advance_in_use",
            ErrorKind::InsufficientBalance => "insufficient_balance",
            ErrorKind::Overpayment => "overpayment",
            ErrorKind::ExceedsRemaining => "exceeds_remaining",
            ErrorKind::SupplierMismatch => "supplier_mismatch",
            ErrorKind::IneligibleSupplier => "ineligible_supplier",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Storage => "storage",
        };
        f.write_str(name)
    }
}

/// Core error type for the kernel
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }

    /// Every kernel error is a rejected input
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}
