//! Credit domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{AdvanceId, ErrorKind, MoneyError};
use crate::advance::AdvanceStatus;

/// Errors that can occur in the advance ledger
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdvanceError {
    #[error("Invalid advance amount: {amount} (must be greater than zero)")]
    InvalidAmount { amount: Decimal },

    #[error("Cancellation of {advance_id} requires a reason")]
    MissingReason { advance_id: AdvanceId },

    #[error("Confirmation of {advance_id} failed: re-entered {reentered} does not match requested {requested}")]
    AmountMismatch {
        advance_id: AdvanceId,
        requested: Decimal,
        reentered: Decimal,
    },

    #[error("Cannot {operation} advance {advance_id} in status {status:?}")]
    InvalidState {
        advance_id: AdvanceId,
        status: AdvanceStatus,
        operation: &'static str,
    },

    #[error("Advance {advance_id} cannot be cancelled: {amount_used} already drawn")]
    AdvanceInUse {
        advance_id: AdvanceId,
        amount_used: Decimal,
    },

    #[error("Insufficient balance on {advance_id}: requested {requested}, remaining {remaining}")]
    InsufficientBalance {
        advance_id: AdvanceId,
        requested: Decimal,
        remaining: Decimal,
    },

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl AdvanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdvanceError::InvalidAmount { .. }
            | AdvanceError::MissingReason { .. }
            | AdvanceError::Money(_) => ErrorKind::InvalidInput,
            AdvanceError::AmountMismatch { .. } => ErrorKind::AmountMismatch,
            AdvanceError::InvalidState { .. } => ErrorKind::InvalidState,
            AdvanceError::AdvanceInUse { .. } => ErrorKind::AdvanceInUse,
            AdvanceError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
        }
    }
}
