//! Settlement domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{AdvanceId, ErrorKind, MoneyError, SettlementId, SupplierId};
use domain_credit::AdvanceError;
use domain_intake::IntakeError;

/// Errors that can occur while settling intake debt
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettlementError {
    #[error("Invalid payment amount: {amount} (must be greater than zero)")]
    InvalidAmount { amount: Decimal },

    #[error("Overpayment on {settlement_id}: attempted {attempted}, outstanding {outstanding}")]
    Overpayment {
        settlement_id: SettlementId,
        attempted: Decimal,
        outstanding: Decimal,
    },

    #[error("Advance {advance_id} belongs to {advance_supplier}, intake belongs to {intake_supplier}")]
    SupplierMismatch {
        advance_id: AdvanceId,
        advance_supplier: SupplierId,
        intake_supplier: SupplierId,
    },

    #[error("Advance error: {0}")]
    Advance(#[from] AdvanceError),

    #[error("Intake error: {0}")]
    Intake(#[from] IntakeError),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl SettlementError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SettlementError::InvalidAmount { .. } | SettlementError::Money(_) => ErrorKind::InvalidInput,
            SettlementError::Overpayment { .. } => ErrorKind::Overpayment,
            SettlementError::SupplierMismatch { .. } => ErrorKind::SupplierMismatch,
            SettlementError::Advance(e) => e.kind(),
            SettlementError::Intake(e) => e.kind(),
        }
    }
}
