//! Intake domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{ErrorKind, IntakeId, MoneyError};
use crate::intake::IntakeStatus;

/// Errors that can occur while pricing or progressing an intake
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntakeError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Packaging weight {packaging} kg must be below gross weight {gross} kg")]
    InvalidPackaging { gross: Decimal, packaging: Decimal },

    #[error("Invalid status transition for {intake_id} from {from:?} to {to:?}")]
    InvalidStatusTransition {
        intake_id: IntakeId,
        from: IntakeStatus,
        to: IntakeStatus,
    },

    #[error("Intake {intake_id} is {status:?}; measurements are frozen")]
    Frozen { intake_id: IntakeId, status: IntakeStatus },

    #[error("Intake {intake_id} is {status:?}; it must be accepted first")]
    NotAccepted { intake_id: IntakeId, status: IntakeStatus },

    #[error("Intake {intake_id} has {remaining} kg remaining, cannot deduct {requested} kg")]
    RemainingExceeded {
        intake_id: IntakeId,
        requested: Decimal,
        remaining: Decimal,
    },

    #[error("Intake {intake_id} has {remaining} kg gross left to release, cannot release {requested} kg")]
    GrossExceeded {
        intake_id: IntakeId,
        requested: Decimal,
        remaining: Decimal,
    },

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl IntakeError {
    pub(crate) fn invalid_input(field: &'static str, reason: impl ToString) -> Self {
        IntakeError::InvalidInput {
            field,
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            IntakeError::InvalidInput { .. } | IntakeError::Money(_) => ErrorKind::InvalidInput,
            IntakeError::InvalidPackaging { .. } => ErrorKind::InvalidPackaging,
            IntakeError::InvalidStatusTransition { .. }
            | IntakeError::Frozen { .. }
            | IntakeError::NotAccepted { .. } => ErrorKind::InvalidState,
            IntakeError::RemainingExceeded { .. } | IntakeError::GrossExceeded { .. } => ErrorKind::ExceedsRemaining,
        }
    }
}
