//! Fulfillment domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{DeliveryId, ErrorKind, IntakeId, MoneyError};
use domain_intake::IntakeError;
use crate::delivery::DeliveryStatus;

/// Errors that can occur while releasing stock
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FulfillmentError {
    #[error("Invalid release quantity: {quantity} kg (must be greater than zero)")]
    InvalidQuantity { quantity: Decimal },

    #[error("Release of {requested} kg net exceeds the {remaining} kg remaining on {intake_id}")]
    ExceedsRemaining {
        intake_id: IntakeId,
        requested: Decimal,
        remaining: Decimal,
    },

    #[error("Release of {requested} kg gross exceeds the {remaining} kg gross left on {intake_id}")]
    ExceedsRemainingGross {
        intake_id: IntakeId,
        requested: Decimal,
        remaining: Decimal,
    },

    #[error("Delivery requires a {field}")]
    MissingParty { field: &'static str },

    #[error("Invalid status transition for {delivery_id} from {from:?} to {to:?}")]
    InvalidStatusTransition {
        delivery_id: DeliveryId,
        from: DeliveryStatus,
        to: DeliveryStatus,
    },

    #[error("Intake error: {0}")]
    Intake(#[from] IntakeError),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl FulfillmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FulfillmentError::InvalidQuantity { .. }
            | FulfillmentError::MissingParty { .. }
            | FulfillmentError::Money(_) => ErrorKind::InvalidInput,
            FulfillmentError::ExceedsRemaining { .. } | FulfillmentError::ExceedsRemainingGross { .. } => {
                ErrorKind::ExceedsRemaining
            }
            FulfillmentError::InvalidStatusTransition { .. } => ErrorKind::InvalidState,
            FulfillmentError::Intake(e) => e.kind(),
        }
    }
}
