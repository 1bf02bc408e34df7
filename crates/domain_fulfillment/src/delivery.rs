//! Deliveries
//!
//! A delivery is one release of an intake's stock to a recipient through a
//! carrier. It records the quantity exactly as the caller expressed it, the
//! basis of that quantity, and the net weight charged against the intake.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DeliveryId, IntakeId, Weight};
use crate::error::FulfillmentError;

/// Basis in which a release quantity was expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityBasis {
    /// Quantity is already net weight
    Net,
    /// Quantity is gross weight, converted through the intake's net/gross ratio
    Gross,
}

/// Delivery lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    AwaitingDispatch,
    InTransit,
    /// Received; the intake still had stock left after this release
    PartiallyFulfilled,
    /// Received; this release exhausted the intake
    Fulfilled,
}

/// Who receives the stock and who carries it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseOrder {
    pub recipient: String,
    pub carrier: String,
}

impl ReleaseOrder {
    pub fn new(recipient: impl Into<String>, carrier: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            carrier: carrier.into(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), FulfillmentError> {
        if self.recipient.trim().is_empty() {
            return Err(FulfillmentError::MissingParty { field: "recipient" });
        }
        if self.carrier.trim().is_empty() {
            return Err(FulfillmentError::MissingParty { field: "carrier" });
        }
        Ok(())
    }
}

/// One partial or full release of an intake's stock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub intake_id: IntakeId,
    pub basis: QuantityBasis,
    /// Quantity as expressed by the caller, in `basis`
    pub quantity_released: Weight,
    /// Net weight deducted from the intake's remaining quantity
    pub net_weight_released: Weight,
    pub recipient: String,
    pub carrier: String,
    pub status: DeliveryStatus,
    /// Whether the intake had nothing left after this release
    pub closes_intake: bool,
    pub released_at: DateTime<Utc>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
}

impl Delivery {
    /// Marks the delivery as handed to the carrier
    pub fn dispatch(&mut self, now: DateTime<Utc>) -> Result<(), FulfillmentError> {
        self.transition(DeliveryStatus::InTransit)?;
        self.dispatched_at = Some(now);
        Ok(())
    }

    /// Marks the delivery as received by the recipient
    pub fn confirm_receipt(&mut self, now: DateTime<Utc>) -> Result<(), FulfillmentError> {
        let target = if self.closes_intake {
            DeliveryStatus::Fulfilled
        } else {
            DeliveryStatus::PartiallyFulfilled
        };
        self.transition(target)?;
        self.received_at = Some(now);
        Ok(())
    }

    fn transition(&mut self, target: DeliveryStatus) -> Result<(), FulfillmentError> {
        use DeliveryStatus::*;
        let allowed = matches!(
            (self.status, target),
            (AwaitingDispatch, InTransit) | (InTransit, PartiallyFulfilled) | (InTransit, Fulfilled)
        );
        if !allowed {
            return Err(FulfillmentError::InvalidStatusTransition {
                delivery_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }
}
