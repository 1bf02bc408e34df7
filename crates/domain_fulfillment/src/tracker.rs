//! Stock release rules
//!
//! Two explicit entry points, one per quantity basis, so a gross-weight
//! quantity can never be deducted as if it were net:
//!
//! - [`release_net`] deducts the quantity as given.
//! - [`release_gross_with_ratio`] deducts the net share of the gross released
//!   so far, `round(net_weight * gross_released / gross_weight)`, minus what
//!   earlier gross releases already deducted.

use chrono::{DateTime, Utc};

use core_kernel::{DeliveryId, Weight};
use domain_intake::{FulfillmentStage, Intake, IntakeError};
use crate::delivery::{Delivery, DeliveryStatus, QuantityBasis, ReleaseOrder};
use crate::error::FulfillmentError;

/// Releases a net-weight quantity from an accepted intake
pub fn release_net(
    intake: &mut Intake,
    quantity: Weight,
    order: &ReleaseOrder,
    now: DateTime<Utc>,
) -> Result<Delivery, FulfillmentError> {
    release(intake, QuantityBasis::Net, quantity, order, now)
}

/// Releases a gross-weight quantity, deducting its net equivalent
pub fn release_gross_with_ratio(
    intake: &mut Intake,
    gross_quantity: Weight,
    order: &ReleaseOrder,
    now: DateTime<Utc>,
) -> Result<Delivery, FulfillmentError> {
    release(intake, QuantityBasis::Gross, gross_quantity, order, now)
}

/// Net weight the next gross release of `gross_quantity` would deduct
pub fn net_equivalent(intake: &Intake, gross_quantity: Weight) -> Result<Weight, FulfillmentError> {
    intake.net_for_gross(gross_quantity).map_err(|e| match e {
        IntakeError::GrossExceeded {
            intake_id,
            requested,
            remaining,
        } => FulfillmentError::ExceedsRemainingGross {
            intake_id,
            requested,
            remaining,
        },
        other => other.into(),
    })
}

fn release(
    intake: &mut Intake,
    basis: QuantityBasis,
    quantity: Weight,
    order: &ReleaseOrder,
    now: DateTime<Utc>,
) -> Result<Delivery, FulfillmentError> {
    intake.require_accepted()?;
    order.validate()?;

    if quantity.is_zero() {
        return Err(FulfillmentError::InvalidQuantity {
            quantity: quantity.kg(),
        });
    }
    let net_weight = match basis {
        QuantityBasis::Net => quantity,
        QuantityBasis::Gross => net_equivalent(intake, quantity)?,
    };
    if net_weight.is_zero() {
        return Err(FulfillmentError::InvalidQuantity {
            quantity: quantity.kg(),
        });
    }
    if net_weight > intake.remaining_quantity() {
        return Err(FulfillmentError::ExceedsRemaining {
            intake_id: intake.id(),
            requested: net_weight.kg(),
            remaining: intake.remaining_quantity().kg(),
        });
    }

    let stage = match basis {
        QuantityBasis::Net => intake.deduct_remaining(net_weight, now)?,
        QuantityBasis::Gross => intake.deduct_gross(quantity, now)?.1,
    };

    Ok(Delivery {
        id: DeliveryId::new_v7(),
        intake_id: intake.id(),
        basis,
        quantity_released: quantity,
        net_weight_released: net_weight,
        recipient: order.recipient.trim().to_string(),
        carrier: order.carrier.trim().to_string(),
        status: DeliveryStatus::AwaitingDispatch,
        closes_intake: stage == FulfillmentStage::Fulfilled,
        released_at: now,
        dispatched_at: None,
        received_at: None,
    })
}
