//! Intake aggregate and status state machine
//!
//! ```text
//! Intaken -> Tested -> Accepted | Rejected | NeedsRework
//!              ^                                 |
//!              +------------ retest -------------+
//!
//! Accepted:  settlement   AwaitingSettlement -> PartiallyPaid -> Paid
//!            fulfillment  AwaitingFulfillment -> PartiallyFulfilled -> Fulfilled
//! ```
//!
//! Settlement and fulfillment progress independently once the intake is
//! accepted. Net weight and debt are computed when the intake is registered
//! and recomputed only by an explicit revision before acceptance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{IntakeId, Money, MoneyError, SupplierId, Weight};
use crate::error::IntakeError;
use crate::pricing::{Measurements, PricedIntake};

/// Quality/acceptance status of an intake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntakeStatus {
    /// Received and weighed
    Intaken,
    /// Lab test recorded
    Tested,
    /// Accepted into stock; settlement and fulfillment may start
    Accepted,
    /// Refused (terminal)
    Rejected,
    /// Sent back for correction; must be re-tested
    NeedsRework,
}

/// Payment progress mirrored from the intake's settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementStage {
    AwaitingSettlement,
    PartiallyPaid,
    Paid,
}

/// Stock release progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FulfillmentStage {
    AwaitingFulfillment,
    PartiallyFulfilled,
    Fulfilled,
}

/// One receipt of raw material from a supplier
///
/// # Invariants
///
/// - `remaining_quantity <= net_weight`
/// - `gross_released <= gross_weight`, and the net deducted by gross-basis
///   releases is `round(net_weight * gross_released / gross_weight)`
/// - `net_weight` and `total_debt` always equal `measurements.price()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intake {
    id: IntakeId,
    supplier_id: SupplierId,
    measurements: Measurements,
    pricing: PricedIntake,
    remaining_quantity: Weight,
    /// Cumulative quantity released on the gross basis
    gross_released: Weight,
    /// Net weight deducted by those gross releases
    net_released_by_gross: Weight,
    status: IntakeStatus,
    settlement_stage: Option<SettlementStage>,
    fulfillment_stage: Option<FulfillmentStage>,
    revision: u32,
    registered_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Intake {
    /// Registers a new intake, pricing it from its measurements
    pub fn register(
        supplier_id: SupplierId,
        measurements: Measurements,
        now: DateTime<Utc>,
    ) -> Result<Self, IntakeError> {
        let pricing = measurements.price()?;

        Ok(Self {
            id: IntakeId::new_v7(),
            supplier_id,
            measurements,
            pricing,
            remaining_quantity: pricing.net_weight,
            gross_released: Weight::ZERO,
            net_released_by_gross: Weight::ZERO,
            status: IntakeStatus::Intaken,
            settlement_stage: None,
            fulfillment_stage: None,
            revision: 0,
            registered_at: now,
            updated_at: now,
        })
    }

    /// Replaces the measurements and re-prices the intake
    ///
    /// Only allowed before acceptance. The remaining quantity is reset to the
    /// new net weight since nothing can have been released yet.
    pub fn revise(&mut self, measurements: Measurements, now: DateTime<Utc>) -> Result<&PricedIntake, IntakeError> {
        if matches!(self.status, IntakeStatus::Accepted | IntakeStatus::Rejected) {
            return Err(IntakeError::Frozen {
                intake_id: self.id,
                status: self.status,
            });
        }

        let pricing = measurements.price()?;
        self.measurements = measurements;
        self.pricing = pricing;
        self.remaining_quantity = pricing.net_weight;
        self.revision += 1;
        self.updated_at = now;
        Ok(&self.pricing)
    }

    /// Records the lab test (first test, or re-test after rework)
    pub fn record_test(&mut self, now: DateTime<Utc>) -> Result<(), IntakeError> {
        self.transition(IntakeStatus::Tested, now)
    }

    /// Accepts the intake, opening its settlement and fulfillment tracks
    pub fn accept(&mut self, now: DateTime<Utc>) -> Result<(), IntakeError> {
        self.transition(IntakeStatus::Accepted, now)?;
        self.settlement_stage = Some(SettlementStage::AwaitingSettlement);
        self.fulfillment_stage = Some(FulfillmentStage::AwaitingFulfillment);
        Ok(())
    }

    pub fn reject(&mut self, now: DateTime<Utc>) -> Result<(), IntakeError> {
        self.transition(IntakeStatus::Rejected, now)
    }

    pub fn request_rework(&mut self, now: DateTime<Utc>) -> Result<(), IntakeError> {
        self.transition(IntakeStatus::NeedsRework, now)
    }

    /// Mirrors the settlement's payment progress onto the intake
    pub fn set_settlement_stage(&mut self, stage: SettlementStage, now: DateTime<Utc>) -> Result<(), IntakeError> {
        self.require_accepted()?;
        self.settlement_stage = Some(stage);
        self.updated_at = now;
        Ok(())
    }

    /// Deducts released net weight from the remaining quantity
    ///
    /// Returns the resulting fulfillment stage.
    pub fn deduct_remaining(&mut self, net_released: Weight, now: DateTime<Utc>) -> Result<FulfillmentStage, IntakeError> {
        self.require_accepted()?;

        if net_released > self.remaining_quantity {
            return Err(IntakeError::RemainingExceeded {
                intake_id: self.id,
                requested: net_released.kg(),
                remaining: self.remaining_quantity.kg(),
            });
        }

        self.remaining_quantity = self.remaining_quantity.checked_sub(net_released)?;
        let stage = if self.remaining_quantity.is_zero() {
            FulfillmentStage::Fulfilled
        } else {
            FulfillmentStage::PartiallyFulfilled
        };
        self.fulfillment_stage = Some(stage);
        self.updated_at = now;
        Ok(stage)
    }

    /// Net weight a gross-basis release of `gross_quantity` would deduct
    ///
    /// Derived from the cumulative gross released so that rounding never
    /// accumulates: releasing the whole gross weight, in any number of parts,
    /// deducts exactly the net weight.
    pub fn net_for_gross(&self, gross_quantity: Weight) -> Result<Weight, IntakeError> {
        let gross_after = self.gross_released.checked_add(gross_quantity)?;
        if gross_after > self.gross_weight() {
            return Err(IntakeError::GrossExceeded {
                intake_id: self.id,
                requested: gross_quantity.kg(),
                remaining: self.remaining_gross()?.kg(),
            });
        }

        let net_after = self
            .net_weight()
            .kg()
            .checked_mul(gross_after.kg())
            .ok_or(MoneyError::Overflow)?
            .checked_div(self.gross_weight().kg())
            .ok_or(MoneyError::DivisionByZero)?;
        Ok(Weight::from_kg(net_after)?.checked_sub(self.net_released_by_gross)?)
    }

    /// Deducts a gross-basis release
    ///
    /// Returns the net weight deducted and the resulting fulfillment stage.
    pub fn deduct_gross(
        &mut self,
        gross_quantity: Weight,
        now: DateTime<Utc>,
    ) -> Result<(Weight, FulfillmentStage), IntakeError> {
        let net = self.net_for_gross(gross_quantity)?;
        let gross_released = self.gross_released.checked_add(gross_quantity)?;
        let net_released_by_gross = self.net_released_by_gross.checked_add(net)?;

        let stage = self.deduct_remaining(net, now)?;
        self.gross_released = gross_released;
        self.net_released_by_gross = net_released_by_gross;
        Ok((net, stage))
    }

    /// Fails unless the intake has been accepted
    pub fn require_accepted(&self) -> Result<(), IntakeError> {
        if self.status != IntakeStatus::Accepted {
            return Err(IntakeError::NotAccepted {
                intake_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    /// True once nothing further can happen to this intake
    pub fn is_terminal(&self) -> bool {
        match self.status {
            IntakeStatus::Rejected => true,
            IntakeStatus::Accepted => {
                self.settlement_stage == Some(SettlementStage::Paid)
                    && self.fulfillment_stage == Some(FulfillmentStage::Fulfilled)
            }
            _ => false,
        }
    }

    pub fn id(&self) -> IntakeId {
        self.id
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    pub fn pricing(&self) -> &PricedIntake {
        &self.pricing
    }

    pub fn gross_weight(&self) -> Weight {
        self.measurements.gross_weight
    }

    pub fn net_weight(&self) -> Weight {
        self.pricing.net_weight
    }

    pub fn total_debt(&self) -> Money {
        self.pricing.total_debt
    }

    pub fn remaining_quantity(&self) -> Weight {
        self.remaining_quantity
    }

    pub fn gross_released(&self) -> Weight {
        self.gross_released
    }

    /// Gross weight still available to gross-basis releases
    pub fn remaining_gross(&self) -> Result<Weight, IntakeError> {
        Ok(self.gross_weight().checked_sub(self.gross_released)?)
    }

    pub fn status(&self) -> IntakeStatus {
        self.status
    }

    pub fn settlement_stage(&self) -> Option<SettlementStage> {
        self.settlement_stage
    }

    pub fn fulfillment_stage(&self) -> Option<FulfillmentStage> {
        self.fulfillment_stage
    }

    /// Number of times the measurements were revised
    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn transition(&mut self, target: IntakeStatus, now: DateTime<Utc>) -> Result<(), IntakeError> {
        if !self.can_transition_to(target) {
            return Err(IntakeError::InvalidStatusTransition {
                intake_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.updated_at = now;
        Ok(())
    }

    fn can_transition_to(&self, target: IntakeStatus) -> bool {
        use IntakeStatus::*;
        matches!(
            (self.status, target),
            (Intaken, Tested)
                | (NeedsRework, Tested)
                | (Tested, Accepted)
                | (Tested, Rejected)
                | (Tested, NeedsRework)
        )
    }
}
