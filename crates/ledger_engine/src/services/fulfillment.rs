//! Fulfillment tracker service
//!
//! A release deducts from the intake and creates a delivery; both are staged
//! together so the intake's remaining quantity always equals its net weight
//! minus the net weight of its stored deliveries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use core_kernel::{DeliveryId, IntakeId, Weight};
use domain_fulfillment::{
    release_gross_with_ratio, release_net, Delivery, FulfillmentError, QuantityBasis, ReleaseOrder,
};
use domain_intake::Intake;

use crate::context::EngineContext;
use crate::error::{AtStep, EngineError, Step};

type ReleaseFn = fn(&mut Intake, Weight, &ReleaseOrder, DateTime<Utc>) -> Result<Delivery, FulfillmentError>;

/// Releases an intake's stock and follows deliveries to receipt
#[derive(Clone)]
pub struct FulfillmentTracker {
    ctx: Arc<EngineContext>,
}

impl FulfillmentTracker {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    /// Releases a net-weight quantity
    #[instrument(skip(self, order), fields(intake_id = %intake_id, quantity = %quantity))]
    pub fn release_net(
        &self,
        intake_id: IntakeId,
        quantity: Weight,
        order: ReleaseOrder,
    ) -> Result<Delivery, EngineError> {
        self.release("release_net", intake_id, quantity, &order, release_net)
    }

    /// Releases a gross-weight quantity, deducting its net equivalent
    #[instrument(skip(self, order), fields(intake_id = %intake_id, quantity = %quantity))]
    pub fn release_gross_with_ratio(
        &self,
        intake_id: IntakeId,
        quantity: Weight,
        order: ReleaseOrder,
    ) -> Result<Delivery, EngineError> {
        self.release("release_gross_with_ratio", intake_id, quantity, &order, release_gross_with_ratio)
    }

    /// Hands a delivery to its carrier
    #[instrument(skip(self), fields(delivery_id = %delivery_id))]
    pub fn dispatch(&self, delivery_id: DeliveryId) -> Result<Delivery, EngineError> {
        let delivery = self.mutate("dispatch_delivery", delivery_id, Delivery::dispatch)?;
        info!(carrier = %delivery.carrier, "Delivery dispatched");
        Ok(delivery)
    }

    /// Records receipt by the recipient
    #[instrument(skip(self), fields(delivery_id = %delivery_id))]
    pub fn confirm_receipt(&self, delivery_id: DeliveryId) -> Result<Delivery, EngineError> {
        let delivery = self.mutate("confirm_receipt", delivery_id, Delivery::confirm_receipt)?;
        info!(status = ?delivery.status, "Delivery received");
        Ok(delivery)
    }

    pub fn get(&self, delivery_id: DeliveryId) -> Result<Delivery, EngineError> {
        Ok(self.ctx.store.delivery(delivery_id)?.into_inner())
    }

    pub fn deliveries_for_intake(&self, intake_id: IntakeId) -> Result<Vec<Delivery>, EngineError> {
        Ok(self.ctx.store.deliveries_for_intake(intake_id)?)
    }

    /// Net weight released so far from an intake
    pub fn released_net_weight(&self, intake_id: IntakeId) -> Result<Weight, EngineError> {
        self.deliveries_for_intake(intake_id)?
            .iter()
            .try_fold(Weight::ZERO, |total, d| total.checked_add(d.net_weight_released))
            .map_err(EngineError::from)
    }

    fn release(
        &self,
        operation: &'static str,
        intake_id: IntakeId,
        quantity: Weight,
        order: &ReleaseOrder,
        apply: ReleaseFn,
    ) -> Result<Delivery, EngineError> {
        let delivery = self
            .ctx
            .transact_atomic(operation, |unit, now| {
                let mut intake = self.ctx.store.intake(intake_id).at_step(operation, Step::LoadIntake)?;

                let delivery = match apply(&mut intake.value, quantity, order, now) {
                    Ok(delivery) => delivery,
                    Err(e) => {
                        let step = match e {
                            FulfillmentError::Intake(_) => Step::UpdateIntake,
                            _ => Step::RecordDelivery,
                        };
                        return Err(e).at_step(operation, step);
                    }
                };

                unit.update_intake(intake.value, intake.version)
                    .insert_delivery(delivery.clone());
                Ok(delivery)
            })
            .inspect_err(|e| warn!(step = ?e.step(), error = %e, "Release rejected"))?;

        info!(
            delivery_id = %delivery.id,
            basis = ?delivery.basis,
            net_weight_released = %delivery.net_weight_released,
            closes_intake = delivery.closes_intake,
            "Stock released"
        );
        if delivery.basis == QuantityBasis::Gross {
            info!(gross_quantity = %delivery.quantity_released, "Gross quantity converted through net/gross ratio");
        }
        Ok(delivery)
    }

    fn mutate<F>(&self, operation: &'static str, delivery_id: DeliveryId, mut change: F) -> Result<Delivery, EngineError>
    where
        F: FnMut(&mut Delivery, DateTime<Utc>) -> Result<(), FulfillmentError>,
    {
        self.ctx
            .transact(operation, |unit, now| {
                let mut read = self.ctx.store.delivery(delivery_id)?;
                change(&mut read.value, now)?;
                unit.update_delivery(read.value.clone(), read.version);
                Ok(read.value)
            })
            .inspect_err(|e| warn!(operation, error = %e, "Delivery transition rejected"))
    }
}
