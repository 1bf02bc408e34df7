//! Intake registry service

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use core_kernel::{IntakeId, SupplierId};
use domain_credit::Eligibility;
use domain_intake::{Intake, IntakeError, IntakeStatus, Measurements, PricedIntake};

use crate::context::EngineContext;
use crate::error::EngineError;
use crate::services::AdvanceLedger;

/// Registers intakes and drives their quality status
#[derive(Clone)]
pub struct IntakeRegistry {
    ctx: Arc<EngineContext>,
    advances: AdvanceLedger,
}

impl IntakeRegistry {
    pub fn new(ctx: Arc<EngineContext>, advances: AdvanceLedger) -> Self {
        Self { ctx, advances }
    }

    /// Prices measurements without storing anything
    pub fn quote(&self, measurements: &Measurements) -> Result<PricedIntake, EngineError> {
        self.ctx.ensure_currency(&measurements.unit_price)?;
        Ok(measurements.price()?)
    }

    /// Registers a new intake for an eligible supplier
    ///
    /// Eligibility is evaluated on every commit attempt, so a retry after a
    /// conflict sees advances reserved in the meantime. It remains a
    /// point-in-time check: a reservation committed after the intake is not
    /// held against it.
    #[instrument(skip(self, measurements), fields(supplier_id = %supplier_id))]
    pub fn register(&self, supplier_id: SupplierId, measurements: Measurements) -> Result<Intake, EngineError> {
        self.ctx.ensure_currency(&measurements.unit_price)?;

        let intake = self
            .ctx
            .transact("register_intake", |unit, now| {
                if let Eligibility::Blocked { reason } = self.advances.eligibility(supplier_id)? {
                    return Err(EngineError::IneligibleSupplier { supplier_id, reason });
                }

                let intake = Intake::register(supplier_id, measurements, now)?;
                unit.insert_intake(intake.clone());
                Ok(intake)
            })
            .inspect_err(|e| {
                if let EngineError::IneligibleSupplier { reason, .. } = e {
                    warn!(%reason, "Intake registration blocked");
                }
            })?;

        info!(
            intake_id = %intake.id(),
            net_weight = %intake.net_weight(),
            total_debt = %intake.total_debt(),
            "Intake registered"
        );
        Ok(intake)
    }

    /// Replaces the measurements of an intake that is not yet accepted
    #[instrument(skip(self, measurements), fields(intake_id = %intake_id))]
    pub fn revise(&self, intake_id: IntakeId, measurements: Measurements) -> Result<Intake, EngineError> {
        self.ctx.ensure_currency(&measurements.unit_price)?;
        let intake = self.mutate("revise_intake", intake_id, |intake, now| {
            intake.revise(measurements, now).map(|_| ())
        })?;

        info!(
            revision = intake.revision(),
            total_debt = %intake.total_debt(),
            "Intake re-priced"
        );
        Ok(intake)
    }

    #[instrument(skip(self), fields(intake_id = %intake_id))]
    pub fn record_test(&self, intake_id: IntakeId) -> Result<Intake, EngineError> {
        self.transition("record_test", intake_id, Intake::record_test)
    }

    /// Re-tests an intake that was sent back for rework
    #[instrument(skip(self), fields(intake_id = %intake_id))]
    pub fn retest(&self, intake_id: IntakeId) -> Result<Intake, EngineError> {
        self.transition("retest_intake", intake_id, |intake, now| {
            if intake.status() != IntakeStatus::NeedsRework {
                return Err(IntakeError::InvalidStatusTransition {
                    intake_id: intake.id(),
                    from: intake.status(),
                    to: IntakeStatus::Tested,
                });
            }
            intake.record_test(now)
        })
    }

    #[instrument(skip(self), fields(intake_id = %intake_id))]
    pub fn accept(&self, intake_id: IntakeId) -> Result<Intake, EngineError> {
        self.transition("accept_intake", intake_id, Intake::accept)
    }

    #[instrument(skip(self), fields(intake_id = %intake_id))]
    pub fn reject(&self, intake_id: IntakeId) -> Result<Intake, EngineError> {
        self.transition("reject_intake", intake_id, Intake::reject)
    }

    #[instrument(skip(self), fields(intake_id = %intake_id))]
    pub fn request_rework(&self, intake_id: IntakeId) -> Result<Intake, EngineError> {
        self.transition("request_rework", intake_id, Intake::request_rework)
    }

    pub fn get(&self, intake_id: IntakeId) -> Result<Intake, EngineError> {
        Ok(self.ctx.store.intake(intake_id)?.into_inner())
    }

    pub fn intakes_for_supplier(&self, supplier_id: SupplierId) -> Result<Vec<Intake>, EngineError> {
        Ok(self.ctx.store.intakes_for_supplier(supplier_id)?)
    }

    fn transition<F>(&self, operation: &'static str, intake_id: IntakeId, change: F) -> Result<Intake, EngineError>
    where
        F: FnMut(&mut Intake, DateTime<Utc>) -> Result<(), IntakeError>,
    {
        let intake = self
            .mutate(operation, intake_id, change)
            .inspect_err(|e| warn!(operation, error = %e, "Intake transition rejected"))?;
        info!(status = ?intake.status(), "Intake status changed");
        Ok(intake)
    }

    fn mutate<F>(&self, operation: &'static str, intake_id: IntakeId, mut change: F) -> Result<Intake, EngineError>
    where
        F: FnMut(&mut Intake, DateTime<Utc>) -> Result<(), IntakeError>,
    {
        self.ctx.transact(operation, |unit, now| {
            let mut read = self.ctx.store.intake(intake_id)?;
            change(&mut read.value, now)?;
            unit.update_intake(read.value.clone(), read.version);
            Ok(read.value)
        })
    }
}
