//! Settlement ledger service
//!
//! A payment drawn from an advance touches three entities: the settlement,
//! the advance and the intake whose settlement stage mirrors the payment
//! status. They are staged in one unit of work and commit together.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use core_kernel::{IntakeId, Money, SettlementId, SupplierId};
use domain_settlement::{PaymentSource, Settlement, SettlementError, StandingReceivable};

use crate::context::EngineContext;
use crate::error::{AtStep, EngineError, Step};

/// Opens settlements and applies payments to them
#[derive(Clone)]
pub struct SettlementLedger {
    ctx: Arc<EngineContext>,
}

impl SettlementLedger {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    /// Opens the settlement of an accepted intake
    ///
    /// A zero-debt intake is settled on the spot.
    #[instrument(skip(self), fields(intake_id = %intake_id))]
    pub fn open_settlement(&self, intake_id: IntakeId) -> Result<Settlement, EngineError> {
        let settlement = self
            .ctx
            .transact("open_settlement", |unit, now| {
                if let Some(existing) = self.ctx.store.settlement_for_intake(intake_id)? {
                    return Err(EngineError::SettlementExists {
                        intake_id,
                        settlement_id: existing.value.id(),
                    });
                }

                let mut intake = self.ctx.store.intake(intake_id)?;
                let settlement = Settlement::open(&intake.value, now)?;
                intake.value.set_settlement_stage(settlement.status().into(), now)?;

                unit.insert_settlement(settlement.clone())
                    .update_intake(intake.value, intake.version);
                Ok(settlement)
            })
            .inspect_err(|e| warn!(error = %e, "Settlement not opened"))?;

        info!(
            settlement_id = %settlement.id(),
            amount_due = %settlement.amount_due(),
            status = ?settlement.status(),
            "Settlement opened"
        );
        Ok(settlement)
    }

    /// Applies a direct or advance-funded payment
    ///
    /// Either the payment, the advance draw and the intake's stage change are
    /// all stored, or none is. Failures name the step that failed.
    #[instrument(skip(self), fields(settlement_id = %settlement_id, amount = %amount, source = ?source))]
    pub fn apply_payment(
        &self,
        settlement_id: SettlementId,
        amount: Money,
        source: PaymentSource,
    ) -> Result<Settlement, EngineError> {
        const OP: &str = "apply_payment";
        self.ctx.ensure_amount(&amount)?;

        let settlement = self
            .ctx
            .transact_atomic(OP, |unit, now| {
                let mut settlement = self.ctx.store.settlement(settlement_id).at_step(OP, Step::LoadSettlement)?;

                match source {
                    PaymentSource::Direct => {
                        settlement
                            .value
                            .apply_direct(amount, now)
                            .at_step(OP, Step::RecordPayment)?;
                    }
                    PaymentSource::Advance(advance_id) => {
                        let mut advance = self.ctx.store.advance(advance_id).at_step(OP, Step::LoadAdvance)?;

                        if advance.value.supplier_id() != settlement.value.supplier_id() {
                            return Err(SettlementError::SupplierMismatch {
                                advance_id,
                                advance_supplier: advance.value.supplier_id(),
                                intake_supplier: settlement.value.supplier_id(),
                            })
                            .at_step(OP, Step::VerifySupplier);
                        }

                        if let Err(e) = settlement.value.apply_from_advance(&mut advance.value, amount, now) {
                            let step = match e {
                                SettlementError::Advance(_) => Step::DrawAdvance,
                                _ => Step::RecordPayment,
                            };
                            return Err(e).at_step(OP, step);
                        }
                        unit.update_advance(advance.value, advance.version);
                    }
                }

                let mut intake = self
                    .ctx
                    .store
                    .intake(settlement.value.intake_id())
                    .at_step(OP, Step::UpdateIntake)?;
                intake
                    .value
                    .set_settlement_stage(settlement.value.status().into(), now)
                    .at_step(OP, Step::UpdateIntake)?;

                unit.update_settlement(settlement.value.clone(), settlement.version)
                    .update_intake(intake.value, intake.version);
                Ok(settlement.value)
            })
            .inspect_err(|e| warn!(step = ?e.step(), error = %e, "Payment rejected"))?;

        info!(
            amount_paid = %settlement.amount_paid(),
            open_balance = %settlement.open_balance(),
            status = ?settlement.status(),
            "Payment applied"
        );
        Ok(settlement)
    }

    pub fn get(&self, settlement_id: SettlementId) -> Result<Settlement, EngineError> {
        Ok(self.ctx.store.settlement(settlement_id)?.into_inner())
    }

    pub fn settlement_for_intake(&self, intake_id: IntakeId) -> Result<Option<Settlement>, EngineError> {
        Ok(self
            .ctx
            .store
            .settlement_for_intake(intake_id)?
            .map(|read| read.into_inner()))
    }

    pub fn settlements_for_supplier(&self, supplier_id: SupplierId) -> Result<Vec<Settlement>, EngineError> {
        Ok(self.ctx.store.settlements_for_supplier(supplier_id)?)
    }

    /// Open balances of a supplier's partially paid settlements
    pub fn standing_receivables(&self, supplier_id: SupplierId) -> Result<Vec<StandingReceivable>, EngineError> {
        Ok(self
            .settlements_for_supplier(supplier_id)?
            .iter()
            .filter_map(Settlement::standing_receivable)
            .collect())
    }
}
