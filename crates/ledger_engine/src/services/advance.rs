//! Advance ledger service
//!
//! Persists the advance lifecycle of `domain_credit` and answers the
//! per-supplier questions built on it: exposure, overdue advances and intake
//! eligibility.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use core_kernel::{AdvanceId, Money, SupplierId, ValidityWindow};
use domain_credit::{AdvanceError, AdvanceStatus, Eligibility, SupplierAdvance, SupplierExposure};

use crate::context::EngineContext;
use crate::error::EngineError;

/// Reserves, confirms, cancels and draws supplier advances
#[derive(Clone)]
pub struct AdvanceLedger {
    ctx: Arc<EngineContext>,
}

impl AdvanceLedger {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    /// Converts an operator-entered validity value using the configured unit
    pub fn validity_from_raw(&self, value: i64) -> Result<ValidityWindow, EngineError> {
        Ok(ValidityWindow::from_raw(value, self.ctx.config.advance_validity_unit)?)
    }

    /// Reserves a new pending advance
    #[instrument(skip(self), fields(supplier_id = %supplier_id, amount = %amount))]
    pub fn reserve(
        &self,
        supplier_id: SupplierId,
        amount: Money,
        validity: ValidityWindow,
    ) -> Result<SupplierAdvance, EngineError> {
        self.ctx.ensure_amount(&amount)?;

        let advance = self.ctx.transact("reserve_advance", |unit, now| {
            let advance = SupplierAdvance::reserve(supplier_id, amount, validity, now)?;
            unit.insert_advance(advance.clone());
            Ok(advance)
        })?;

        info!(advance_id = %advance.id(), deadline = %advance.deadline(), "Advance reserved");
        Ok(advance)
    }

    /// Confirms a pending advance against the operator's re-keyed amount
    #[instrument(skip(self), fields(advance_id = %advance_id))]
    pub fn confirm(&self, advance_id: AdvanceId, reentered: Money) -> Result<SupplierAdvance, EngineError> {
        let advance = self
            .mutate("confirm_advance", advance_id, |advance, now| advance.confirm(reentered, now))
            .inspect_err(|e| warn!(error = %e, "Advance confirmation rejected"))?;

        info!(confirmed_amount = %advance.confirmed_amount(), "Advance confirmed");
        Ok(advance)
    }

    /// Cancels an advance nothing has been drawn from
    #[instrument(skip(self, reason), fields(advance_id = %advance_id))]
    pub fn cancel(&self, advance_id: AdvanceId, reason: &str) -> Result<SupplierAdvance, EngineError> {
        let advance = self
            .mutate("cancel_advance", advance_id, |advance, now| advance.cancel(reason, now))
            .inspect_err(|e| warn!(error = %e, "Advance cancellation rejected"))?;

        info!(reason = advance.cancellation_reason().unwrap_or_default(), "Advance cancelled");
        Ok(advance)
    }

    /// Draws from a confirmed advance outside any settlement
    ///
    /// Settlement payments draw through
    /// [`SettlementLedger::apply_payment`](crate::services::SettlementLedger::apply_payment)
    /// so the draw and the payment commit together.
    #[instrument(skip(self), fields(advance_id = %advance_id, amount = %amount))]
    pub fn draw(&self, advance_id: AdvanceId, amount: Money) -> Result<SupplierAdvance, EngineError> {
        self.ctx.ensure_amount(&amount)?;
        let advance = self
            .mutate("draw_advance", advance_id, |advance, _| advance.draw(amount))
            .inspect_err(|e| warn!(error = %e, "Advance draw rejected"))?;

        info!(remaining = %advance.amount_remaining(), "Advance drawn");
        Ok(advance)
    }

    pub fn get(&self, advance_id: AdvanceId) -> Result<SupplierAdvance, EngineError> {
        Ok(self.ctx.store.advance(advance_id)?.into_inner())
    }

    /// Whether a pending advance has outlived its validity window at `now`
    ///
    /// Advisory only; nothing changes state when this turns true.
    pub fn is_overdue(&self, advance_id: AdvanceId, now: DateTime<Utc>) -> Result<bool, EngineError> {
        Ok(self.get(advance_id)?.is_overdue(now))
    }

    /// Pending advances of a supplier past their window at the current time
    pub fn overdue_advances(&self, supplier_id: SupplierId) -> Result<Vec<SupplierAdvance>, EngineError> {
        let now = self.ctx.now();
        Ok(self
            .ctx
            .store
            .advances_for_supplier(supplier_id)?
            .into_iter()
            .filter(|a| a.is_overdue(now))
            .collect())
    }

    pub fn advances_for_supplier(&self, supplier_id: SupplierId) -> Result<Vec<SupplierAdvance>, EngineError> {
        Ok(self.ctx.store.advances_for_supplier(supplier_id)?)
    }

    /// Confirmed advances of a supplier with balance left to draw
    pub fn available_advances(&self, supplier_id: SupplierId) -> Result<Vec<SupplierAdvance>, EngineError> {
        Ok(self
            .advances_for_supplier(supplier_id)?
            .into_iter()
            .filter(|a| a.status() == AdvanceStatus::Confirmed && a.amount_remaining().is_positive())
            .collect())
    }

    /// Pending and confirmed-remaining totals of a supplier
    pub fn exposure(&self, supplier_id: SupplierId) -> Result<SupplierExposure, EngineError> {
        let advances = self.ctx.store.advances_for_supplier(supplier_id)?;
        Ok(SupplierExposure::compute(
            supplier_id,
            self.ctx.config.currency,
            &advances,
            self.ctx.now(),
        )?)
    }

    /// Eligibility verdict of the configured policy
    pub fn eligibility(&self, supplier_id: SupplierId) -> Result<Eligibility, EngineError> {
        let exposure = self.exposure(supplier_id)?;
        Ok(self.ctx.policy.evaluate(&exposure))
    }

    pub fn can_supplier_submit_intake(&self, supplier_id: SupplierId) -> Result<bool, EngineError> {
        Ok(self.eligibility(supplier_id)?.is_eligible())
    }

    fn mutate<F>(&self, operation: &'static str, advance_id: AdvanceId, mut change: F) -> Result<SupplierAdvance, EngineError>
    where
        F: FnMut(&mut SupplierAdvance, DateTime<Utc>) -> Result<(), AdvanceError>,
    {
        self.ctx.transact(operation, |unit, now| {
            let mut read = self.ctx.store.advance(advance_id)?;
            change(&mut read.value, now)?;
            unit.update_advance(read.value.clone(), read.version);
            Ok(read.value)
        })
    }
}
