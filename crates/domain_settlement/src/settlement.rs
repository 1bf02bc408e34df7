//! Settlement of one intake's debt
//!
//! A settlement is opened for an accepted intake with `amount_due` equal to the
//! intake's frozen debt. Payments accumulate until `amount_paid` reaches
//! `amount_due`; nothing may push it past.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{IntakeId, Money, SettlementId, SupplierId};
use domain_credit::SupplierAdvance;
use domain_intake::{Intake, SettlementStage};
use crate::error::SettlementError;
use crate::payment::{Payment, PaymentSource};
use crate::receivable::StandingReceivable;

/// Payment status of a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl From<SettlementStatus> for SettlementStage {
    fn from(status: SettlementStatus) -> Self {
        match status {
            SettlementStatus::Unpaid => SettlementStage::AwaitingSettlement,
            SettlementStatus::PartiallyPaid => SettlementStage::PartiallyPaid,
            SettlementStatus::Paid => SettlementStage::Paid,
        }
    }
}

/// Payment state attached to one intake
///
/// # Invariants
///
/// - `amount_paid <= amount_due`
/// - `amount_paid` equals the sum of `payments`
/// - `status == Paid` exactly when `amount_paid == amount_due`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    id: SettlementId,
    intake_id: IntakeId,
    supplier_id: SupplierId,
    amount_due: Money,
    amount_paid: Money,
    status: SettlementStatus,
    payments: Vec<Payment>,
    opened_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Settlement {
    /// Opens a settlement for an accepted intake
    ///
    /// A zero-debt intake is settled immediately with no payments.
    pub fn open(intake: &Intake, now: DateTime<Utc>) -> Result<Self, SettlementError> {
        intake.require_accepted()?;

        let amount_due = intake.total_debt();
        let mut settlement = Self {
            id: SettlementId::new_v7(),
            intake_id: intake.id(),
            supplier_id: intake.supplier_id(),
            amount_due,
            amount_paid: Money::zero(amount_due.currency()),
            status: SettlementStatus::Unpaid,
            payments: Vec::new(),
            opened_at: now,
            updated_at: now,
        };
        settlement.recompute_status();
        Ok(settlement)
    }

    /// Applies a direct payment
    pub fn apply_direct(&mut self, amount: Money, now: DateTime<Utc>) -> Result<&Payment, SettlementError> {
        self.check_payable(&amount)?;
        self.record(amount, PaymentSource::Direct, now)
    }

    /// Applies a payment drawn from a supplier advance
    ///
    /// The supplier and overpayment checks run before the draw, and the
    /// payment is recorded only after the draw succeeded, so on error neither
    /// the settlement nor the advance has changed.
    pub fn apply_from_advance(
        &mut self,
        advance: &mut SupplierAdvance,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<&Payment, SettlementError> {
        if advance.supplier_id() != self.supplier_id {
            return Err(SettlementError::SupplierMismatch {
                advance_id: advance.id(),
                advance_supplier: advance.supplier_id(),
                intake_supplier: self.supplier_id,
            });
        }
        self.check_payable(&amount)?;

        advance.draw(amount)?;
        self.record(amount, PaymentSource::Advance(advance.id()), now)
    }

    /// Debt not yet paid
    pub fn open_balance(&self) -> Money {
        self.amount_due
            .checked_sub(&self.amount_paid)
            .unwrap_or_else(|_| Money::zero(self.amount_due.currency()))
    }

    /// The open balance as a standing receivable, if partially paid
    pub fn standing_receivable(&self) -> Option<StandingReceivable> {
        if self.status != SettlementStatus::PartiallyPaid {
            return None;
        }
        let since = self
            .payments
            .last()
            .map(|p| p.recorded_at)
            .unwrap_or(self.opened_at);
        Some(StandingReceivable {
            settlement_id: self.id,
            intake_id: self.intake_id,
            supplier_id: self.supplier_id,
            amount_due: self.amount_due,
            amount_paid: self.amount_paid,
            open_balance: self.open_balance(),
            since,
        })
    }

    pub fn id(&self) -> SettlementId {
        self.id
    }

    pub fn intake_id(&self) -> IntakeId {
        self.intake_id
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    pub fn amount_due(&self) -> Money {
        self.amount_due
    }

    pub fn amount_paid(&self) -> Money {
        self.amount_paid
    }

    pub fn status(&self) -> SettlementStatus {
        self.status
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn check_payable(&self, amount: &Money) -> Result<(), SettlementError> {
        if amount.is_zero() {
            return Err(SettlementError::InvalidAmount {
                amount: amount.amount(),
            });
        }
        let outstanding = self.open_balance();
        if amount.exceeds(&outstanding)? {
            return Err(SettlementError::Overpayment {
                settlement_id: self.id,
                attempted: amount.amount(),
                outstanding: outstanding.amount(),
            });
        }
        Ok(())
    }

    fn record(
        &mut self,
        amount: Money,
        source: PaymentSource,
        now: DateTime<Utc>,
    ) -> Result<&Payment, SettlementError> {
        self.amount_paid = self.amount_paid.checked_add(&amount)?;
        self.payments.push(Payment::new(self.id, amount, source, now));
        self.updated_at = now;
        self.recompute_status();

        debug!(
            settlement_id = %self.id,
            amount = %amount,
            status = ?self.status,
            "Payment recorded"
        );

        let index = self.payments.len() - 1;
        Ok(&self.payments[index])
    }

    fn recompute_status(&mut self) {
        self.status = if self.amount_paid == self.amount_due {
            SettlementStatus::Paid
        } else if self.amount_paid.is_zero() {
            SettlementStatus::Unpaid
        } else {
            SettlementStatus::PartiallyPaid
        };
    }
}
