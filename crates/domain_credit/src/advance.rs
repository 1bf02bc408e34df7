//! Supplier cash advances
//!
//! An advance reserves company cash in favour of a supplier. It is created
//! `Pending`, becomes usable once an operator confirms it by re-keying the
//! amount, and is then drawn down by settlements.
//!
//! ```text
//! Pending ──confirm──> Confirmed ──draw*──> (remaining shrinks)
//!    │                     │
//!    └──cancel──┐  ┌──cancel (nothing drawn)
//!               ▼  ▼
//!             Cancelled
//! ```
//!
//! Nothing here transitions on its own. An overdue pending advance stays
//! pending until someone confirms or cancels it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AdvanceId, Money, SupplierId, ValidityWindow};
use crate::error::AdvanceError;

/// Advance lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvanceStatus {
    /// Reserved, waiting for confirmation
    Pending,
    /// Cash released, available for draws
    Confirmed,
    /// Reservation voided (terminal)
    Cancelled,
}

/// A reservation of company cash redeemable against future intake debt
///
/// # Invariants
///
/// - `amount_used <= confirmed_amount`
/// - `confirmed_amount` is zero until confirmation, then equals `requested_amount`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierAdvance {
    id: AdvanceId,
    supplier_id: SupplierId,
    requested_amount: Money,
    confirmed_amount: Money,
    amount_used: Money,
    created_at: DateTime<Utc>,
    validity: ValidityWindow,
    status: AdvanceStatus,
    confirmed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    cancellation_reason: Option<String>,
}

impl SupplierAdvance {
    /// Reserves a new pending advance
    ///
    /// # Errors
    ///
    /// `InvalidAmount` if `amount` is zero.
    pub fn reserve(
        supplier_id: SupplierId,
        amount: Money,
        validity: ValidityWindow,
        now: DateTime<Utc>,
    ) -> Result<Self, AdvanceError> {
        if amount.is_zero() {
            return Err(AdvanceError::InvalidAmount {
                amount: amount.amount(),
            });
        }

        let currency = amount.currency();
        Ok(Self {
            id: AdvanceId::new_v7(),
            supplier_id,
            requested_amount: amount,
            confirmed_amount: Money::zero(currency),
            amount_used: Money::zero(currency),
            created_at: now,
            validity,
            status: AdvanceStatus::Pending,
            confirmed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
        })
    }

    /// Confirms the advance by re-entering the requested amount
    ///
    /// The re-entered amount is a transcription check: it must match the
    /// requested amount exactly.
    pub fn confirm(&mut self, reentered: Money, now: DateTime<Utc>) -> Result<(), AdvanceError> {
        self.require_status(AdvanceStatus::Pending, "confirm")?;

        if reentered.currency() != self.requested_amount.currency()
            || reentered.amount() != self.requested_amount.amount()
        {
            return Err(AdvanceError::AmountMismatch {
                advance_id: self.id,
                requested: self.requested_amount.amount(),
                reentered: reentered.amount(),
            });
        }

        self.confirmed_amount = self.requested_amount;
        self.status = AdvanceStatus::Confirmed;
        self.confirmed_at = Some(now);
        Ok(())
    }

    /// Cancels the advance
    ///
    /// Allowed from `Pending`, or from `Confirmed` while nothing has been drawn.
    pub fn cancel(&mut self, reason: &str, now: DateTime<Utc>) -> Result<(), AdvanceError> {
        if self.status == AdvanceStatus::Cancelled {
            return Err(self.invalid_state("cancel"));
        }
        if !self.amount_used.is_zero() {
            return Err(AdvanceError::AdvanceInUse {
                advance_id: self.id,
                amount_used: self.amount_used.amount(),
            });
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AdvanceError::MissingReason { advance_id: self.id });
        }

        self.status = AdvanceStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.cancellation_reason = Some(reason.to_string());
        Ok(())
    }

    /// Consumes part of the remaining balance
    pub fn draw(&mut self, amount: Money) -> Result<(), AdvanceError> {
        self.require_status(AdvanceStatus::Confirmed, "draw from")?;

        if amount.is_zero() {
            return Err(AdvanceError::InvalidAmount {
                amount: amount.amount(),
            });
        }

        let remaining = self.amount_remaining();
        if amount.exceeds(&remaining)? {
            return Err(AdvanceError::InsufficientBalance {
                advance_id: self.id,
                requested: amount.amount(),
                remaining: remaining.amount(),
            });
        }

        self.amount_used = self.amount_used.checked_add(&amount)?;
        Ok(())
    }

    /// True while pending past its validity window
    ///
    /// Advisory only: an overdue advance is never transitioned automatically.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == AdvanceStatus::Pending && now > self.deadline()
    }

    /// Instant at which the validity window elapses
    pub fn deadline(&self) -> DateTime<Utc> {
        self.validity.deadline_from(self.created_at)
    }

    /// Confirmed amount not yet drawn (zero unless confirmed)
    pub fn amount_remaining(&self) -> Money {
        // amount_used never exceeds confirmed_amount, so this cannot underflow
        self.confirmed_amount
            .checked_sub(&self.amount_used)
            .unwrap_or_else(|_| Money::zero(self.confirmed_amount.currency()))
    }

    pub fn id(&self) -> AdvanceId {
        self.id
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    pub fn requested_amount(&self) -> Money {
        self.requested_amount
    }

    pub fn confirmed_amount(&self) -> Money {
        self.confirmed_amount
    }

    pub fn amount_used(&self) -> Money {
        self.amount_used
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn validity(&self) -> ValidityWindow {
        self.validity
    }

    pub fn status(&self) -> AdvanceStatus {
        self.status
    }

    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        self.confirmed_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    fn require_status(&self, expected: AdvanceStatus, operation: &'static str) -> Result<(), AdvanceError> {
        if self.status != expected {
            return Err(self.invalid_state(operation));
        }
        Ok(())
    }

    fn invalid_state(&self, operation: &'static str) -> AdvanceError {
        AdvanceError::InvalidState {
            advance_id: self.id,
            status: self.status,
            operation,
        }
    }
}
