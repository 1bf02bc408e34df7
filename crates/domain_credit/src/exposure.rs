//! Supplier exposure and intake eligibility
//!
//! The ledger does not decide who may deliver; it aggregates each supplier's
//! advances into a [`SupplierExposure`] and hands that to an
//! [`EligibilityPolicy`] supplied from configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{Currency, Money, MoneyError, SupplierId};
use crate::advance::{AdvanceStatus, SupplierAdvance};

/// Aggregate of a supplier's open advances at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierExposure {
    pub supplier_id: SupplierId,
    /// Sum of requested amounts still awaiting confirmation
    pub pending_total: Money,
    pub pending_count: usize,
    /// Pending advances past their validity window
    pub overdue_pending_count: usize,
    /// Sum of confirmed balances not yet drawn
    pub available_total: Money,
    pub computed_at: DateTime<Utc>,
}

impl SupplierExposure {
    /// Aggregates the supplier's advances
    ///
    /// Advances belonging to other suppliers are ignored; cancelled advances
    /// contribute nothing.
    pub fn compute<'a, I>(
        supplier_id: SupplierId,
        currency: Currency,
        advances: I,
        now: DateTime<Utc>,
    ) -> Result<Self, MoneyError>
    where
        I: IntoIterator<Item = &'a SupplierAdvance>,
    {
        let mut exposure = Self {
            supplier_id,
            pending_total: Money::zero(currency),
            pending_count: 0,
            overdue_pending_count: 0,
            available_total: Money::zero(currency),
            computed_at: now,
        };

        for advance in advances.into_iter().filter(|a| a.supplier_id() == supplier_id) {
            match advance.status() {
                AdvanceStatus::Pending => {
                    exposure.pending_total = exposure.pending_total.checked_add(&advance.requested_amount())?;
                    exposure.pending_count += 1;
                    if advance.is_overdue(now) {
                        exposure.overdue_pending_count += 1;
                    }
                }
                AdvanceStatus::Confirmed => {
                    exposure.available_total =
                        exposure.available_total.checked_add(&advance.amount_remaining())?;
                }
                AdvanceStatus::Cancelled => {}
            }
        }

        Ok(exposure)
    }
}

/// Outcome of an eligibility check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Eligibility {
    Eligible,
    Blocked { reason: String },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// Policy deciding whether a supplier may register a new intake
pub trait EligibilityPolicy: Send + Sync {
    fn evaluate(&self, exposure: &SupplierExposure) -> Eligibility;
}

/// Blocks suppliers whose pending (unconfirmed) advances exceed a threshold
///
/// A zero threshold blocks any supplier holding a pending advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingThresholdPolicy {
    threshold: Money,
}

impl PendingThresholdPolicy {
    pub fn new(threshold: Money) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Money {
        self.threshold
    }
}

impl EligibilityPolicy for PendingThresholdPolicy {
    fn evaluate(&self, exposure: &SupplierExposure) -> Eligibility {
        match exposure.pending_total.exceeds(&self.threshold) {
            Ok(false) => Eligibility::Eligible,
            Ok(true) => {
                debug!(
                    supplier_id = %exposure.supplier_id,
                    pending_total = %exposure.pending_total,
                    threshold = %self.threshold,
                    "Supplier blocked by pending advances"
                );
                Eligibility::Blocked {
                    reason: format!(
                        "{} pending advance(s) totalling {} exceed the threshold of {}",
                        exposure.pending_count, exposure.pending_total, self.threshold
                    ),
                }
            }
            Err(e) => Eligibility::Blocked {
                reason: format!("exposure cannot be compared with the threshold: {}", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::ValidityWindow;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn xof(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::XOF).unwrap()
    }

    #[test]
    fn test_exposure_splits_pending_and_available() {
        let supplier = SupplierId::new();
        let window = ValidityWindow::hours(1).unwrap();
        let pending = SupplierAdvance::reserve(supplier, xof(dec!(100)), window, now()).unwrap();
        let mut confirmed = SupplierAdvance::reserve(supplier, xof(dec!(300)), window, now()).unwrap();
        confirmed.confirm(xof(dec!(300)), now()).unwrap();
        confirmed.draw(xof(dec!(50))).unwrap();
        let other = SupplierAdvance::reserve(SupplierId::new(), xof(dec!(999)), window, now()).unwrap();

        let exposure = SupplierExposure::compute(
            supplier,
            Currency::XOF,
            [&pending, &confirmed, &other],
            now(),
        )
        .unwrap();

        assert_eq!(exposure.pending_total, xof(dec!(100)));
        assert_eq!(exposure.pending_count, 1);
        assert_eq!(exposure.available_total, xof(dec!(250)));
    }

    #[test]
    fn test_zero_threshold_blocks_any_pending() {
        let policy = PendingThresholdPolicy::new(Money::zero(Currency::XOF));
        let mut exposure = SupplierExposure {
            supplier_id: SupplierId::new(),
            pending_total: Money::zero(Currency::XOF),
            pending_count: 0,
            overdue_pending_count: 0,
            available_total: Money::zero(Currency::XOF),
            computed_at: now(),
        };
        assert!(policy.evaluate(&exposure).is_eligible());

        exposure.pending_total = xof(dec!(1));
        exposure.pending_count = 1;
        assert!(!policy.evaluate(&exposure).is_eligible());
    }
}
