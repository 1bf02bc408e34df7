//! Standing receivables
//!
//! When a settlement is only partly paid, its open balance stays on the
//! supplier's account until the remaining payments arrive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, IntakeId, Money, MoneyError, SettlementId, SupplierId};

/// Open balance of a partially paid settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingReceivable {
    pub settlement_id: SettlementId,
    pub intake_id: IntakeId,
    pub supplier_id: SupplierId,
    pub amount_due: Money,
    pub amount_paid: Money,
    pub open_balance: Money,
    /// When the balance last changed
    pub since: DateTime<Utc>,
}

/// Sums the open balances of a set of receivables
pub fn total_open_balance(currency: Currency, receivables: &[StandingReceivable]) -> Result<Money, MoneyError> {
    Money::sum(currency, receivables.iter().map(|r| &r.open_balance))
}
