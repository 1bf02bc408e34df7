//! Supplier statement
//!
//! The authoritative per-supplier snapshot: advance exposure plus the open
//! balances of partially paid settlements, computed from stored state on
//! request rather than cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, SupplierId};
use domain_credit::{Eligibility, SupplierExposure};
use domain_settlement::{total_open_balance, StandingReceivable};

use crate::error::EngineError;
use crate::services::{AdvanceLedger, SettlementLedger};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierStatement {
    pub supplier_id: SupplierId,
    pub exposure: SupplierExposure,
    pub eligibility: Eligibility,
    pub receivables: Vec<StandingReceivable>,
    /// Sum of the receivables' open balances
    pub total_outstanding: Money,
    pub generated_at: DateTime<Utc>,
}

impl SupplierStatement {
    pub(crate) fn build(
        supplier_id: SupplierId,
        advances: &AdvanceLedger,
        settlements: &SettlementLedger,
        policy: &dyn domain_credit::EligibilityPolicy,
    ) -> Result<Self, EngineError> {
        let exposure = advances.exposure(supplier_id)?;
        let receivables = settlements.standing_receivables(supplier_id)?;
        let total_outstanding = total_open_balance(exposure.pending_total.currency(), &receivables)?;

        Ok(Self {
            supplier_id,
            eligibility: policy.evaluate(&exposure),
            generated_at: exposure.computed_at,
            exposure,
            receivables,
            total_outstanding,
        })
    }
}
