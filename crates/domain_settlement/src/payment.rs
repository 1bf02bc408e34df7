//! Payments recorded against a settlement

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AdvanceId, Money, PaymentId, SettlementId};

/// Where the money for a payment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentSource {
    /// Cash or transfer entered directly
    Direct,
    /// Drawn from a confirmed supplier advance
    Advance(AdvanceId),
}

impl PaymentSource {
    pub fn advance_id(&self) -> Option<AdvanceId> {
        match self {
            PaymentSource::Direct => None,
            PaymentSource::Advance(id) => Some(*id),
        }
    }
}

/// One contribution toward a settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub settlement_id: SettlementId,
    pub amount: Money,
    pub source: PaymentSource,
    pub recorded_at: DateTime<Utc>,
}

impl Payment {
    pub(crate) fn new(
        settlement_id: SettlementId,
        amount: Money,
        source: PaymentSource,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PaymentId::new_v7(),
            settlement_id,
            amount,
            source,
            recorded_at,
        }
    }
}
