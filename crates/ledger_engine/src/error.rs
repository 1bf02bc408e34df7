//! Engine errors
//!
//! Single-entity operations surface the domain error directly. Operations that
//! commit several entities together wrap any failure in
//! [`EngineError::Aborted`], naming the step that failed; nothing was written
//! in that case. [`EngineError::kind`] always reports the root cause.

use std::fmt;
use thiserror::Error;

use core_kernel::{CoreError, ErrorKind, IntakeId, MoneyError, PortError, SettlementId, SupplierId, TemporalError};
use domain_credit::AdvanceError;
use domain_fulfillment::FulfillmentError;
use domain_intake::IntakeError;
use domain_settlement::SettlementError;

/// Sub-step of a multi-entity operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    LoadSettlement,
    LoadAdvance,
    LoadIntake,
    VerifySupplier,
    DrawAdvance,
    RecordPayment,
    UpdateIntake,
    RecordDelivery,
    Commit,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::LoadSettlement => "load_settlement",
            Step::LoadAdvance => "load_advance",
            Step::LoadIntake => "load_intake",
            Step::VerifySupplier => "verify_supplier",
            Step::DrawAdvance => "draw_advance",
            Step::RecordPayment => "record_payment",
            Step::UpdateIntake => "update_intake",
            Step::RecordDelivery => "record_delivery",
            Step::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// Errors returned by the ledger engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Advance(#[from] AdvanceError),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error(transparent)]
    Fulfillment(#[from] FulfillmentError),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Temporal(#[from] TemporalError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    #[error("Supplier {supplier_id} may not register an intake: {reason}")]
    IneligibleSupplier { supplier_id: SupplierId, reason: String },

    #[error("Intake {intake_id} already has settlement {settlement_id}")]
    SettlementExists {
        intake_id: IntakeId,
        settlement_id: SettlementId,
    },

    #[error("Store error: {0}")]
    Store(#[source] PortError),

    #[error("{operation} aborted at {step}: {source}")]
    Aborted {
        operation: &'static str,
        step: Step,
        #[source]
        source: Box<EngineError>,
    },
}

impl From<PortError> for EngineError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => EngineError::NotFound {
                entity: entity_type,
                id,
            },
            other => EngineError::Store(other),
        }
    }
}

impl EngineError {
    /// The error kind of the root cause
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Advance(e) => e.kind(),
            EngineError::Intake(e) => e.kind(),
            EngineError::Settlement(e) => e.kind(),
            EngineError::Fulfillment(e) => e.kind(),
            EngineError::Money(_) | EngineError::Temporal(_) => ErrorKind::InvalidInput,
            EngineError::Core(e) => e.kind(),
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::IneligibleSupplier { .. } => ErrorKind::IneligibleSupplier,
            EngineError::SettlementExists { .. } => ErrorKind::InvalidState,
            EngineError::Store(e) => e.kind(),
            EngineError::Aborted { source, .. } => source.kind(),
        }
    }

    /// The failed step, for aborted multi-entity operations
    pub fn step(&self) -> Option<Step> {
        match self {
            EngineError::Aborted { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// The innermost error
    pub fn root(&self) -> &EngineError {
        match self {
            EngineError::Aborted { source, .. } => source.root(),
            other => other,
        }
    }

    /// True for version conflicts, which the engine retries
    pub(crate) fn is_conflict(&self) -> bool {
        matches!(self.root(), EngineError::Store(e) if e.is_conflict())
    }

    pub(crate) fn aborted(operation: &'static str, step: Step, source: EngineError) -> Self {
        match source {
            already @ EngineError::Aborted { .. } => already,
            source => EngineError::Aborted {
                operation,
                step,
                source: Box::new(source),
            },
        }
    }
}

/// Tags a failure inside a multi-entity operation with its step
pub(crate) trait AtStep<T> {
    fn at_step(self, operation: &'static str, step: Step) -> Result<T, EngineError>;
}

impl<T, E> AtStep<T> for Result<T, E>
where
    E: Into<EngineError>,
{
    fn at_step(self, operation: &'static str, step: Step) -> Result<T, EngineError> {
        self.map_err(|e| EngineError::aborted(operation, step, e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::AdvanceId;
    use rust_decimal_macros::dec;

    #[test]
    fn test_aborted_reports_root_kind() {
        let inner = EngineError::from(AdvanceError::InsufficientBalance {
            advance_id: AdvanceId::new(),
            requested: dec!(400000),
            remaining: dec!(300000),
        });
        let err = EngineError::aborted("apply_payment", Step::DrawAdvance, inner);

        assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
        assert_eq!(err.step(), Some(Step::DrawAdvance));
        assert!(err.to_string().contains("draw_advance"));
    }

    #[test]
    fn test_aborted_is_not_nested() {
        let inner = EngineError::aborted(
            "apply_payment",
            Step::LoadAdvance,
            EngineError::from(PortError::not_found("SupplierAdvance", "ADV-x")),
        );
        let outer = EngineError::aborted("apply_payment", Step::Commit, inner);
        assert_eq!(outer.step(), Some(Step::LoadAdvance));
        assert_eq!(outer.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_conflict_detected_through_abort() {
        let err = EngineError::aborted(
            "release_net",
            Step::Commit,
            EngineError::from(PortError::conflict("stale intake")),
        );
        assert!(err.is_conflict());
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}
