//! Ledger Engine - supplier credit and settlement application layer
//!
//! Ties the domain crates to a persistence port and an injected clock:
//!
//! - [`AdvanceLedger`]: reserve, confirm, cancel and draw supplier advances
//! - [`IntakeRegistry`]: register and price intakes, drive their quality status
//! - [`SettlementLedger`]: open settlements, apply direct and advance payments
//! - [`FulfillmentTracker`]: release stock and follow deliveries
//!
//! Every mutating operation returns the updated snapshot. Operations spanning
//! several entities commit them in one unit of work and report failures as
//! [`EngineError::Aborted`] naming the failed step.
//!
//! # Example
//!
//! ```rust,ignore
//! use ledger_engine::{EngineConfig, LedgerEngine};
//!
//! let engine = LedgerEngine::in_memory(EngineConfig::from_env()?)?;
//! let advance = engine.advances().reserve(supplier_id, amount, validity)?;
//! engine.advances().confirm(advance.id(), amount)?;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod services;
pub mod store;
pub mod telemetry;

use std::sync::Arc;

use core_kernel::{Clock, SupplierId, SystemClock};
use domain_credit::{EligibilityPolicy, PendingThresholdPolicy};

pub use config::EngineConfig;
pub use context::EngineContext;
pub use error::{EngineError, Step};
pub use services::{AdvanceLedger, FulfillmentTracker, IntakeRegistry, SettlementLedger, SupplierStatement};
pub use store::{InMemoryLedgerStore, LedgerStore, UnitOfWork, Version, Versioned};

/// The four ledger services over one store, clock and policy
#[derive(Clone)]
pub struct LedgerEngine {
    ctx: Arc<EngineContext>,
    advances: AdvanceLedger,
    intakes: IntakeRegistry,
    settlements: SettlementLedger,
    fulfillment: FulfillmentTracker,
}

impl LedgerEngine {
    /// Builds an engine using the pending-threshold eligibility policy
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn LedgerStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EngineError> {
        config.check()?;
        let policy = PendingThresholdPolicy::new(config.pending_threshold()?);
        Self::with_policy(config, store, clock, Arc::new(policy))
    }

    /// Builds an engine with a custom eligibility policy
    pub fn with_policy(
        config: EngineConfig,
        store: Arc<dyn LedgerStore>,
        clock: Arc<dyn Clock>,
        policy: Arc<dyn EligibilityPolicy>,
    ) -> Result<Self, EngineError> {
        config.check()?;
        let ctx = Arc::new(EngineContext::new(config, store, clock, policy));
        let advances = AdvanceLedger::new(Arc::clone(&ctx));

        tracing::info!(
            currency = %ctx.config().currency,
            validity_unit = %ctx.config().advance_validity_unit,
            max_commit_retries = ctx.config().max_commit_retries,
            "Ledger engine ready"
        );

        Ok(Self {
            intakes: IntakeRegistry::new(Arc::clone(&ctx), advances.clone()),
            settlements: SettlementLedger::new(Arc::clone(&ctx)),
            fulfillment: FulfillmentTracker::new(Arc::clone(&ctx)),
            advances,
            ctx,
        })
    }

    /// An engine over a fresh in-memory store and the system clock
    pub fn in_memory(config: EngineConfig) -> Result<Self, EngineError> {
        Self::new(config, Arc::new(InMemoryLedgerStore::new()), Arc::new(SystemClock))
    }

    pub fn advances(&self) -> &AdvanceLedger {
        &self.advances
    }

    pub fn intakes(&self) -> &IntakeRegistry {
        &self.intakes
    }

    pub fn settlements(&self) -> &SettlementLedger {
        &self.settlements
    }

    pub fn fulfillment(&self) -> &FulfillmentTracker {
        &self.fulfillment
    }

    pub fn config(&self) -> &EngineConfig {
        self.ctx.config()
    }

    /// Current exposure, eligibility and outstanding receivables of a supplier
    pub fn supplier_statement(&self, supplier_id: SupplierId) -> Result<SupplierStatement, EngineError> {
        SupplierStatement::build(
            supplier_id,
            &self.advances,
            &self.settlements,
            self.ctx.policy.as_ref(),
        )
    }
}
