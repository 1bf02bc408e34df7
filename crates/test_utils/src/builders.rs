//! Test Data Builders
//!
//! Builders let tests state only what matters to them. [`TestEngine`] wires a
//! [`LedgerEngine`] to an in-memory store and a manual clock.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use core_kernel::{ManualClock, Money, SupplierId, ValidityWindow};
use domain_credit::SupplierAdvance;
use domain_intake::{Intake, IntakeStatus, Measurements};
use ledger_engine::{EngineConfig, InMemoryLedgerStore, LedgerEngine};

use crate::fixtures::{MeasurementFixtures, MoneyFixtures, TemporalFixtures};

/// Builder for supplier advances
pub struct AdvanceBuilder {
    supplier_id: SupplierId,
    amount: Money,
    validity: ValidityWindow,
    created_at: DateTime<Utc>,
    confirmed: bool,
    drawn: Option<Money>,
}

impl Default for AdvanceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvanceBuilder {
    pub fn new() -> Self {
        Self {
            supplier_id: SupplierId::new(),
            amount: MoneyFixtures::advance_500k(),
            validity: TemporalFixtures::two_hours(),
            created_at: TemporalFixtures::collection_day(),
            confirmed: false,
            drawn: None,
        }
    }

    pub fn for_supplier(mut self, supplier_id: SupplierId) -> Self {
        self.supplier_id = supplier_id;
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_validity(mut self, validity: ValidityWindow) -> Self {
        self.validity = validity;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    /// Confirms the advance with the correct re-keyed amount
    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }

    /// Confirms the advance and draws `amount` from it
    pub fn drawn(mut self, amount: Money) -> Self {
        self.confirmed = true;
        self.drawn = Some(amount);
        self
    }

    pub fn build(self) -> SupplierAdvance {
        let mut advance = SupplierAdvance::reserve(self.supplier_id, self.amount, self.validity, self.created_at)
            .expect("builder advance amount must be positive");
        if self.confirmed {
            advance
                .confirm(self.amount, self.created_at)
                .expect("builder advance confirms");
        }
        if let Some(drawn) = self.drawn {
            advance.draw(drawn).expect("builder draw fits the advance");
        }
        advance
    }
}

/// Builder for intakes in a chosen quality status
pub struct IntakeBuilder {
    supplier_id: SupplierId,
    measurements: Measurements,
    registered_at: DateTime<Utc>,
    status: IntakeStatus,
}

impl Default for IntakeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeBuilder {
    pub fn new() -> Self {
        Self {
            supplier_id: SupplierId::new(),
            measurements: MeasurementFixtures::scenario_a(),
            registered_at: TemporalFixtures::collection_day(),
            status: IntakeStatus::Intaken,
        }
    }

    pub fn for_supplier(mut self, supplier_id: SupplierId) -> Self {
        self.supplier_id = supplier_id;
        self
    }

    pub fn with_measurements(mut self, measurements: Measurements) -> Self {
        self.measurements = measurements;
        self
    }

    /// Drives the intake to `status` through its legal transitions
    pub fn in_status(mut self, status: IntakeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn accepted(self) -> Self {
        self.in_status(IntakeStatus::Accepted)
    }

    pub fn build(self) -> Intake {
        let at = self.registered_at;
        let mut intake = Intake::register(self.supplier_id, self.measurements, at)
            .expect("builder measurements must price");

        if self.status != IntakeStatus::Intaken {
            intake.record_test(at).expect("fresh intake can be tested");
        }
        match self.status {
            IntakeStatus::Intaken | IntakeStatus::Tested => {}
            IntakeStatus::Accepted => intake.accept(at).expect("tested intake can be accepted"),
            IntakeStatus::Rejected => intake.reject(at).expect("tested intake can be rejected"),
            IntakeStatus::NeedsRework => intake
                .request_rework(at)
                .expect("tested intake can be sent back"),
        }
        intake
    }
}

/// A ledger engine over an in-memory store and a manual clock
pub struct TestEngine {
    pub engine: LedgerEngine,
    pub clock: Arc<ManualClock>,
    pub store: Arc<InMemoryLedgerStore>,
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEngine {
    /// Engine with the default configuration, clock at the collection day
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        crate::init_test_tracing();
        let clock = Arc::new(ManualClock::starting_at(TemporalFixtures::collection_day()));
        let store = Arc::new(InMemoryLedgerStore::new());
        let engine = LedgerEngine::new(config, store.clone(), clock.clone()).expect("test config is valid");
        Self { engine, clock, store }
    }

    pub fn now(&self) -> DateTime<Utc> {
        use core_kernel::Clock;
        self.clock.now()
    }

    pub fn advance_clock(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// Registers, tests and accepts an intake
    pub fn accepted_intake(&self, supplier_id: SupplierId, measurements: Measurements) -> Intake {
        let intakes = self.engine.intakes();
        let intake = intakes.register(supplier_id, measurements).expect("intake registers");
        intakes.record_test(intake.id()).expect("intake tests");
        intakes.accept(intake.id()).expect("intake accepts")
    }

    /// Reserves and confirms an advance
    pub fn confirmed_advance(&self, supplier_id: SupplierId, amount: Money) -> SupplierAdvance {
        let advances = self.engine.advances();
        let advance = advances
            .reserve(supplier_id, amount, TemporalFixtures::two_hours())
            .expect("advance reserves");
        advances.confirm(advance.id(), amount).expect("advance confirms")
    }
}
