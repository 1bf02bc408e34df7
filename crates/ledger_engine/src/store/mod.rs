//! Ledger persistence port
//!
//! Reads hand out owned snapshots tagged with a version. Services mutate the
//! snapshots and stage them in a [`UnitOfWork`]; [`LedgerStore::commit`]
//! applies the whole unit or nothing. An update whose expected version no
//! longer matches fails the commit with [`PortError::Conflict`].

mod memory;

pub use memory::InMemoryLedgerStore;

use core_kernel::{
    AdvanceId, DeliveryId, DomainPort, IntakeId, PortError, SettlementId, SupplierId,
};
use domain_credit::SupplierAdvance;
use domain_fulfillment::Delivery;
use domain_intake::Intake;
use domain_settlement::Settlement;

/// Monotonic per-entity version, starting at 1 on insert
pub type Version = u64;

/// An entity snapshot and the version it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: Version,
}

impl<T> Versioned<T> {
    pub fn new(value: T, version: Version) -> Self {
        Self { value, version }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// A staged write
#[derive(Debug, Clone)]
pub enum Staged<T> {
    /// The entity must not exist yet
    Insert(T),
    /// The stored version must still be `expected`
    Update { value: T, expected: Version },
}

impl<T> Staged<T> {
    pub fn value(&self) -> &T {
        match self {
            Staged::Insert(value) => value,
            Staged::Update { value, .. } => value,
        }
    }
}

/// Entities the store keeps, keyed by their identifier
pub trait Keyed {
    type Key: Copy + Eq + std::hash::Hash + std::fmt::Display + std::fmt::Debug;
    const ENTITY: &'static str;

    fn key(&self) -> Self::Key;
}

impl Keyed for SupplierAdvance {
    type Key = AdvanceId;
    const ENTITY: &'static str = "SupplierAdvance";

    fn key(&self) -> AdvanceId {
        self.id()
    }
}

impl Keyed for Intake {
    type Key = IntakeId;
    const ENTITY: &'static str = "Intake";

    fn key(&self) -> IntakeId {
        self.id()
    }
}

impl Keyed for Settlement {
    type Key = SettlementId;
    const ENTITY: &'static str = "Settlement";

    fn key(&self) -> SettlementId {
        self.id()
    }
}

impl Keyed for Delivery {
    type Key = DeliveryId;
    const ENTITY: &'static str = "Delivery";

    fn key(&self) -> DeliveryId {
        self.id
    }
}

/// Writes to be committed together
#[derive(Debug, Clone, Default)]
pub struct UnitOfWork {
    pub(crate) advances: Vec<Staged<SupplierAdvance>>,
    pub(crate) intakes: Vec<Staged<Intake>>,
    pub(crate) settlements: Vec<Staged<Settlement>>,
    pub(crate) deliveries: Vec<Staged<Delivery>>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_advance(&mut self, advance: SupplierAdvance) -> &mut Self {
        self.advances.push(Staged::Insert(advance));
        self
    }

    pub fn update_advance(&mut self, advance: SupplierAdvance, expected: Version) -> &mut Self {
        self.advances.push(Staged::Update { value: advance, expected });
        self
    }

    pub fn insert_intake(&mut self, intake: Intake) -> &mut Self {
        self.intakes.push(Staged::Insert(intake));
        self
    }

    pub fn update_intake(&mut self, intake: Intake, expected: Version) -> &mut Self {
        self.intakes.push(Staged::Update { value: intake, expected });
        self
    }

    pub fn insert_settlement(&mut self, settlement: Settlement) -> &mut Self {
        self.settlements.push(Staged::Insert(settlement));
        self
    }

    pub fn update_settlement(&mut self, settlement: Settlement, expected: Version) -> &mut Self {
        self.settlements.push(Staged::Update { value: settlement, expected });
        self
    }

    pub fn insert_delivery(&mut self, delivery: Delivery) -> &mut Self {
        self.deliveries.push(Staged::Insert(delivery));
        self
    }

    pub fn update_delivery(&mut self, delivery: Delivery, expected: Version) -> &mut Self {
        self.deliveries.push(Staged::Update { value: delivery, expected });
        self
    }

    /// Number of staged writes
    pub fn len(&self) -> usize {
        self.advances.len() + self.intakes.len() + self.settlements.len() + self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Persistence port for the ledger
///
/// Implementations must make `commit` atomic: every staged expectation is
/// checked before anything is written.
pub trait LedgerStore: DomainPort {
    fn advance(&self, id: AdvanceId) -> Result<Versioned<SupplierAdvance>, PortError>;

    /// All advances of a supplier, oldest first
    fn advances_for_supplier(&self, supplier_id: SupplierId) -> Result<Vec<SupplierAdvance>, PortError>;

    fn intake(&self, id: IntakeId) -> Result<Versioned<Intake>, PortError>;

    /// All intakes of a supplier, oldest first
    fn intakes_for_supplier(&self, supplier_id: SupplierId) -> Result<Vec<Intake>, PortError>;

    fn settlement(&self, id: SettlementId) -> Result<Versioned<Settlement>, PortError>;

    /// The settlement opened for an intake, if any
    fn settlement_for_intake(&self, intake_id: IntakeId) -> Result<Option<Versioned<Settlement>>, PortError>;

    /// All settlements of a supplier, oldest first
    fn settlements_for_supplier(&self, supplier_id: SupplierId) -> Result<Vec<Settlement>, PortError>;

    fn delivery(&self, id: DeliveryId) -> Result<Versioned<Delivery>, PortError>;

    /// All deliveries released from an intake, in release order
    fn deliveries_for_intake(&self, intake_id: IntakeId) -> Result<Vec<Delivery>, PortError>;

    /// Applies every staged write, or none
    fn commit(&self, unit: UnitOfWork) -> Result<(), PortError>;
}
