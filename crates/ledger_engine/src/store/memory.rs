//! In-memory ledger store
//!
//! Every table sits behind one lock, so a commit is a single critical section:
//! expectations are checked against the current rows and the writes applied
//! before any other reader or writer gets in. Used by tests and by embedders
//! that keep the ledger in process.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use core_kernel::{
    AdvanceId, DeliveryId, DomainPort, IntakeId, PortError, SettlementId, SupplierId,
};
use domain_credit::SupplierAdvance;
use domain_fulfillment::Delivery;
use domain_intake::Intake;
use domain_settlement::Settlement;

use super::{Keyed, LedgerStore, Staged, UnitOfWork, Version, Versioned};

#[derive(Debug)]
struct Row<T> {
    /// Insertion order, for stable listings
    seq: u64,
    entry: Versioned<T>,
}

#[derive(Debug)]
struct Table<T: Keyed> {
    rows: HashMap<T::Key, Row<T>>,
}

impl<T: Keyed> Default for Table<T> {
    fn default() -> Self {
        Self { rows: HashMap::new() }
    }
}

impl<T: Keyed + Clone> Table<T> {
    fn get(&self, key: T::Key) -> Result<Versioned<T>, PortError> {
        self.rows
            .get(&key)
            .map(|row| row.entry.clone())
            .ok_or_else(|| PortError::not_found(T::ENTITY, key))
    }

    fn list(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        let mut rows: Vec<&Row<T>> = self.rows.values().filter(|row| keep(&row.entry.value)).collect();
        rows.sort_by_key(|row| row.seq);
        rows.into_iter().map(|row| row.entry.value.clone()).collect()
    }

    fn version_of(&self, key: T::Key) -> Option<Version> {
        self.rows.get(&key).map(|row| row.entry.version)
    }

    fn check(&self, staged: &[Staged<T>]) -> Result<(), PortError> {
        let mut seen = HashSet::new();
        for write in staged {
            let key = write.value().key();
            if !seen.insert(key) {
                return Err(PortError::internal(format!(
                    "{} {} staged more than once in one unit of work",
                    T::ENTITY,
                    key
                )));
            }
            match (write, self.version_of(key)) {
                (Staged::Insert(_), Some(_)) => {
                    return Err(PortError::conflict(format!("{} {} already exists", T::ENTITY, key)));
                }
                (Staged::Update { .. }, None) => {
                    return Err(PortError::not_found(T::ENTITY, key));
                }
                (Staged::Update { expected, .. }, Some(found)) if found != *expected => {
                    return Err(PortError::conflict(format!(
                        "{} {} changed concurrently: read at version {}, now at {}",
                        T::ENTITY,
                        key,
                        expected,
                        found
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn apply(&mut self, staged: Vec<Staged<T>>, seq: &mut u64) {
        for write in staged {
            match write {
                Staged::Insert(value) => {
                    *seq += 1;
                    self.rows.insert(
                        value.key(),
                        Row {
                            seq: *seq,
                            entry: Versioned::new(value, 1),
                        },
                    );
                }
                Staged::Update { value, expected } => {
                    if let Some(row) = self.rows.get_mut(&value.key()) {
                        row.entry = Versioned::new(value, expected + 1);
                    }
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    seq: u64,
    advances: Table<SupplierAdvance>,
    intakes: Table<Intake>,
    settlements: Table<Settlement>,
    deliveries: Table<Delivery>,
    settlement_by_intake: HashMap<IntakeId, SettlementId>,
}

impl Tables {
    /// One settlement per intake, even across racing inserts
    fn check_settlement_index(&self, staged: &[Staged<Settlement>]) -> Result<(), PortError> {
        let mut claimed = HashSet::new();
        for write in staged {
            if let Staged::Insert(settlement) = write {
                let intake_id = settlement.intake_id();
                if self.settlement_by_intake.contains_key(&intake_id) || !claimed.insert(intake_id) {
                    return Err(PortError::conflict(format!(
                        "Intake {} already has a settlement",
                        intake_id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Thread-safe in-memory implementation of [`LedgerStore`]
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    tables: RwLock<Tables>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, PortError> {
        self.tables
            .read()
            .map_err(|_| PortError::internal("ledger store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, PortError> {
        self.tables
            .write()
            .map_err(|_| PortError::internal("ledger store lock poisoned"))
    }
}

impl DomainPort for InMemoryLedgerStore {}

impl LedgerStore for InMemoryLedgerStore {
    fn advance(&self, id: AdvanceId) -> Result<Versioned<SupplierAdvance>, PortError> {
        self.read()?.advances.get(id)
    }

    fn advances_for_supplier(&self, supplier_id: SupplierId) -> Result<Vec<SupplierAdvance>, PortError> {
        Ok(self.read()?.advances.list(|a| a.supplier_id() == supplier_id))
    }

    fn intake(&self, id: IntakeId) -> Result<Versioned<Intake>, PortError> {
        self.read()?.intakes.get(id)
    }

    fn intakes_for_supplier(&self, supplier_id: SupplierId) -> Result<Vec<Intake>, PortError> {
        Ok(self.read()?.intakes.list(|i| i.supplier_id() == supplier_id))
    }

    fn settlement(&self, id: SettlementId) -> Result<Versioned<Settlement>, PortError> {
        self.read()?.settlements.get(id)
    }

    fn settlement_for_intake(&self, intake_id: IntakeId) -> Result<Option<Versioned<Settlement>>, PortError> {
        let tables = self.read()?;
        match tables.settlement_by_intake.get(&intake_id) {
            Some(id) => tables.settlements.get(*id).map(Some),
            None => Ok(None),
        }
    }

    fn settlements_for_supplier(&self, supplier_id: SupplierId) -> Result<Vec<Settlement>, PortError> {
        Ok(self.read()?.settlements.list(|s| s.supplier_id() == supplier_id))
    }

    fn delivery(&self, id: DeliveryId) -> Result<Versioned<Delivery>, PortError> {
        self.read()?.deliveries.get(id)
    }

    fn deliveries_for_intake(&self, intake_id: IntakeId) -> Result<Vec<Delivery>, PortError> {
        Ok(self.read()?.deliveries.list(|d| d.intake_id == intake_id))
    }

    fn commit(&self, unit: UnitOfWork) -> Result<(), PortError> {
        let mut guard = self.write()?;
        let tables = &mut *guard;

        tables.advances.check(&unit.advances)?;
        tables.intakes.check(&unit.intakes)?;
        tables.settlements.check(&unit.settlements)?;
        tables.check_settlement_index(&unit.settlements)?;
        tables.deliveries.check(&unit.deliveries)?;

        for write in &unit.settlements {
            if let Staged::Insert(settlement) = write {
                tables
                    .settlement_by_intake
                    .insert(settlement.intake_id(), settlement.id());
            }
        }

        let UnitOfWork {
            advances,
            intakes,
            settlements,
            deliveries,
        } = unit;
        tables.advances.apply(advances, &mut tables.seq);
        tables.intakes.apply(intakes, &mut tables.seq);
        tables.settlements.apply(settlements, &mut tables.seq);
        tables.deliveries.apply(deliveries, &mut tables.seq);
        Ok(())
    }
}
