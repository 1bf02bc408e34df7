//! Application services
//!
//! Each service loads entity snapshots from the [`LedgerStore`](crate::store::LedgerStore),
//! applies the domain rules to them and commits the result through the
//! optimistic loop in [`EngineContext`](crate::context::EngineContext).

mod advance;
mod intake;
mod settlement;
mod fulfillment;
mod statement;

pub use advance::AdvanceLedger;
pub use intake::IntakeRegistry;
pub use settlement::SettlementLedger;
pub use fulfillment::FulfillmentTracker;
pub use statement::SupplierStatement;
