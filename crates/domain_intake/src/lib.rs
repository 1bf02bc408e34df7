//! Intake Domain
//!
//! Turns a raw-material receipt into a priced debt and tracks its quality
//! status. Pricing is pure and deterministic; the intake aggregate carries the
//! independent settlement and fulfillment tracks once accepted.

pub mod pricing;
pub mod intake;
pub mod error;

pub use pricing::{price_intake, Measurements, PricedIntake};
pub use intake::{Intake, IntakeStatus, SettlementStage, FulfillmentStage};
pub use error::IntakeError;
