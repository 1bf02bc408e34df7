//! Core Kernel - Foundational types for the supplier credit and settlement ledger
//!
//! This crate provides the building blocks shared by every domain crate:
//! - Money and Weight with fixed-point, non-negative, checked arithmetic
//! - Percentage rates for humidity and desiccation readings
//! - Strongly-typed identifiers
//! - Injected clocks and typed validity windows
//! - The error-kind taxonomy and port error type

pub mod money;
pub mod quantity;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError, Rate};
pub use quantity::Weight;
pub use temporal::{Clock, SystemClock, ManualClock, ValidityWindow, ValidityUnit, TemporalError};
pub use identifiers::{
    SupplierId, AdvanceId, IntakeId, SettlementId, PaymentId, DeliveryId,
};
pub use ports::{PortError, DomainPort};
pub use error::{CoreError, ErrorKind};
