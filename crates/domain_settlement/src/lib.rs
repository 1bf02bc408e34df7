//! Settlement Domain
//!
//! Pays an intake's debt through direct payments and draws on supplier
//! advances. A draw and its payment are applied together: either both happen
//! or neither does.
//!
//! # Status
//!
//! ```text
//! Unpaid -> PartiallyPaid -> Paid
//!   \________________________/^   (zero debt opens as Paid)
//! ```

pub mod settlement;
pub mod payment;
pub mod receivable;
pub mod error;

pub use settlement::{Settlement, SettlementStatus};
pub use payment::{Payment, PaymentSource};
pub use receivable::{StandingReceivable, total_open_balance};
pub use error::SettlementError;
