//! Credit Domain - Supplier Cash Advances
//!
//! This crate holds the rules for reserving company cash in favour of a
//! supplier and consuming it against intake debt.
//!
//! # Advance Lifecycle
//!
//! ```text
//! reserve -> Pending -> confirm (re-keyed amount) -> Confirmed -> draw...
//!               \                                      /
//!                +-------- cancel (nothing drawn) ----+--> Cancelled
//! ```
//!
//! Overdue detection is a read-time check against a caller-supplied instant;
//! there is no timer and no automatic cancellation.

pub mod advance;
pub mod exposure;
pub mod error;

pub use advance::{SupplierAdvance, AdvanceStatus};
pub use exposure::{SupplierExposure, Eligibility, EligibilityPolicy, PendingThresholdPolicy};
pub use error::AdvanceError;
