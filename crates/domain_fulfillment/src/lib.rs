//! Fulfillment Domain
//!
//! Releases an accepted intake's physical stock through one or more partial
//! deliveries, independently of whether the intake has been paid for.
//!
//! Each release reduces the intake's remaining net weight; once it reaches
//! zero the intake is fulfilled and further releases fail.

pub mod delivery;
pub mod tracker;
pub mod error;

pub use delivery::{Delivery, DeliveryStatus, QuantityBasis, ReleaseOrder};
pub use tracker::{release_net, release_gross_with_ratio, net_equivalent};
pub use error::FulfillmentError;
