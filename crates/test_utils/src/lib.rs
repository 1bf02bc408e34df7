//! Test Utilities Crate
//!
//! Shared test infrastructure for the ledger test suites.
//!
//! # Modules
//!
//! - `fixtures`: Ready-made amounts, timestamps, measurements and parties
//! - `builders`: Builders for advances and intakes, and the [`TestEngine`] harness
//! - `assertions`: Invariant checks with descriptive panic messages
//! - `generators`: Proptest strategies for amounts, weights and measurements

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;

use once_cell::sync::Lazy;

static TRACING: Lazy<()> = Lazy::new(|| {
    ledger_engine::telemetry::init_tracing("warn", false);
});

/// Installs a quiet tracing subscriber once per test binary
pub fn init_test_tracing() {
    Lazy::force(&TRACING);
}
