//! Property-Based Test Generators
//!
//! Proptest strategies producing values that satisfy the input rules, so
//! properties exercise the ledger rather than input validation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money, Weight};
use domain_intake::Measurements;

/// Whole XOF amounts from 1 to 10,000,000
pub fn xof_amount_strategy() -> impl Strategy<Value = Money> {
    (1u64..=10_000_000u64).prop_map(|n| Money::from_minor(n, Currency::XOF))
}

/// Weights from 0.1 kg to 10,000 kg with one decimal
pub fn weight_strategy() -> impl Strategy<Value = Weight> {
    (1i64..=100_000i64).prop_map(|tenths| Weight::from_kg(Decimal::new(tenths, 1)).unwrap())
}

/// Percentages from 0 to 40 with one decimal
pub fn humidity_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=400i64).prop_map(|tenths| Decimal::new(tenths, 1))
}

/// Valid measurements: packaging strictly below gross
pub fn measurements_strategy() -> impl Strategy<Value = Measurements> {
    (
        10i64..=100_000i64,
        0u32..=90u32,
        humidity_strategy(),
        humidity_strategy(),
        0u64..=5_000u64,
    )
        .prop_map(|(gross_tenths, packaging_pct, humidity, target, price)| {
            let gross = Decimal::new(gross_tenths, 1);
            let packaging = (gross * Decimal::from(packaging_pct) / Decimal::from(100)).round_dp(1);
            Measurements::from_raw(gross, packaging, humidity, target, Decimal::from(price), Currency::XOF)
                .unwrap()
        })
}

/// Split weights in percent, for slicing an amount into several payments
/// or releases
pub fn split_strategy() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(1u32..=60u32, 1..8)
}

/// Amount requests that may exceed what is available
pub fn request_sequence_strategy() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..=300_000u64, 1..12)
}
