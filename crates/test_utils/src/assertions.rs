//! Custom Test Assertions
//!
//! Invariant checks that explain what broke instead of a bare `assert!`.

use rust_decimal::Decimal;

use core_kernel::{Money, Weight};
use domain_credit::SupplierAdvance;
use domain_fulfillment::Delivery;
use domain_intake::Intake;
use domain_settlement::{Settlement, SettlementStatus};

/// Asserts a money value has the expected amount
pub fn assert_money_eq(actual: &Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Expected {} {}, got {}",
        expected,
        actual.currency(),
        actual
    );
}

/// Asserts `amount_used <= confirmed_amount` and the remaining balance identity
pub fn assert_advance_balanced(advance: &SupplierAdvance) {
    let used = advance.amount_used().amount();
    let confirmed = advance.confirmed_amount().amount();
    assert!(
        used <= confirmed,
        "Advance {} overdrawn: used {} of {}",
        advance.id(),
        used,
        confirmed
    );
    assert_eq!(
        advance.amount_remaining().amount(),
        confirmed - used,
        "Advance {} remaining balance out of step",
        advance.id()
    );
}

/// Asserts the settlement's status matches its amounts and payments
pub fn assert_settlement_consistent(settlement: &Settlement) {
    let paid = settlement.amount_paid().amount();
    let due = settlement.amount_due().amount();
    assert!(paid <= due, "Settlement {} overpaid: {} of {}", settlement.id(), paid, due);

    let payments: Decimal = settlement.payments().iter().map(|p| p.amount.amount()).sum();
    assert_eq!(payments, paid, "Settlement {} payments do not add up", settlement.id());

    assert_eq!(
        settlement.status() == SettlementStatus::Paid,
        paid == due,
        "Settlement {} is {:?} with {} of {} paid",
        settlement.id(),
        settlement.status(),
        paid,
        due
    );
}

/// Asserts the intake is fully paid
pub fn assert_settlement_closed(settlement: &Settlement) {
    assert_settlement_consistent(settlement);
    assert_eq!(settlement.status(), SettlementStatus::Paid);
}

/// Asserts released net weight plus remaining quantity equals the net weight
pub fn assert_fulfillment_conserved(intake: &Intake, deliveries: &[Delivery]) {
    let released: Decimal = deliveries.iter().map(|d| d.net_weight_released.kg()).sum();
    assert!(
        released <= intake.net_weight().kg(),
        "Intake {} over-released: {} of {} kg",
        intake.id(),
        released,
        intake.net_weight().kg()
    );
    assert_eq!(
        intake.remaining_quantity().kg() + released,
        intake.net_weight().kg(),
        "Intake {} remaining quantity out of step with its deliveries",
        intake.id()
    );
}

/// Asserts a weight has the expected kilograms
pub fn assert_weight_eq(actual: Weight, expected_kg: Decimal) {
    assert_eq!(actual.kg(), expected_kg, "Expected {} kg, got {}", expected_kg, actual);
}
