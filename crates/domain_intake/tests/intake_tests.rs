//! Tests for intake pricing and the intake status machine

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, ErrorKind, SupplierId, Weight};
use domain_intake::{FulfillmentStage, Intake, IntakeError, IntakeStatus, Measurements, SettlementStage};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

fn measurements(gross: Decimal, packaging: Decimal, humidity: Decimal, target: Decimal, price: Decimal) -> Measurements {
    Measurements::from_raw(gross, packaging, humidity, target, price, Currency::XOF).unwrap()
}

fn scenario_a() -> Measurements {
    measurements(dec!(100), dec!(5), dec!(12), dec!(8), dec!(1000))
}

fn accepted(m: Measurements) -> Intake {
    let mut intake = Intake::register(SupplierId::new(), m, now()).unwrap();
    intake.record_test(now()).unwrap();
    intake.accept(now()).unwrap();
    intake
}

// ============================================================================
// Pricing
// ============================================================================

mod pricing {
    use super::*;

    #[test]
    fn test_scenario_a() {
        let priced = scenario_a().price().unwrap();
        assert_eq!(priced.net_before_drying.kg(), dec!(95));
        assert_eq!(priced.drying_loss.kg(), dec!(3.8));
        assert_eq!(priced.net_weight.kg(), dec!(91.2));
        assert_eq!(priced.total_debt.amount(), dec!(91200));
    }

    #[test]
    fn test_no_loss_when_drier_than_target() {
        let priced = measurements(dec!(100), dec!(5), dec!(6), dec!(8), dec!(1000)).price().unwrap();
        assert!(priced.drying_loss.is_zero());
        assert_eq!(priced.net_weight.kg(), dec!(95));
    }

    #[test]
    fn test_no_loss_at_exact_target() {
        let priced = measurements(dec!(100), dec!(5), dec!(8), dec!(8), dec!(1000)).price().unwrap();
        assert!(priced.drying_loss.is_zero());
    }

    #[test]
    fn test_debt_rounds_half_even() {
        // 92.5 kg at 1 XOF/kg
        let priced = measurements(dec!(100), dec!(7.5), dec!(8), dec!(10), dec!(1)).price().unwrap();
        assert_eq!(priced.total_debt.amount(), dec!(92));

        // 93.5 kg at 1 XOF/kg
        let priced = measurements(dec!(100), dec!(6.5), dec!(8), dec!(10), dec!(1)).price().unwrap();
        assert_eq!(priced.total_debt.amount(), dec!(94));
    }

    #[test]
    fn test_debt_from_product_beyond_four_places() {
        // 0.0501 kg at 0.10 USD/kg is 0.00501 USD
        let m = Measurements::from_raw(dec!(1.0501), dec!(1), dec!(0), dec!(0), dec!(0.10), Currency::USD).unwrap();
        let priced = m.price().unwrap();
        assert_eq!(priced.net_weight.kg(), dec!(0.0501));
        assert_eq!(priced.total_debt.amount(), dec!(0.01));

        // 12.3457 kg at 0.35 = 4.320995 -> 4.32
        let m = Measurements::from_raw(dec!(13.3457), dec!(1), dec!(0), dec!(0), dec!(0.35), Currency::EUR).unwrap();
        assert_eq!(m.price().unwrap().total_debt.amount(), dec!(4.32));
    }

    #[test]
    fn test_zero_price_gives_zero_debt() {
        let priced = measurements(dec!(50), dec!(2), dec!(9), dec!(10), dec!(0)).price().unwrap();
        assert!(priced.total_debt.is_zero());
        assert_eq!(priced.net_weight.kg(), dec!(48));
    }

    #[test]
    fn test_packaging_must_be_below_gross() {
        let err = measurements(dec!(10), dec!(10), dec!(8), dec!(10), dec!(1000)).price().unwrap_err();
        assert_eq!(
            err,
            IntakeError::InvalidPackaging {
                gross: dec!(10),
                packaging: dec!(10),
            }
        );
        assert_eq!(err.kind(), ErrorKind::InvalidPackaging);
    }

    #[test]
    fn test_invalid_raw_input_names_field() {
        let err = Measurements::from_raw(dec!(100), dec!(5), dec!(120), dec!(8), dec!(1000), Currency::XOF).unwrap_err();
        assert!(matches!(err, IntakeError::InvalidInput { field: "humidity_pct", .. }));

        let err = Measurements::from_raw(dec!(-1), dec!(0), dec!(8), dec!(8), dec!(1000), Currency::XOF).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = Measurements::from_raw(dec!(100), dec!(5), dec!(8), dec!(8), dec!(-3), Currency::XOF).unwrap_err();
        assert!(matches!(err, IntakeError::InvalidInput { field: "unit_price", .. }));
    }
}

// ============================================================================
// Status machine
// ============================================================================

mod status {
    use super::*;

    #[test]
    fn test_accept_opens_both_tracks() {
        let intake = accepted(scenario_a());
        assert_eq!(intake.status(), IntakeStatus::Accepted);
        assert_eq!(intake.settlement_stage(), Some(SettlementStage::AwaitingSettlement));
        assert_eq!(intake.fulfillment_stage(), Some(FulfillmentStage::AwaitingFulfillment));
        assert!(!intake.is_terminal());
    }

    #[test]
    fn test_cannot_accept_untested() {
        let mut intake = Intake::register(SupplierId::new(), scenario_a(), now()).unwrap();
        let err = intake.accept(now()).unwrap_err();
        assert!(matches!(
            err,
            IntakeError::InvalidStatusTransition {
                from: IntakeStatus::Intaken,
                to: IntakeStatus::Accepted,
                ..
            }
        ));
        assert_eq!(intake.settlement_stage(), None);
    }

    #[test]
    fn test_rework_requires_retest() {
        let mut intake = Intake::register(SupplierId::new(), scenario_a(), now()).unwrap();
        intake.record_test(now()).unwrap();
        intake.request_rework(now()).unwrap();
        assert!(intake.accept(now()).is_err());
        assert!(intake.reject(now()).is_err());

        intake.record_test(now()).unwrap();
        intake.accept(now()).unwrap();
    }

    #[test]
    fn test_rejected_is_terminal() {
        let mut intake = Intake::register(SupplierId::new(), scenario_a(), now()).unwrap();
        intake.record_test(now()).unwrap();
        intake.reject(now()).unwrap();
        assert!(intake.is_terminal());
        assert!(intake.record_test(now()).is_err());
        assert_eq!(intake.require_accepted().unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_revision_reprices_before_acceptance() {
        let mut intake = Intake::register(SupplierId::new(), scenario_a(), now()).unwrap();
        let priced = *intake
            .revise(measurements(dec!(100), dec!(5), dec!(8), dec!(10), dec!(1000)), now())
            .unwrap();
        assert_eq!(priced.total_debt.amount(), dec!(95000));
        assert_eq!(intake.total_debt().amount(), dec!(95000));
        assert_eq!(intake.remaining_quantity().kg(), dec!(95));
        assert_eq!(intake.revision(), 1);
    }

    #[test]
    fn test_revision_frozen_after_acceptance() {
        let mut intake = accepted(scenario_a());
        let err = intake.revise(scenario_a(), now()).unwrap_err();
        assert!(matches!(err, IntakeError::Frozen { .. }));
        assert_eq!(intake.revision(), 0);
    }

    #[test]
    fn test_failed_revision_keeps_old_pricing() {
        let mut intake = Intake::register(SupplierId::new(), scenario_a(), now()).unwrap();
        let bad = measurements(dec!(10), dec!(12), dec!(8), dec!(10), dec!(1000));
        assert!(intake.revise(bad, now()).is_err());
        assert_eq!(intake.total_debt().amount(), dec!(91200));
        assert_eq!(intake.revision(), 0);
    }
}

// ============================================================================
// Independent tracks
// ============================================================================

mod tracks {
    use super::*;

    #[test]
    fn test_deduction_moves_fulfillment_stage() {
        let mut intake = accepted(scenario_a());
        let stage = intake.deduct_remaining(Weight::from_kg(dec!(50)).unwrap(), now()).unwrap();
        assert_eq!(stage, FulfillmentStage::PartiallyFulfilled);

        let stage = intake.deduct_remaining(Weight::from_kg(dec!(41.2)).unwrap(), now()).unwrap();
        assert_eq!(stage, FulfillmentStage::Fulfilled);
        assert!(intake.remaining_quantity().is_zero());
        assert_eq!(intake.settlement_stage(), Some(SettlementStage::AwaitingSettlement));
    }

    #[test]
    fn test_over_deduction_rejected() {
        let mut intake = accepted(scenario_a());
        let err = intake.deduct_remaining(Weight::from_kg(dec!(91.3)).unwrap(), now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExceedsRemaining);
        assert_eq!(intake.remaining_quantity().kg(), dec!(91.2));
    }

    #[test]
    fn test_terminal_needs_both_tracks() {
        let mut intake = accepted(scenario_a());
        intake.set_settlement_stage(SettlementStage::Paid, now()).unwrap();
        assert!(!intake.is_terminal());

        intake.deduct_remaining(intake.net_weight(), now()).unwrap();
        assert!(intake.is_terminal());
    }

    #[test]
    fn test_gross_deductions_follow_cumulative_gross() {
        // net 2 kg over 3 kg gross
        let mut intake = accepted(measurements(dec!(3), dec!(1), dec!(8), dec!(10), dec!(1000)));
        let one = Weight::from_kg(dec!(1)).unwrap();

        assert_eq!(intake.deduct_gross(one, now()).unwrap().0.kg(), dec!(0.6667));
        assert_eq!(intake.deduct_gross(one, now()).unwrap().0.kg(), dec!(0.6666));
        let (net, stage) = intake.deduct_gross(one, now()).unwrap();
        assert_eq!(net.kg(), dec!(0.6667));
        assert_eq!(stage, FulfillmentStage::Fulfilled);
        assert!(intake.remaining_quantity().is_zero());
        assert!(intake.remaining_gross().unwrap().is_zero());
    }

    #[test]
    fn test_gross_beyond_gross_weight_rejected() {
        let mut intake = accepted(measurements(dec!(3), dec!(1), dec!(8), dec!(10), dec!(1000)));
        let err = intake.deduct_gross(Weight::from_kg(dec!(3.1)).unwrap(), now()).unwrap_err();
        assert!(matches!(err, IntakeError::GrossExceeded { .. }));
        assert_eq!(err.kind(), ErrorKind::ExceedsRemaining);
        assert!(intake.gross_released().is_zero());
        assert_eq!(intake.remaining_quantity().kg(), dec!(2));
    }

    #[test]
    fn test_stage_updates_need_acceptance() {
        let mut intake = Intake::register(SupplierId::new(), scenario_a(), now()).unwrap();
        assert!(intake.set_settlement_stage(SettlementStage::Paid, now()).is_err());
        assert!(intake.deduct_remaining(Weight::from_kg(dec!(1)).unwrap(), now()).is_err());
    }
}

mod proptests {
    use super::*;

    proptest! {
        #[test]
        fn pricing_is_bounded_and_reproducible(
            gross_tenths in 10i64..=100_000,
            packaging_pct in 0u32..=90,
            humidity_tenths in 0i64..=400,
            target_tenths in 0i64..=400,
            price in 0u32..=5_000,
        ) {
            let gross = Decimal::new(gross_tenths, 1);
            let packaging = (gross * Decimal::from(packaging_pct) / dec!(100)).round_dp(1);
            let m = measurements(
                gross,
                packaging,
                Decimal::new(humidity_tenths, 1),
                Decimal::new(target_tenths, 1),
                Decimal::from(price),
            );

            let priced = m.price().unwrap();
            prop_assert!(priced.net_weight <= priced.net_before_drying);
            prop_assert!(priced.net_weight.kg() > Decimal::ZERO);
            prop_assert_eq!(priced.net_before_drying.kg(), gross - packaging);
            prop_assert_eq!(
                priced.total_debt.amount(),
                (priced.net_weight.kg() * Decimal::from(price))
                    .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointNearestEven)
            );
            prop_assert_eq!(m.price().unwrap(), priced);
        }

        #[test]
        fn debt_is_one_rounding_of_exact_product(
            net_units in 1i64..=5_000_000,
            price_cents in 0i64..=10_000,
        ) {
            let net = Decimal::new(net_units, 4);
            let unit_price = Decimal::new(price_cents, 2);
            let m = Measurements::from_raw(net + dec!(1), dec!(1), dec!(0), dec!(0), unit_price, Currency::USD).unwrap();

            let priced = m.price().unwrap();
            prop_assert_eq!(priced.net_weight.kg(), net);
            prop_assert_eq!(
                priced.total_debt.amount(),
                (net * unit_price).round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointNearestEven)
            );
        }
    }
}
