//! Tests for stock releases and delivery lifecycle

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, ErrorKind, SupplierId, Weight};
use domain_fulfillment::{
    net_equivalent, release_gross_with_ratio, release_net, DeliveryStatus, FulfillmentError, QuantityBasis,
    ReleaseOrder,
};
use domain_intake::{FulfillmentStage, Intake, Measurements};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

fn kg(value: Decimal) -> Weight {
    Weight::from_kg(value).unwrap()
}

fn accepted(gross: Decimal, packaging: Decimal) -> Intake {
    let m = Measurements::from_raw(gross, packaging, dec!(8), dec!(10), dec!(1000), Currency::XOF).unwrap();
    let mut intake = Intake::register(SupplierId::new(), m, now()).unwrap();
    intake.record_test(now()).unwrap();
    intake.accept(now()).unwrap();
    intake
}

fn order() -> ReleaseOrder {
    ReleaseOrder::new("Coopérative de Daloa", "Transports Yao")
}

// ============================================================================
// Net releases
// ============================================================================

mod net {
    use super::*;

    #[test]
    fn test_partial_release() {
        let mut intake = accepted(dec!(95), dec!(5));
        let delivery = release_net(&mut intake, kg(dec!(30)), &order(), now()).unwrap();

        assert_eq!(delivery.basis, QuantityBasis::Net);
        assert_eq!(delivery.net_weight_released, kg(dec!(30)));
        assert_eq!(delivery.status, DeliveryStatus::AwaitingDispatch);
        assert!(!delivery.closes_intake);
        assert_eq!(intake.remaining_quantity(), kg(dec!(60)));
        assert_eq!(intake.fulfillment_stage(), Some(FulfillmentStage::PartiallyFulfilled));
    }

    #[test]
    fn test_exhausting_release_then_nothing_more() {
        let mut intake = accepted(dec!(95), dec!(5));
        let delivery = release_net(&mut intake, kg(dec!(90)), &order(), now()).unwrap();
        assert!(delivery.closes_intake);
        assert_eq!(intake.fulfillment_stage(), Some(FulfillmentStage::Fulfilled));

        let err = release_net(&mut intake, kg(dec!(0.1)), &order(), now()).unwrap_err();
        assert_eq!(
            err,
            FulfillmentError::ExceedsRemaining {
                intake_id: intake.id(),
                requested: dec!(0.1),
                remaining: dec!(0),
            }
        );
    }

    #[test]
    fn test_unaccepted_intake_rejected() {
        let m = Measurements::from_raw(dec!(95), dec!(5), dec!(8), dec!(10), dec!(1000), Currency::XOF).unwrap();
        let mut intake = Intake::register(SupplierId::new(), m, now()).unwrap();
        let err = release_net(&mut intake, kg(dec!(1)), &order(), now()).unwrap_err();
        assert!(matches!(err, FulfillmentError::Intake(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_parties_are_trimmed_and_required() {
        let mut intake = accepted(dec!(95), dec!(5));
        let delivery = release_net(&mut intake, kg(dec!(1)), &ReleaseOrder::new("  Usine  ", " Koné "), now()).unwrap();
        assert_eq!(delivery.recipient, "Usine");
        assert_eq!(delivery.carrier, "Koné");

        let err = release_net(&mut intake, kg(dec!(1)), &ReleaseOrder::new(" ", "Koné"), now()).unwrap_err();
        assert_eq!(err, FulfillmentError::MissingParty { field: "recipient" });
        assert_eq!(intake.remaining_quantity(), kg(dec!(89)));
    }
}

// ============================================================================
// Gross releases
// ============================================================================

mod gross {
    use super::*;

    #[test]
    fn test_net_equivalent_uses_intake_ratio() {
        let intake = accepted(dec!(100), dec!(20));
        assert_eq!(net_equivalent(&intake, kg(dec!(50))).unwrap(), kg(dec!(40)));
        assert_eq!(net_equivalent(&intake, kg(dec!(100))).unwrap(), kg(dec!(80)));
    }

    #[test]
    fn test_gross_release_records_both_quantities() {
        let mut intake = accepted(dec!(100), dec!(20));
        let delivery = release_gross_with_ratio(&mut intake, kg(dec!(25)), &order(), now()).unwrap();
        assert_eq!(delivery.basis, QuantityBasis::Gross);
        assert_eq!(delivery.quantity_released, kg(dec!(25)));
        assert_eq!(delivery.net_weight_released, kg(dec!(20)));
        assert_eq!(intake.remaining_quantity(), kg(dec!(60)));
    }

    #[test]
    fn test_gross_beyond_remaining_rejected() {
        let mut intake = accepted(dec!(100), dec!(20));
        release_net(&mut intake, kg(dec!(70)), &order(), now()).unwrap();

        // 20 kg gross is 16 kg net, only 10 left
        let err = release_gross_with_ratio(&mut intake, kg(dec!(20)), &order(), now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExceedsRemaining);
        assert_eq!(intake.remaining_quantity(), kg(dec!(10)));
    }

    #[test]
    fn test_thirds_of_gross_fulfill_the_intake() {
        // net 2 kg over 3 kg gross
        let mut intake = accepted(dec!(3), dec!(1));
        for _ in 0..3 {
            release_gross_with_ratio(&mut intake, kg(dec!(1)), &order(), now()).unwrap();
        }
        assert!(intake.remaining_quantity().is_zero());
        assert_eq!(intake.fulfillment_stage(), Some(FulfillmentStage::Fulfilled));

        let err = release_gross_with_ratio(&mut intake, kg(dec!(0.0001)), &order(), now()).unwrap_err();
        assert!(matches!(err, FulfillmentError::ExceedsRemainingGross { .. }));
    }

    #[test]
    fn test_zero_gross_rejected() {
        let mut intake = accepted(dec!(100), dec!(20));
        let err = release_gross_with_ratio(&mut intake, Weight::ZERO, &order(), now()).unwrap_err();
        assert!(matches!(err, FulfillmentError::InvalidQuantity { .. }));
    }
}

// ============================================================================
// Delivery lifecycle
// ============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn test_partial_delivery_received_as_partial() {
        let mut intake = accepted(dec!(95), dec!(5));
        let mut delivery = release_net(&mut intake, kg(dec!(10)), &order(), now()).unwrap();

        delivery.dispatch(now() + Duration::hours(1)).unwrap();
        delivery.confirm_receipt(now() + Duration::hours(6)).unwrap();
        assert_eq!(delivery.status, DeliveryStatus::PartiallyFulfilled);
        assert_eq!(delivery.received_at, Some(now() + Duration::hours(6)));
    }

    #[test]
    fn test_closing_delivery_received_as_fulfilled() {
        let mut intake = accepted(dec!(95), dec!(5));
        let mut delivery = release_net(&mut intake, kg(dec!(90)), &order(), now()).unwrap();
        delivery.dispatch(now()).unwrap();
        delivery.confirm_receipt(now()).unwrap();
        assert_eq!(delivery.status, DeliveryStatus::Fulfilled);
    }

    #[test]
    fn test_out_of_order_transitions_rejected() {
        let mut intake = accepted(dec!(95), dec!(5));
        let mut delivery = release_net(&mut intake, kg(dec!(10)), &order(), now()).unwrap();

        assert_eq!(delivery.confirm_receipt(now()).unwrap_err().kind(), ErrorKind::InvalidState);
        delivery.dispatch(now()).unwrap();
        assert!(delivery.dispatch(now()).is_err());
        assert_eq!(delivery.dispatched_at, Some(now()));
    }
}

mod proptests {
    use super::*;

    proptest! {
        #[test]
        fn remaining_plus_released_is_net_weight(
            requests in prop::collection::vec((any::<bool>(), 1i64..=400), 1..15),
        ) {
            let mut intake = accepted(dec!(100), dec!(20));
            let mut released = Weight::ZERO;

            for (gross, tenths) in requests {
                let quantity = kg(Decimal::new(tenths, 1));
                let outcome = if gross {
                    release_gross_with_ratio(&mut intake, quantity, &order(), now())
                } else {
                    release_net(&mut intake, quantity, &order(), now())
                };
                if let Ok(delivery) = outcome {
                    released = released.checked_add(delivery.net_weight_released).unwrap();
                }
                prop_assert_eq!(
                    intake.remaining_quantity().checked_add(released).unwrap(),
                    intake.net_weight()
                );
            }
        }

        #[test]
        fn gross_weight_in_parts_fulfills_exactly(
            gross_units in 10_000i64..=50_000_000,
            packaging_pct in 0u32..=90,
            humidity_tenths in 0i64..=400,
            parts in 1i64..=12,
        ) {
            let gross = Decimal::new(gross_units, 4);
            let packaging = (gross * Decimal::from(packaging_pct) / dec!(100)).round_dp(4);
            let m = Measurements::from_raw(gross, packaging, Decimal::new(humidity_tenths, 1), dec!(0), dec!(1000), Currency::XOF).unwrap();
            let mut intake = Intake::register(SupplierId::new(), m, now()).unwrap();
            intake.record_test(now()).unwrap();
            intake.accept(now()).unwrap();

            let part = (gross / Decimal::from(parts)).round_dp_with_strategy(4, rust_decimal::RoundingStrategy::ToZero);
            let last = gross - part * Decimal::from(parts - 1);
            let mut released = Weight::ZERO;
            for i in 0..parts {
                let quantity = if i == parts - 1 { last } else { part };
                let delivery = release_gross_with_ratio(&mut intake, kg(quantity), &order(), now()).unwrap();
                released = released.checked_add(delivery.net_weight_released).unwrap();
            }

            prop_assert!(intake.remaining_quantity().is_zero());
            prop_assert_eq!(released, intake.net_weight());
            prop_assert_eq!(intake.fulfillment_stage(), Some(FulfillmentStage::Fulfilled));
            prop_assert_eq!(intake.gross_released(), intake.gross_weight());
        }
    }
}
