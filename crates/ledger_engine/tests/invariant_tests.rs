//! Property tests over engine operations

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Money, SupplierId};
use domain_intake::FulfillmentStage;
use domain_settlement::PaymentSource;

use test_utils::{
    assert_advance_balanced, assert_fulfillment_conserved, assert_settlement_closed, assert_settlement_consistent,
    measurements_strategy, request_sequence_strategy, split_strategy, xof_amount_strategy, MoneyFixtures,
    PartyFixtures, TestEngine, WeightFixtures,
};

fn share(total: Decimal, pct: u32) -> Decimal {
    (total * Decimal::from(pct) / Decimal::from(100)).round_dp(2)
}

/// Share of an amount in whole francs
fn xof_share(total: Decimal, pct: u32) -> Decimal {
    share(total, pct).round_dp(0)
}

mod proptests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn draws_never_exceed_confirmed_amount(
            amount in xof_amount_strategy(),
            requests in request_sequence_strategy(),
        ) {
            let t = TestEngine::new();
            let advance = t.confirmed_advance(SupplierId::new(), amount);
            let mut drawn = Decimal::ZERO;

            for request in requests {
                let request = Money::from_minor(request, amount.currency());
                let remaining = t.engine.advances().get(advance.id()).unwrap().amount_remaining();
                let fits = request.amount() <= remaining.amount();

                let outcome = t.engine.advances().draw(advance.id(), request);
                prop_assert_eq!(outcome.is_ok(), fits);
                if fits {
                    drawn += request.amount();
                }

                let current = t.engine.advances().get(advance.id()).unwrap();
                assert_advance_balanced(&current);
                prop_assert_eq!(current.amount_used().amount(), drawn);
            }
        }

        #[test]
        fn split_payments_settle_exactly(
            measurements in measurements_strategy(),
            splits in split_strategy(),
        ) {
            let t = TestEngine::new();
            let intake = t.accepted_intake(SupplierId::new(), measurements);
            let ledger = t.engine.settlements();
            let settlement = ledger.open_settlement(intake.id()).unwrap();
            prop_assume!(!settlement.amount_due().is_zero());

            for pct in splits {
                let open = ledger.get(settlement.id()).unwrap().open_balance();
                let amount = xof_share(open.amount(), pct);
                if amount.is_zero() {
                    continue;
                }
                let after = ledger
                    .apply_payment(settlement.id(), MoneyFixtures::xof(amount), PaymentSource::Direct)
                    .unwrap();
                assert_settlement_consistent(&after);
            }

            let open = ledger.get(settlement.id()).unwrap().open_balance();
            if !open.is_zero() {
                ledger.apply_payment(settlement.id(), open, PaymentSource::Direct).unwrap();
            }

            let closed = ledger.get(settlement.id()).unwrap();
            assert_settlement_closed(&closed);
            prop_assert!(ledger
                .apply_payment(settlement.id(), MoneyFixtures::xof(Decimal::ONE), PaymentSource::Direct)
                .is_err());
        }

        #[test]
        fn releases_conserve_net_weight(
            measurements in measurements_strategy(),
            splits in split_strategy(),
        ) {
            let t = TestEngine::new();
            let intake = t.accepted_intake(SupplierId::new(), measurements);
            let tracker = t.engine.fulfillment();

            for pct in splits {
                let remaining = t.engine.intakes().get(intake.id()).unwrap().remaining_quantity();
                let quantity = share(remaining.kg(), pct);
                if quantity.is_zero() {
                    continue;
                }
                tracker
                    .release_net(intake.id(), WeightFixtures::kg(quantity), PartyFixtures::release_order())
                    .unwrap();
            }

            let remaining = t.engine.intakes().get(intake.id()).unwrap().remaining_quantity();
            if !remaining.is_zero() {
                tracker
                    .release_net(intake.id(), remaining, PartyFixtures::release_order())
                    .unwrap();
            }

            let intake = t.engine.intakes().get(intake.id()).unwrap();
            let deliveries = tracker.deliveries_for_intake(intake.id()).unwrap();
            assert_fulfillment_conserved(&intake, &deliveries);
            prop_assert!(intake.remaining_quantity().is_zero());
            prop_assert_eq!(deliveries.iter().filter(|d| d.closes_intake).count(), 1);
        }

        #[test]
        fn gross_releases_of_the_whole_gross_fulfill_exactly(
            measurements in measurements_strategy(),
            splits in split_strategy(),
        ) {
            let t = TestEngine::new();
            let intake = t.accepted_intake(SupplierId::new(), measurements);
            let tracker = t.engine.fulfillment();

            for pct in splits {
                let remaining_gross = t.engine.intakes().get(intake.id()).unwrap().remaining_gross().unwrap();
                let quantity = share(remaining_gross.kg(), pct);
                if quantity.is_zero() {
                    continue;
                }
                tracker
                    .release_gross_with_ratio(intake.id(), WeightFixtures::kg(quantity), PartyFixtures::release_order())
                    .unwrap();
            }

            let current = t.engine.intakes().get(intake.id()).unwrap();
            if !current.remaining_quantity().is_zero() {
                tracker
                    .release_gross_with_ratio(intake.id(), current.remaining_gross().unwrap(), PartyFixtures::release_order())
                    .unwrap();
            }

            let intake = t.engine.intakes().get(intake.id()).unwrap();
            let deliveries = tracker.deliveries_for_intake(intake.id()).unwrap();
            assert_fulfillment_conserved(&intake, &deliveries);
            prop_assert!(intake.remaining_quantity().is_zero());
            prop_assert_eq!(intake.fulfillment_stage(), Some(FulfillmentStage::Fulfilled));
        }
    }
}
