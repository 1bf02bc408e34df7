//! Pre-built Test Fixtures
//!
//! Consistent, predictable data for unit and integration tests. Amounts are
//! in XOF, the default ledger currency.

use chrono::{DateTime, TimeZone, Utc};
use fake::faker::company::en::CompanyName;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, ValidityWindow, Weight};
use domain_fulfillment::ReleaseOrder;
use domain_intake::Measurements;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// An XOF amount
    pub fn xof(amount: Decimal) -> Money {
        Money::new(amount, Currency::XOF).expect("fixture amounts are non-negative")
    }

    /// The advance used throughout the advance scenarios
    pub fn advance_500k() -> Money {
        Self::xof(dec!(500000))
    }

    /// Standard price per kilogram
    pub fn unit_price() -> Money {
        Self::xof(dec!(1000))
    }

    pub fn xof_zero() -> Money {
        Money::zero(Currency::XOF)
    }

    /// A USD amount for currency mismatch tests
    pub fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD).expect("fixture amounts are non-negative")
    }
}

/// Fixture for weights
pub struct WeightFixtures;

impl WeightFixtures {
    pub fn kg(value: Decimal) -> Weight {
        Weight::from_kg(value).expect("fixture weights are non-negative")
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Start of the collection day used by the scenarios (1 March 2024, 08:00)
    pub fn collection_day() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    /// Standard advance validity of two hours
    pub fn two_hours() -> ValidityWindow {
        ValidityWindow::hours(2).unwrap()
    }
}

/// Fixture for weighbridge and lab measurements
pub struct MeasurementFixtures;

impl MeasurementFixtures {
    /// gross 100, packaging 5, humidity 12, target 8, price 1000:
    /// net 91.2 kg, debt 91,200
    pub fn scenario_a() -> Measurements {
        Self::raw(dec!(100), dec!(5), dec!(12), dec!(8), dec!(1000))
    }

    /// Measurements with no drying loss
    pub fn dry(gross: Decimal, packaging: Decimal, unit_price: Decimal) -> Measurements {
        Self::raw(gross, packaging, dec!(8), dec!(10), unit_price)
    }

    /// A donated or sample lot priced at zero
    pub fn free_of_charge() -> Measurements {
        Self::raw(dec!(50), dec!(2), dec!(9), dec!(10), dec!(0))
    }

    pub fn raw(
        gross: Decimal,
        packaging: Decimal,
        humidity_pct: Decimal,
        target_pct: Decimal,
        unit_price: Decimal,
    ) -> Measurements {
        Measurements::from_raw(gross, packaging, humidity_pct, target_pct, unit_price, Currency::XOF)
            .expect("fixture measurements are valid")
    }
}

/// Fixture for delivery parties
pub struct PartyFixtures;

impl PartyFixtures {
    pub fn recipient() -> String {
        CompanyName().fake()
    }

    pub fn carrier() -> String {
        Name().fake()
    }

    pub fn release_order() -> ReleaseOrder {
        ReleaseOrder::new(Self::recipient(), Self::carrier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_a_prices_as_documented() {
        let priced = MeasurementFixtures::scenario_a().price().unwrap();
        assert_eq!(priced.net_weight.kg(), dec!(91.2));
        assert_eq!(priced.total_debt, MoneyFixtures::xof(dec!(91200)));
    }

    #[test]
    fn test_release_order_has_parties() {
        let order = PartyFixtures::release_order();
        assert!(!order.recipient.trim().is_empty());
        assert!(!order.carrier.trim().is_empty());
    }
}
