//! Intake pricing
//!
//! Converts the measurements taken at the weighbridge into a net weight and a
//! debt owed to the supplier:
//!
//! ```text
//! net_before_drying = gross - packaging
//! loss              = net_before_drying * (humidity - target) / 100   (only if humidity > target)
//! net_weight        = net_before_drying - loss
//! total_debt        = round_half_even(net_weight * unit_price, currency precision)
//! ```
//!
//! Pricing is a pure function of its inputs so that any stored debt can be
//! recomputed during an audit and compared.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, Rate, Weight};
use crate::error::IntakeError;

/// Validated weighbridge and lab measurements for one intake
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub gross_weight: Weight,
    pub packaging_weight: Weight,
    /// Measured humidity
    pub humidity: Rate,
    /// Humidity level the company pays for
    pub target_desiccation: Rate,
    /// Price per kilogram of net weight
    pub unit_price: Money,
}

impl Measurements {
    /// Builds measurements from raw operator input
    ///
    /// # Errors
    ///
    /// `InvalidInput` for negative weights, percentages outside 0..=100, or a
    /// negative unit price.
    pub fn from_raw(
        gross_weight: Decimal,
        packaging_weight: Decimal,
        humidity_pct: Decimal,
        target_desiccation_pct: Decimal,
        unit_price: Decimal,
        currency: core_kernel::Currency,
    ) -> Result<Self, IntakeError> {
        Ok(Self {
            gross_weight: Weight::from_kg(gross_weight)
                .map_err(|e| IntakeError::invalid_input("gross_weight", e))?,
            packaging_weight: Weight::from_kg(packaging_weight)
                .map_err(|e| IntakeError::invalid_input("packaging_weight", e))?,
            humidity: Rate::from_percentage(humidity_pct)
                .map_err(|e| IntakeError::invalid_input("humidity_pct", e))?,
            target_desiccation: Rate::from_percentage(target_desiccation_pct)
                .map_err(|e| IntakeError::invalid_input("target_desiccation_pct", e))?,
            unit_price: Money::new(unit_price, currency)
                .map_err(|e| IntakeError::invalid_input("unit_price", e))?,
        })
    }

    /// Prices these measurements
    pub fn price(&self) -> Result<PricedIntake, IntakeError> {
        price_intake(
            self.gross_weight,
            self.packaging_weight,
            self.humidity,
            self.target_desiccation,
            self.unit_price,
        )
    }
}

/// Result of pricing one intake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedIntake {
    pub net_before_drying: Weight,
    /// Weight removed by the humidity adjustment (zero if already dry enough)
    pub drying_loss: Weight,
    pub net_weight: Weight,
    pub total_debt: Money,
}

/// Computes net weight and total debt for one intake
///
/// # Errors
///
/// - `InvalidPackaging` if `packaging_weight >= gross_weight`
/// - `InvalidInput` on arithmetic overflow
pub fn price_intake(
    gross_weight: Weight,
    packaging_weight: Weight,
    humidity: Rate,
    target_desiccation: Rate,
    unit_price: Money,
) -> Result<PricedIntake, IntakeError> {
    if packaging_weight >= gross_weight {
        return Err(IntakeError::InvalidPackaging {
            gross: gross_weight.kg(),
            packaging: packaging_weight.kg(),
        });
    }

    let net_before_drying = gross_weight.checked_sub(packaging_weight)?;

    let drying_loss = if humidity > target_desiccation {
        net_before_drying.scale(humidity.as_decimal() - target_desiccation.as_decimal())?
    } else {
        Weight::ZERO
    };
    let net_weight = net_before_drying.checked_sub(drying_loss)?;

    let total_debt = unit_price.multiply_to_currency(net_weight.kg())?;

    Ok(PricedIntake {
        net_before_drying,
        drying_loss,
        net_weight,
        total_debt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn measurements(gross: Decimal, packaging: Decimal, humidity: Decimal, target: Decimal, price: Decimal) -> Measurements {
        Measurements::from_raw(gross, packaging, humidity, target, price, Currency::XOF).unwrap()
    }

    #[test]
    fn test_humidity_adjustment() {
        let priced = measurements(dec!(100), dec!(5), dec!(12), dec!(8), dec!(1000)).price().unwrap();

        assert_eq!(priced.net_before_drying.kg(), dec!(95));
        assert_eq!(priced.drying_loss.kg(), dec!(3.8));
        assert_eq!(priced.net_weight.kg(), dec!(91.2));
        assert_eq!(priced.total_debt.amount(), dec!(91200));
    }

    #[test]
    fn test_no_adjustment_when_dry() {
        let priced = measurements(dec!(100), dec!(5), dec!(7), dec!(8), dec!(10)).price().unwrap();
        assert!(priced.drying_loss.is_zero());
        assert_eq!(priced.net_weight.kg(), dec!(95));
    }

    #[test]
    fn test_packaging_equal_to_gross_rejected() {
        let m = measurements(dec!(10), dec!(10), dec!(12), dec!(8), dec!(10));
        assert!(matches!(m.price(), Err(IntakeError::InvalidPackaging { .. })));
    }

    #[test]
    fn test_negative_input_rejected() {
        let result = Measurements::from_raw(dec!(-1), dec!(0), dec!(0), dec!(0), dec!(0), Currency::XOF);
        assert!(matches!(
            result,
            Err(IntakeError::InvalidInput { field: "gross_weight", .. })
        ));
    }

    #[test]
    fn test_debt_uses_bankers_rounding() {
        // 10.5 kg * 1 = 10.5 -> 10 ; 11.5 kg * 1 = 11.5 -> 12
        let even = measurements(dec!(11.5), dec!(1), dec!(0), dec!(0), dec!(1)).price().unwrap();
        let odd = measurements(dec!(12.5), dec!(1), dec!(0), dec!(0), dec!(1)).price().unwrap();
        assert_eq!(even.total_debt.amount(), dec!(10));
        assert_eq!(odd.total_debt.amount(), dec!(12));
    }

    #[test]
    fn test_debt_rounded_once_from_exact_product() {
        // 0.0501 kg * 0.10 = 0.00501, above the half-cent
        let m = Measurements::from_raw(dec!(1.0501), dec!(1), dec!(0), dec!(0), dec!(0.10), Currency::USD).unwrap();
        assert_eq!(m.price().unwrap().total_debt.amount(), dec!(0.01));
    }
}
