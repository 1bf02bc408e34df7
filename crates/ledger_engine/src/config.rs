//! Engine configuration
//!
//! Values come from built-in defaults overlaid by `LEDGER_*` environment
//! variables (a `.env` file is loaded first when present):
//!
//! * `LEDGER_CURRENCY` - ledger currency (default: XOF)
//! * `LEDGER_ADVANCE_VALIDITY_UNIT` - `hours` or `minutes` (default: hours)
//! * `LEDGER_PENDING_ADVANCE_THRESHOLD` - pending total above which a supplier
//!   may not register intakes (default: 0)
//! * `LEDGER_MAX_COMMIT_RETRIES` - retries on a version conflict, 1 to 20 (default: 3)
//! * `LEDGER_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! * `LEDGER_LOG_JSON` - JSON log output (default: false)

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use core_kernel::{CoreError, Currency, Money, ValidityUnit};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct EngineConfig {
    /// Currency of every amount the engine accepts
    pub currency: Currency,
    /// Unit of operator-entered advance validity values
    pub advance_validity_unit: ValidityUnit,
    /// Eligibility threshold on a supplier's pending advances
    #[validate(custom(function = "validate_non_negative"))]
    pub pending_advance_threshold: Decimal,
    /// Optimistic-concurrency retries before a conflict is reported
    #[validate(range(min = 1, max = 20))]
    pub max_commit_retries: u32,
    /// Default tracing filter
    #[validate(length(min = 1))]
    pub log_level: String,
    /// Emit logs as JSON
    pub log_json: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency: Currency::XOF,
            advance_validity_unit: ValidityUnit::Hours,
            pending_advance_threshold: Decimal::ZERO,
            max_commit_retries: 3,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative_threshold"));
    }
    Ok(())
}

impl EngineConfig {
    /// A config builder seeded with the defaults
    ///
    /// Callers add their own sources on top before building.
    pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, CoreError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("currency", defaults.currency.code())
            .and_then(|b| b.set_default("advance_validity_unit", defaults.advance_validity_unit.to_string()))
            .and_then(|b| b.set_default("pending_advance_threshold", defaults.pending_advance_threshold.to_string()))
            .and_then(|b| b.set_default("max_commit_retries", i64::from(defaults.max_commit_retries)))
            .and_then(|b| b.set_default("log_level", defaults.log_level))
            .and_then(|b| b.set_default("log_json", defaults.log_json))
            .map_err(|e| CoreError::configuration(e.to_string()))
    }

    /// Loads configuration from the environment
    pub fn from_env() -> Result<Self, CoreError> {
        dotenvy::dotenv().ok();

        let builder = Self::builder_with_defaults()?
            .add_source(Environment::with_prefix("LEDGER").try_parsing(true));
        Self::from_config(builder.build().map_err(|e| CoreError::configuration(e.to_string()))?)
    }

    /// Deserializes and validates an already-built configuration
    pub fn from_config(config: Config) -> Result<Self, CoreError> {
        let engine: EngineConfig = config
            .try_deserialize()
            .map_err(|e| CoreError::configuration(e.to_string()))?;
        engine.check()?;
        Ok(engine)
    }

    /// Runs the field validations
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::configuration(e.to_string()))
    }

    /// The eligibility threshold as money in the ledger currency
    pub fn pending_threshold(&self) -> Result<Money, CoreError> {
        Money::new(self.pending_advance_threshold, self.currency).map_err(CoreError::from)
    }
}
