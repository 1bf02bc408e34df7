//! Environment-driven configuration
//!
//! Kept in its own test binary: these tests mutate process environment.

use rust_decimal_macros::dec;

use core_kernel::{Currency, ValidityUnit};
use ledger_engine::{EngineConfig, LedgerEngine};

const VARS: [(&str, &str); 4] = [
    ("LEDGER_ADVANCE_VALIDITY_UNIT", "minutes"),
    ("LEDGER_PENDING_ADVANCE_THRESHOLD", "250000"),
    ("LEDGER_MAX_COMMIT_RETRIES", "5"),
    ("LEDGER_LOG_JSON", "true"),
];

#[test]
fn test_environment_overrides_defaults() {
    for (key, value) in VARS {
        std::env::set_var(key, value);
    }

    let config = EngineConfig::from_env().unwrap();
    assert_eq!(config.currency, Currency::XOF);
    assert_eq!(config.advance_validity_unit, ValidityUnit::Minutes);
    assert_eq!(config.pending_advance_threshold, dec!(250000));
    assert_eq!(config.max_commit_retries, 5);
    assert!(config.log_json);

    let engine = LedgerEngine::in_memory(config).unwrap();
    assert_eq!(engine.advances().validity_from_raw(30).unwrap().as_seconds(), 1_800);

    std::env::set_var("LEDGER_MAX_COMMIT_RETRIES", "0");
    assert!(EngineConfig::from_env().is_err());

    for (key, _) in VARS {
        std::env::remove_var(key);
    }
    assert_eq!(EngineConfig::from_env().unwrap(), EngineConfig::default());
}

#[test]
fn test_invalid_config_refused_by_engine() {
    let config = EngineConfig {
        log_level: String::new(),
        ..EngineConfig::default()
    };
    assert!(LedgerEngine::in_memory(config).is_err());
}
