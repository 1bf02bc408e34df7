//! Tracing setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::EngineConfig;

/// Installs the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `level`. Returns `false` when a
/// subscriber was already installed, which is not an error: tests and
/// embedding applications may have set one up first.
pub fn init_tracing(level: &str, json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},ledger_engine={level}")));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    installed.is_ok()
}

/// Installs tracing from the engine configuration
pub fn init_from_config(config: &EngineConfig) -> bool {
    init_tracing(&config.log_level, config.log_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        init_tracing("debug", false);
        assert!(!init_tracing("info", true));
    }
}
