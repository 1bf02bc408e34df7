//! Shared service context and the optimistic commit loop

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use core_kernel::{Clock, Money, MoneyError};
use domain_credit::EligibilityPolicy;

use crate::config::EngineConfig;
use crate::error::{EngineError, Step};
use crate::store::{LedgerStore, UnitOfWork};

/// Collaborators every service needs
pub struct EngineContext {
    pub(crate) store: Arc<dyn LedgerStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) policy: Arc<dyn EligibilityPolicy>,
    pub(crate) config: EngineConfig,
}

impl EngineContext {
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn LedgerStore>,
        clock: Arc<dyn Clock>,
        policy: Arc<dyn EligibilityPolicy>,
    ) -> Self {
        Self {
            store,
            clock,
            policy,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Rejects amounts not expressed in the ledger currency
    pub(crate) fn ensure_currency(&self, amount: &Money) -> Result<(), EngineError> {
        if amount.currency() != self.config.currency {
            return Err(EngineError::Money(MoneyError::CurrencyMismatch(
                amount.currency().to_string(),
                self.config.currency.to_string(),
            )));
        }
        Ok(())
    }

    /// Rejects amounts in another currency or finer than its minor unit
    pub(crate) fn ensure_amount(&self, amount: &Money) -> Result<(), EngineError> {
        self.ensure_currency(amount)?;
        Ok(amount.ensure_currency_precision()?)
    }

    /// Runs `attempt` and commits what it staged
    ///
    /// On a version conflict the whole attempt runs again against fresh reads,
    /// up to `max_commit_retries` times. Any other failure is returned as is.
    pub(crate) fn transact<T, F>(&self, operation: &'static str, attempt: F) -> Result<T, EngineError>
    where
        F: FnMut(&mut UnitOfWork, DateTime<Utc>) -> Result<T, EngineError>,
    {
        self.run(operation, false, attempt)
    }

    /// Like [`transact`](Self::transact), for operations spanning several
    /// entities: a commit failure is reported as an aborted `Commit` step
    pub(crate) fn transact_atomic<T, F>(&self, operation: &'static str, attempt: F) -> Result<T, EngineError>
    where
        F: FnMut(&mut UnitOfWork, DateTime<Utc>) -> Result<T, EngineError>,
    {
        self.run(operation, true, attempt)
    }

    fn run<T, F>(&self, operation: &'static str, composite: bool, mut attempt: F) -> Result<T, EngineError>
    where
        F: FnMut(&mut UnitOfWork, DateTime<Utc>) -> Result<T, EngineError>,
    {
        let mut retries = 0;
        loop {
            let mut unit = UnitOfWork::new();
            let outcome = attempt(&mut unit, self.now())?;

            let err = match self.store.commit(unit) {
                Ok(()) => return Ok(outcome),
                Err(e) => EngineError::from(e),
            };

            if err.is_conflict() && retries < self.config.max_commit_retries {
                retries += 1;
                debug!(operation, retry = retries, error = %err, "Commit conflict, retrying");
                continue;
            }

            warn!(operation, retries, error = %err, "Commit failed");
            return Err(if composite {
                EngineError::aborted(operation, Step::Commit, err)
            } else {
                err
            });
        }
    }
}
