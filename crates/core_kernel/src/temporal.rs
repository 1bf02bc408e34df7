//! Clocks and validity windows
//!
//! The ledger never reads the wall clock directly. Services receive a [`Clock`]
//! so that overdue checks and timestamps are reproducible in tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;

/// Errors related to temporal values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Validity window must be positive, got {0} {1}")]
    NonPositiveWindow(i64, ValidityUnit),

    #[error("Validity window too large: {0} {1}")]
    WindowOverflow(i64, ValidityUnit),
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
///
/// Stores milliseconds since the epoch so it can be shared across threads.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at `start`
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// Moves the clock to `instant`
    pub fn set(&self, instant: DateTime<Utc>) {
        self.millis.store(instant.timestamp_millis(), Ordering::SeqCst);
    }

    /// Moves the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.load(Ordering::SeqCst);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Unit in which raw validity values are entered by operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidityUnit {
    Hours,
    Minutes,
}

impl ValidityUnit {
    fn seconds(&self) -> i64 {
        match self {
            ValidityUnit::Hours => 3_600,
            ValidityUnit::Minutes => 60,
        }
    }
}

impl fmt::Display for ValidityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidityUnit::Hours => write!(f, "hours"),
            ValidityUnit::Minutes => write!(f, "minutes"),
        }
    }
}

/// How long a pending advance may wait for confirmation before it is flagged
///
/// Stored as whole seconds. Raw input is converted once, at the boundary,
/// through [`ValidityWindow::from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidityWindow {
    seconds: i64,
}

impl ValidityWindow {
    /// Converts an operator-entered value in the given unit
    pub fn from_raw(value: i64, unit: ValidityUnit) -> Result<Self, TemporalError> {
        if value <= 0 {
            return Err(TemporalError::NonPositiveWindow(value, unit));
        }
        let seconds = value
            .checked_mul(unit.seconds())
            .ok_or(TemporalError::WindowOverflow(value, unit))?;
        // chrono durations cap at i64::MAX milliseconds
        if seconds > i64::MAX / 1_000 {
            return Err(TemporalError::WindowOverflow(value, unit));
        }
        Ok(Self { seconds })
    }

    pub fn hours(value: i64) -> Result<Self, TemporalError> {
        Self::from_raw(value, ValidityUnit::Hours)
    }

    pub fn minutes(value: i64) -> Result<Self, TemporalError> {
        Self::from_raw(value, ValidityUnit::Minutes)
    }

    pub fn as_seconds(&self) -> i64 {
        self.seconds
    }

    pub fn as_duration(&self) -> Duration {
        Duration::seconds(self.seconds)
    }

    /// Instant at which a window opened at `start` elapses
    pub fn deadline_from(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start
            .checked_add_signed(self.as_duration())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
