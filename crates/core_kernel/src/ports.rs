//! Ports and Adapters Infrastructure
//!
//! The ledger engine talks to persistence through port traits so that the
//! in-memory adapter used in tests and a transactional database adapter are
//! interchangeable.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Ledger Engine Services                    │
//! │   (AdvanceLedger, IntakeRegistry, SettlementLedger, ...)     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Port Traits (LedgerStore)                   │
//! └─────────────────────────────────────────────────────────────┘
//!                    ▲                         ▲
//!         ┌─────────┴─────────┐     ┌────────┴────────┐
//!         │  In-memory adapter│     │ Transactional DB │
//!         └───────────────────┘     └──────────────────┘
//! ```

use std::fmt;
use thiserror::Error;

use crate::error::ErrorKind;

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The operation conflicts with existing data (stale version, duplicate key)
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if a retry of the whole operation may succeed
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PortError::NotFound { .. } => ErrorKind::NotFound,
            PortError::Conflict { .. } => ErrorKind::Conflict,
            PortError::Internal { .. } => ErrorKind::Storage,
        }
    }
}

/// Marker trait for all domain ports
///
/// Ports are shared between threads behind `Arc<dyn ...>`.
pub trait DomainPort: Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("Advance", "ADV-123");
        assert!(error.is_not_found());
        assert!(!error.is_conflict());
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert!(error.to_string().contains("ADV-123"));
    }

    #[test]
    fn test_port_error_conflict() {
        let error = PortError::conflict("stale version for STL-1");
        assert!(error.is_conflict());
        assert_eq!(error.kind(), ErrorKind::Conflict);
    }
}
