//! Error types for the ingestion and persistence collaborators.
//!
//! The matching engine itself cannot fail; everything here comes from the
//! edges (reading source exports, writing the reconciled list).

use crate::account::SourceSystem;
use std::fmt;
use thiserror::Error;

/// Result type for collaborator operations
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// One field-level rule violation found before persisting an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        FieldViolation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Property: \"{}\", Error: \"{}\"", self.field, self.message)
    }
}

/// All violations for a single account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAccount {
    pub account: String,
    pub violations: Vec<FieldViolation>,
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A source export could not be read or mapped
    #[error("Ingestion from {system} failed: {message}")]
    IngestionFailure {
        system: SourceSystem,
        message: String,
    },

    /// Accounts rejected by validation before anything was written
    #[error("{} account(s) failed validation", .invalid.len())]
    PersistenceValidationFailure { invalid: Vec<InvalidAccount> },

    /// Database operation error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl ReconcileError {
    pub fn ingestion(system: SourceSystem, message: impl Into<String>) -> Self {
        ReconcileError::IngestionFailure {
            system,
            message: message.into(),
        }
    }

    /// Source system tag for ingestion failures
    pub fn source_system(&self) -> Option<SourceSystem> {
        match self {
            ReconcileError::IngestionFailure { system, .. } => Some(*system),
            _ => None,
        }
    }

    /// Per-account violations for validation failures
    pub fn invalid_accounts(&self) -> &[InvalidAccount] {
        match self {
            ReconcileError::PersistenceValidationFailure { invalid } => invalid,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingestion_failure_message() {
        let err = ReconcileError::ingestion(SourceSystem::Crm, "bad header");

        assert_eq!(err.to_string(), "Ingestion from CRM failed: bad header");
        assert_eq!(err.source_system(), Some(SourceSystem::Crm));
        assert!(err.invalid_accounts().is_empty());
    }

    #[test]
    fn test_validation_failure_lists_accounts() {
        let err = ReconcileError::PersistenceValidationFailure {
            invalid: vec![InvalidAccount {
                account: "Acme".to_string(),
                violations: vec![FieldViolation::new("Name", "too long")],
            }],
        };

        assert_eq!(err.to_string(), "1 account(s) failed validation");
        assert_eq!(err.invalid_accounts()[0].violations[0].field, "Name");
        assert_eq!(err.source_system(), None);
        assert_eq!(
            err.invalid_accounts()[0].violations[0].to_string(),
            "Property: \"Name\", Error: \"too long\""
        );
    }

    #[test]
    fn test_database_error_converts() {
        fn query() -> Result<i64> {
            let conn = rusqlite::Connection::open_in_memory()?;
            Ok(conn.query_row("SELECT missing FROM nowhere", [], |row| row.get(0))?)
        }

        let err = query().unwrap_err();
        assert!(matches!(err, ReconcileError::Database(_)));
        assert!(err.to_string().starts_with("Database error:"));
        assert_eq!(err.source_system(), None);
    }
}
