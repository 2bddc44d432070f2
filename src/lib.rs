// Account Reconciler - Core Library
// Matching engine (score → decide → merge → sanitize) plus the ingestion,
// resolver and persistence collaborators used by the CLI.

pub mod account;
pub mod config;
pub mod scoring;
pub mod policy;
pub mod merge;
pub mod sanitize;
pub mod reconciliation;
pub mod error;
pub mod ingest;
pub mod schema;
pub mod db;
pub mod console;

// Re-export commonly used types
pub use account::{Account, SourceSystem};
pub use config::MatchConfig;
pub use scoring::{score, MatchScorer, NameMatch, ScoreBreakdown};
pub use policy::{MergeDecision, MergePolicy, MergeResolver, ScriptedResolver, Verdict};
pub use merge::merge_accounts;
pub use sanitize::{sanitize_account, sanitized};
pub use reconciliation::{reconcile, MergeStats, ReconciliationEngine, ReconciliationReport};
pub use error::{FieldViolation, InvalidAccount, ReconcileError};
pub use ingest::{AccountSource, AdServerJsonSource, CrmCsvSource};
pub use schema::AccountValidator;
pub use db::{
    count_accounts, find_account, get_events_for_account, load_accounts, save_accounts,
    setup_database, validate_accounts, Event,
};
pub use console::ConsoleResolver;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
