// 🗄️ Persistence - Reconciled accounts → SQLite (WAL) with an audit trail
//
// All-or-nothing: every account is validated before the first INSERT, and
// the inserts run in one transaction.

use crate::account::Account;
use crate::error::{InvalidAccount, ReconcileError, Result};
use crate::schema::AccountValidator;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

/// Event for audit trail
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(event_type: &str, entity_id: &str, data: serde_json::Value, actor: &str) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

/// Fingerprint of the identifying fields (name, email, phone, source keys)
pub fn content_hash(account: &Account) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{}|{}|{}|{}|{}",
        account.name.as_deref().unwrap_or(""),
        account.email.as_deref().unwrap_or(""),
        account.phone.as_deref().unwrap_or(""),
        account.crm_id.as_deref().unwrap_or(""),
        account.ad_server_id
    ));
    format!("{:x}", hasher.finalize())
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS accounts (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            phone TEXT,
            email TEXT,
            category TEXT,
            address1 TEXT,
            address2 TEXT,
            city TEXT,
            state TEXT,
            zip TEXT,
            country TEXT,
            fax TEXT,
            description TEXT,
            credit_status TEXT,
            ad_server_id INTEGER NOT NULL DEFAULT 0,
            crm_id TEXT,
            website TEXT,
            owner_id TEXT,
            parent_id TEXT,
            content_hash TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_accounts_parent ON accounts(parent_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_id)",
        [],
    )?;

    Ok(())
}

/// Validate every account; collect all failures
pub fn validate_accounts(accounts: &[Account]) -> Vec<InvalidAccount> {
    let validator = AccountValidator::new();

    accounts
        .iter()
        .filter_map(|account| {
            let violations = validator.validate(account);
            if violations.is_empty() {
                None
            } else {
                Some(InvalidAccount {
                    account: account.display_name().to_string(),
                    violations,
                })
            }
        })
        .collect()
}

/// Persist the reconciled list. Nothing is written if any account is invalid.
pub fn save_accounts(conn: &mut Connection, accounts: &[Account]) -> Result<usize> {
    let invalid = validate_accounts(accounts);
    if !invalid.is_empty() {
        return Err(ReconcileError::PersistenceValidationFailure { invalid });
    }

    let tx = conn.transaction()?;

    for account in accounts {
        tx.execute(
            "INSERT INTO accounts (
                id, name, phone, email, category, address1, address2, city, state,
                zip, country, fax, description, credit_status, ad_server_id, crm_id,
                website, owner_id, parent_id, content_hash
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
            params![
                account.id.to_string(),
                account.name,
                account.phone,
                account.email,
                account.category,
                account.address1,
                account.address2,
                account.city,
                account.state,
                account.zip,
                account.country,
                account.fax,
                account.description,
                account.credit_status,
                account.ad_server_id,
                account.crm_id,
                account.website,
                account.owner_id,
                account.parent_id.map(|p| p.to_string()),
                content_hash(account),
            ],
        )?;

        let event = Event::new(
            "account_reconciled",
            &account.id.to_string(),
            serde_json::json!({
                "name": account.name,
                "crm_id": account.crm_id,
                "ad_server_id": account.ad_server_id,
            }),
            "reconciler",
        );
        insert_event(&tx, &event)?;
    }

    tx.commit()?;

    info!(count = accounts.len(), "persisted reconciled accounts");
    Ok(accounts.len())
}

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_id,
            event.data.to_string(),
            event.actor,
        ],
    )?;

    Ok(())
}

/// Get events for a specific account
pub fn get_events_for_account(conn: &Connection, entity_id: &str) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_id, data, actor
         FROM events
         WHERE entity_id = ?1
         ORDER BY timestamp DESC",
    )?;

    let events = stmt
        .query_map(params![entity_id], |row| {
            let timestamp_str: String = row.get(1)?;
            let data_json: String = row.get(4)?;

            Ok(Event {
                event_id: row.get(0)?,
                timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?
                    .with_timezone(&Utc),
                event_type: row.get(2)?,
                entity_id: row.get(3)?,
                data: serde_json::from_str(&data_json)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?,
                actor: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(events)
}

fn parse_uuid(idx: usize, value: String) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    let parent: Option<String> = row.get(18)?;

    Ok(Account {
        id: parse_uuid(0, row.get(0)?)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        category: row.get(4)?,
        address1: row.get(5)?,
        address2: row.get(6)?,
        city: row.get(7)?,
        state: row.get(8)?,
        zip: row.get(9)?,
        country: row.get(10)?,
        fax: row.get(11)?,
        description: row.get(12)?,
        credit_status: row.get(13)?,
        ad_server_id: row.get(14)?,
        crm_id: row.get(15)?,
        website: row.get(16)?,
        owner_id: row.get(17)?,
        parent_id: parent.map(|p| parse_uuid(18, p)).transpose()?,
    })
}

const ACCOUNT_COLUMNS: &str = "id, name, phone, email, category, address1, address2, city, state,
     zip, country, fax, description, credit_status, ad_server_id, crm_id,
     website, owner_id, parent_id";

/// All persisted accounts in insertion order
pub fn load_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM accounts ORDER BY rowid",
        ACCOUNT_COLUMNS
    ))?;

    let accounts = stmt
        .query_map([], row_to_account)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(accounts)
}

pub fn find_account(conn: &Connection, id: Uuid) -> Result<Option<Account>> {
    let account = conn
        .query_row(
            &format!("SELECT {} FROM accounts WHERE id = ?1", ACCOUNT_COLUMNS),
            params![id.to_string()],
            row_to_account,
        )
        .optional()?;

    Ok(account)
}

pub fn count_accounts(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?;

    Ok(count)
}
