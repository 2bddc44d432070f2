// 📥 Ingestion - Source exports → canonical Account records
//
// Each source system gets an adapter implementing `AccountSource`.
// Adapters read already-exported files; no network, no auth, no paging
// against a live API. Every record gets a fresh reconciler UUID.

use crate::account::{Account, SourceSystem};
use crate::error::{ReconcileError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

// ============================================================================
// SOURCE TRAIT
// ============================================================================

/// AccountSource - one implementation per external system
pub trait AccountSource {
    /// Read every account the source exposes, fully materialized
    fn fetch(&self) -> Result<Vec<Account>>;

    /// Which system this adapter reads
    fn system(&self) -> SourceSystem;

    /// Adapter version (for audit events)
    fn version(&self) -> &str {
        "1.0.0"
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

// ============================================================================
// CRM CSV EXPORT
// ============================================================================

/// One row of the CRM account export
///
/// Columns: Id, Name, Phone, Industry, BillingStreet, BillingCity,
/// BillingState, BillingPostalCode, BillingCountry, Fax, Description,
/// Website, OwnerId, ParentId
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CrmAccountRow {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    billing_street: Option<String>,
    #[serde(default)]
    billing_city: Option<String>,
    #[serde(default)]
    billing_state: Option<String>,
    #[serde(default)]
    billing_postal_code: Option<String>,
    #[serde(default)]
    billing_country: Option<String>,
    #[serde(default)]
    fax: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    owner_id: Option<String>,
    #[serde(default)]
    parent_id: Option<String>,
}

impl CrmAccountRow {
    fn into_account(self) -> Account {
        Account {
            name: self.name,
            phone: self.phone,
            category: self.industry,
            address1: self.billing_street,
            city: self.billing_city,
            state: self.billing_state,
            zip: self.billing_postal_code,
            country: self.billing_country,
            fax: self.fax,
            description: self.description,
            website: self.website,
            owner_id: self.owner_id,
            crm_id: Some(self.id),
            ..Account::new()
        }
    }
}

pub struct CrmCsvSource {
    path: PathBuf,
}

impl CrmCsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CrmCsvSource { path: path.into() }
    }

    /// Map rows to accounts, then turn CRM parent keys into reconciler UUIDs
    fn map_rows(rows: Vec<CrmAccountRow>) -> Vec<Account> {
        let parents: Vec<Option<String>> = rows.iter().map(|r| r.parent_id.clone()).collect();
        let mut accounts: Vec<Account> = rows.into_iter().map(CrmAccountRow::into_account).collect();

        let ids_by_key: HashMap<String, Uuid> = accounts
            .iter()
            .filter_map(|a| a.crm_id.clone().map(|key| (key, a.id)))
            .collect();

        for (account, parent_key) in accounts.iter_mut().zip(parents) {
            let Some(parent_key) = parent_key else {
                continue;
            };

            match ids_by_key.get(&parent_key) {
                Some(parent_id) => account.parent_id = Some(*parent_id),
                None => warn!(
                    account = account.display_name(),
                    parent = %parent_key,
                    "CRM parent not present in export, leaving unset"
                ),
            }
        }

        accounts
    }
}

impl AccountSource for CrmCsvSource {
    fn fetch(&self) -> Result<Vec<Account>> {
        let system = self.system();
        let filename = file_name(&self.path);

        let file = File::open(&self.path).map_err(|e| {
            ReconcileError::ingestion(system, format!("Failed to open {}: {}", self.path.display(), e))
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut rows = Vec::new();
        for (line_num, result) in reader.deserialize::<CrmAccountRow>().enumerate() {
            let row = result.map_err(|e| {
                ReconcileError::ingestion(
                    system,
                    // +2 because: 1-indexed + header row
                    format!("Failed to parse CSV line {} in {}: {}", line_num + 2, filename, e),
                )
            })?;
            rows.push(row);
        }

        let accounts = Self::map_rows(rows);
        info!(source = system.code(), count = accounts.len(), "loaded accounts from {}", filename);
        Ok(accounts)
    }

    fn system(&self) -> SourceSystem {
        SourceSystem::Crm
    }
}

// ============================================================================
// AD-SERVER COMPANY PAGES
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Company {
    id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    primary_phone: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    fax_phone: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    credit_status: Option<String>,
}

impl Company {
    fn into_account(self) -> Account {
        Account {
            name: self.name,
            phone: self.primary_phone,
            email: self.email,
            fax: self.fax_phone,
            description: self.comment,
            address1: self.address,
            credit_status: self.credit_status,
            ad_server_id: self.id,
            ..Account::new()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyPage {
    #[serde(default)]
    start_index: usize,
    #[serde(default)]
    total_result_set_size: usize,
    #[serde(default)]
    results: Vec<Company>,
}

/// A dump is either a list of pages or a single page
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CompanyExport {
    Pages(Vec<CompanyPage>),
    Single(CompanyPage),
}

pub struct AdServerJsonSource {
    path: PathBuf,
}

impl AdServerJsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        AdServerJsonSource { path: path.into() }
    }

    /// Walk pages in order until the reported result set size is reached
    fn collect_pages(pages: Vec<CompanyPage>) -> Vec<Account> {
        let mut accounts = Vec::new();
        let mut offset = 0;

        for page in pages {
            if page.start_index != offset {
                warn!(
                    expected = offset,
                    start_index = page.start_index,
                    "ad-server page out of sequence"
                );
            }

            if page.results.is_empty() {
                debug!(start_index = page.start_index, "skipping empty ad-server page");
                continue;
            }

            offset += page.results.len();
            accounts.extend(page.results.into_iter().map(Company::into_account));

            if offset >= page.total_result_set_size {
                break;
            }
        }

        accounts
    }
}

impl AccountSource for AdServerJsonSource {
    fn fetch(&self) -> Result<Vec<Account>> {
        let system = self.system();

        let file = File::open(&self.path).map_err(|e| {
            ReconcileError::ingestion(system, format!("Failed to open {}: {}", self.path.display(), e))
        })?;

        let export: CompanyExport = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            ReconcileError::ingestion(
                system,
                format!("Failed to parse company pages from {}: {}", self.path.display(), e),
            )
        })?;

        let pages = match export {
            CompanyExport::Pages(pages) => pages,
            CompanyExport::Single(page) => vec![page],
        };

        let accounts = Self::collect_pages(pages);
        info!(
            source = system.code(),
            count = accounts.len(),
            "loaded accounts from {}",
            file_name(&self.path)
        );
        Ok(accounts)
    }

    fn system(&self) -> SourceSystem {
        SourceSystem::AdServer
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const CRM_HEADER: &str = "Id,Name,Phone,Industry,BillingStreet,BillingCity,BillingState,BillingPostalCode,BillingCountry,Fax,Description,Website,OwnerId,ParentId\n";

    #[test]
    fn test_crm_rows_map_to_accounts() {
        let csv = format!(
            "{}{}",
            CRM_HEADER,
            "001A,Acme Inc,555-1234,Retail,1 Main St,Springfield,IL,62701,USA,555-0000,Widgets,acme.com,005X,\n"
        );
        let file = write_temp(&csv);

        let accounts = CrmCsvSource::new(file.path()).fetch().unwrap();

        assert_eq!(accounts.len(), 1);
        let acme = &accounts[0];
        assert_eq!(acme.name.as_deref(), Some("Acme Inc"));
        assert_eq!(acme.category.as_deref(), Some("Retail"));
        assert_eq!(acme.zip.as_deref(), Some("62701"));
        assert_eq!(acme.website.as_deref(), Some("acme.com"));
        assert_eq!(acme.owner_id.as_deref(), Some("005X"));
        assert_eq!(acme.crm_id.as_deref(), Some("001A"));
        assert_eq!(acme.email, None);
        assert_eq!(acme.parent_id, None);
        assert_eq!(acme.ad_server_id, 0);
    }

    #[test]
    fn test_crm_parent_keys_become_uuids() {
        let csv = format!(
            "{}{}{}{}",
            CRM_HEADER,
            "002B,Acme West,,,,,,,,,,,,001A\n",
            "001A,Acme Holdings,,,,,,,,,,,,\n",
            "003C,Orphan Co,,,,,,,,,,,,999Z\n"
        );
        let file = write_temp(&csv);

        let accounts = CrmCsvSource::new(file.path()).fetch().unwrap();

        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[0].parent_id, Some(accounts[1].id));
        assert_eq!(accounts[1].parent_id, None);
        // parent missing from the export
        assert_eq!(accounts[2].parent_id, None);
    }

    #[test]
    fn test_crm_missing_file_is_ingestion_failure() {
        let err = CrmCsvSource::new("/no/such/export.csv").fetch().unwrap_err();
        assert_eq!(err.source_system(), Some(SourceSystem::Crm));
    }

    #[test]
    fn test_crm_missing_id_column_fails() {
        let file = write_temp("Name,Phone\nAcme,555\n");
        let err = CrmCsvSource::new(file.path()).fetch().unwrap_err();

        assert!(matches!(err, ReconcileError::IngestionFailure { .. }));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_ad_server_pages_are_concatenated() {
        let json = r#"[
            { "startIndex": 0, "totalResultSetSize": 3, "results": [
                { "id": 11, "name": "Acme", "email": "a@x.com", "primaryPhone": "555-1234" },
                { "id": 12, "name": "Globex", "creditStatus": "ACTIVE" }
            ]},
            { "startIndex": 2, "totalResultSetSize": 3, "results": [
                { "id": 13, "name": "Initech", "address": "9 Office Park", "comment": "print", "faxPhone": "555-9" }
            ]}
        ]"#;
        let file = write_temp(json);

        let accounts = AdServerJsonSource::new(file.path()).fetch().unwrap();

        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[0].ad_server_id, 11);
        assert_eq!(accounts[0].phone.as_deref(), Some("555-1234"));
        assert_eq!(accounts[1].credit_status.as_deref(), Some("ACTIVE"));
        assert_eq!(accounts[2].address1.as_deref(), Some("9 Office Park"));
        assert_eq!(accounts[2].description.as_deref(), Some("print"));
        assert_eq!(accounts[2].fax.as_deref(), Some("555-9"));
        assert_eq!(accounts[2].crm_id, None);
    }

    #[test]
    fn test_ad_server_stops_at_total() {
        let json = r#"[
            { "startIndex": 0, "totalResultSetSize": 1, "results": [ { "id": 1, "name": "A" } ] },
            { "startIndex": 1, "totalResultSetSize": 1, "results": [ { "id": 2, "name": "Stale" } ] }
        ]"#;
        let file = write_temp(json);

        let accounts = AdServerJsonSource::new(file.path()).fetch().unwrap();
        assert_eq!(accounts.len(), 1);
    }

    #[test]
    fn test_ad_server_empty_page_below_total_is_skipped() {
        let json = r#"[
            { "startIndex": 0, "totalResultSetSize": 2, "results": [ { "id": 1, "name": "A" } ] },
            { "startIndex": 1, "totalResultSetSize": 2, "results": [] },
            { "startIndex": 1, "totalResultSetSize": 2, "results": [ { "id": 2, "name": "B" } ] }
        ]"#;
        let file = write_temp(json);

        let accounts = AdServerJsonSource::new(file.path()).fetch().unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[1].ad_server_id, 2);
    }

    #[test]
    fn test_ad_server_single_page() {
        let json = r#"{ "totalResultSetSize": 1, "results": [ { "id": 7, "name": "Solo" } ] }"#;
        let file = write_temp(json);

        let accounts = AdServerJsonSource::new(file.path()).fetch().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].name.as_deref(), Some("Solo"));
    }

    #[test]
    fn test_ad_server_bad_json_is_ingestion_failure() {
        let file = write_temp("{ not json");
        let err = AdServerJsonSource::new(file.path()).fetch().unwrap_err();

        assert_eq!(err.source_system(), Some(SourceSystem::AdServer));
    }

    #[test]
    fn test_every_ingested_account_has_fresh_id() {
        let json = r#"[{ "totalResultSetSize": 2, "results": [ { "id": 1 }, { "id": 2 } ] }]"#;
        let file = write_temp(json);

        let accounts = AdServerJsonSource::new(file.path()).fetch().unwrap();
        assert_ne!(accounts[0].id, accounts[1].id);
    }
}
