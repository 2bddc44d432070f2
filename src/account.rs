// 🏢 Account Record - Canonical representation every source converts into
//
// Both the CRM export and the ad-server company pages are mapped onto this
// flat record. Identity is a reconciler-owned UUID, independent of the
// source-system keys (crm_id / ad_server_id).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// SOURCE SYSTEM
// ============================================================================

/// Which external system a record (or a failure) came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceSystem {
    /// CRM account export
    Crm,

    /// Ad-serving platform company export
    AdServer,
}

impl SourceSystem {
    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            SourceSystem::Crm => "CRM",
            SourceSystem::AdServer => "Ad Server",
        }
    }

    /// Short code for logs and audit events
    pub fn code(&self) -> &'static str {
        match self {
            SourceSystem::Crm => "crm",
            SourceSystem::AdServer => "ad_server",
        }
    }
}

impl fmt::Display for SourceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// ACCOUNT RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    // ========================================================================
    // IDENTITY (reconciler-owned, never a source key)
    // ========================================================================
    /// Fresh UUID assigned at ingestion and again on merge
    pub id: Uuid,

    // ========================================================================
    // CONTACT & CLASSIFICATION
    // ========================================================================
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,

    /// Industry / category label
    pub category: Option<String>,

    // ========================================================================
    // ADDRESS
    // ========================================================================
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,

    // ========================================================================
    // MISC VALUES
    // ========================================================================
    pub fax: Option<String>,
    pub description: Option<String>,
    pub credit_status: Option<String>,
    pub website: Option<String>,

    /// Owning user in the CRM
    pub owner_id: Option<String>,

    // ========================================================================
    // SOURCE KEYS
    // ========================================================================
    /// Ad-server company id (0 = not from the ad server)
    #[serde(default)]
    pub ad_server_id: i64,

    /// CRM record id
    pub crm_id: Option<String>,

    // ========================================================================
    // RELATIONSHIPS
    // ========================================================================
    /// Parent account, always a reconciler UUID (never a source key)
    pub parent_id: Option<Uuid>,
}

impl Account {
    /// Create an empty account with a fresh identity
    pub fn new() -> Self {
        Account {
            id: Uuid::new_v4(),
            name: None,
            phone: None,
            email: None,
            category: None,
            address1: None,
            address2: None,
            city: None,
            state: None,
            zip: None,
            country: None,
            fax: None,
            description: None,
            credit_status: None,
            website: None,
            owner_id: None,
            ad_server_id: 0,
            crm_id: None,
            parent_id: None,
        }
    }

    /// Builder pattern: set name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder pattern: set phone
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Builder pattern: set email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Builder pattern: set website
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// Builder pattern: set CRM key
    pub fn with_crm_id(mut self, crm_id: impl Into<String>) -> Self {
        self.crm_id = Some(crm_id.into());
        self
    }

    /// Builder pattern: set ad-server key
    pub fn with_ad_server_id(mut self, ad_server_id: i64) -> Self {
        self.ad_server_id = ad_server_id;
        self
    }

    pub fn has_parent(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Name for prompts and error messages
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "<unnamed>",
        }
    }

    /// All free-text fields in declaration order, with their labels
    pub fn text_fields(&self) -> [(&'static str, Option<&str>); 16] {
        [
            ("Name", self.name.as_deref()),
            ("Phone", self.phone.as_deref()),
            ("Email", self.email.as_deref()),
            ("Category", self.category.as_deref()),
            ("Address1", self.address1.as_deref()),
            ("Address2", self.address2.as_deref()),
            ("City", self.city.as_deref()),
            ("State", self.state.as_deref()),
            ("Zip", self.zip.as_deref()),
            ("Country", self.country.as_deref()),
            ("Fax", self.fax.as_deref()),
            ("Description", self.description.as_deref()),
            ("CreditStatus", self.credit_status.as_deref()),
            ("CrmId", self.crm_id.as_deref()),
            ("Website", self.website.as_deref()),
            ("OwnerId", self.owner_id.as_deref()),
        ]
    }

    /// One `Label value` line per field, used by the resolution prompt
    pub fn describe(&self) -> String {
        let mut out = format!("Id {}\n", self.id);

        for (label, value) in self.text_fields() {
            out.push_str(label);
            out.push(' ');
            out.push_str(value.unwrap_or(""));
            out.push('\n');
        }

        out.push_str("AdServerId ");
        if self.ad_server_id != 0 {
            out.push_str(&self.ad_server_id.to_string());
        }
        out.push('\n');

        out.push_str("ParentId ");
        if let Some(parent) = self.parent_id {
            out.push_str(&parent.to_string());
        }
        out.push('\n');

        out
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new()
    }
}

/// True when the value is absent, empty, or whitespace only
pub fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

// ============================================================================
// TESTS
// ============================================================================
