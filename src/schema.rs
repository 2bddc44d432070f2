// 📐 Shape Layer - Account validation before persistence
// Collects every field violation instead of stopping at the first one

use crate::account::Account;
use crate::error::FieldViolation;

/// Default maximum length for short text columns
pub const MAX_TEXT_LEN: usize = 255;

/// Maximum length for the free-text description
pub const MAX_DESCRIPTION_LEN: usize = 4000;

pub struct AccountValidator {
    max_text_len: usize,
    max_description_len: usize,
}

impl AccountValidator {
    pub fn new() -> Self {
        AccountValidator {
            max_text_len: MAX_TEXT_LEN,
            max_description_len: MAX_DESCRIPTION_LEN,
        }
    }

    /// Empty result = valid
    pub fn validate(&self, account: &Account) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        match account.name.as_deref() {
            Some(name) if !name.trim().is_empty() => {}
            _ => violations.push(FieldViolation::new("Name", "Required field is empty")),
        }

        for (field, value) in account.text_fields() {
            let Some(value) = value else {
                continue;
            };

            let limit = if field == "Description" {
                self.max_description_len
            } else {
                self.max_text_len
            };

            let len = value.chars().count();
            if len > limit {
                violations.push(FieldViolation::new(
                    field,
                    format!("Must be at most {} characters, got {}", limit, len),
                ));
            }
        }

        if let Some(email) = account.email.as_deref() {
            if !email.trim().is_empty() && !email.contains('@') {
                violations.push(FieldViolation::new(
                    "Email",
                    format!("Not a valid email address: {}", email),
                ));
            }
        }

        if let Some(website) = account.website.as_deref() {
            let lower = website.to_lowercase();
            if !website.trim().is_empty()
                && !lower.starts_with("http://")
                && !lower.starts_with("https://")
            {
                violations.push(FieldViolation::new(
                    "Website",
                    format!("Must be an absolute http(s) URL, got {}", website),
                ));
            }
        }

        if account.parent_id == Some(account.id) {
            violations.push(FieldViolation::new("ParentId", "Account cannot be its own parent"));
        }

        violations
    }
}

impl Default for AccountValidator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
