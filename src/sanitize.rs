// 🧹 Sanitizer - Field normalization applied to every output record

use crate::account::{is_blank, Account};

const URL_PREFIX: &str = "http://";

/// Normalize an account in place. Idempotent.
///
/// Rules:
/// - website: prepend "http://" unless it already starts with it (any case)
pub fn sanitize_account(account: &mut Account) {
    if is_blank(&account.website) {
        return;
    }

    if let Some(website) = account.website.as_mut() {
        if !website.to_lowercase().starts_with(URL_PREFIX) {
            website.insert_str(0, URL_PREFIX);
        }
    }
}

/// Owned variant for use in iterator chains
pub fn sanitized(mut account: Account) -> Account {
    sanitize_account(&mut account);
    account
}

// ============================================================================
// TESTS
// ============================================================================
