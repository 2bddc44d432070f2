// 🔗 Field Merger - Combine two matched records into one
//
// Left-biased per field: the left record wins whenever it has data.

use crate::account::{is_blank, Account};
use uuid::Uuid;

fn pick(left: &Option<String>, right: &Option<String>) -> Option<String> {
    if is_blank(left) {
        right.clone()
    } else {
        left.clone()
    }
}

/// Merge `left` and `right` into a new record with a fresh identity.
///
/// Every field is chosen independently. `parent_id` is copied as-is; the
/// reconciliation driver re-points it once all merges are known.
pub fn merge_accounts(left: &Account, right: &Account) -> Account {
    Account {
        id: Uuid::new_v4(),
        name: pick(&left.name, &right.name),
        phone: pick(&left.phone, &right.phone),
        email: pick(&left.email, &right.email),
        category: pick(&left.category, &right.category),
        address1: pick(&left.address1, &right.address1),
        address2: pick(&left.address2, &right.address2),
        city: pick(&left.city, &right.city),
        state: pick(&left.state, &right.state),
        zip: pick(&left.zip, &right.zip),
        country: pick(&left.country, &right.country),
        fax: pick(&left.fax, &right.fax),
        description: pick(&left.description, &right.description),
        credit_status: pick(&left.credit_status, &right.credit_status),
        website: pick(&left.website, &right.website),
        owner_id: pick(&left.owner_id, &right.owner_id),
        ad_server_id: if left.ad_server_id == 0 {
            right.ad_server_id
        } else {
            left.ad_server_id
        },
        crm_id: pick(&left.crm_id, &right.crm_id),
        parent_id: left.parent_id.or(right.parent_id),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_merge_independently() {
        let left = Account::new().with_name("Acme").with_phone("");
        let right = Account::new().with_name("").with_phone("555-1234");

        let merged = merge_accounts(&left, &right);

        assert_eq!(merged.name.as_deref(), Some("Acme"));
        assert_eq!(merged.phone.as_deref(), Some("555-1234"));
    }

    #[test]
    fn test_left_wins_when_both_present() {
        let left = Account::new().with_name("Acme Inc").with_email("left@acme.com");
        let right = Account::new().with_name("ACME").with_email("right@acme.com");

        let merged = merge_accounts(&left, &right);

        assert_eq!(merged.name.as_deref(), Some("Acme Inc"));
        assert_eq!(merged.email.as_deref(), Some("left@acme.com"));
    }

    #[test]
    fn test_whitespace_counts_as_empty() {
        let mut left = Account::new();
        left.city = Some("   ".to_string());
        let mut right = Account::new();
        right.city = Some("Springfield".to_string());

        let merged = merge_accounts(&left, &right);
        assert_eq!(merged.city.as_deref(), Some("Springfield"));
    }

    #[test]
    fn test_source_keys_carry_forward() {
        let left = Account::new().with_crm_id("001A000001");
        let right = Account::new().with_ad_server_id(9876);

        let merged = merge_accounts(&left, &right);

        assert_eq!(merged.crm_id.as_deref(), Some("001A000001"));
        assert_eq!(merged.ad_server_id, 9876);

        let both = merge_accounts(&Account::new().with_ad_server_id(1), &right);
        assert_eq!(both.ad_server_id, 1);
    }

    #[test]
    fn test_parent_left_biased() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();

        let mut left = Account::new();
        let mut right = Account::new();
        right.parent_id = Some(p2);

        assert_eq!(merge_accounts(&left, &right).parent_id, Some(p2));

        left.parent_id = Some(p1);
        assert_eq!(merge_accounts(&left, &right).parent_id, Some(p1));
    }

    #[test]
    fn test_merged_record_gets_fresh_id() {
        let left = Account::new();
        let right = Account::new();

        let merged = merge_accounts(&left, &right);

        assert_ne!(merged.id, left.id);
        assert_ne!(merged.id, right.id);
    }

    #[test]
    fn test_no_data_lost() {
        let mut left = Account::new().with_name("Acme");
        left.address1 = Some("1 Main St".to_string());
        left.owner_id = Some("005X".to_string());

        let mut right = Account::new();
        right.description = Some("Display advertiser".to_string());
        right.credit_status = Some("ACTIVE".to_string());
        right.fax = Some("555-0000".to_string());

        let merged = merge_accounts(&left, &right);

        for ((label, merged_value), ((_, l), (_, r))) in merged
            .text_fields()
            .iter()
            .zip(left.text_fields().iter().zip(right.text_fields().iter()))
        {
            if l.is_some() || r.is_some() {
                assert!(merged_value.is_some(), "{} was dropped", label);
            }
        }
    }
}
