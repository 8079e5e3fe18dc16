//! Login gate: plain exact-match credentials against the customer table.
//! Deliberately unhardened; there is nothing secret in the dataset.

use crate::customers::CustomerTable;
use crate::domain::customer::CustomerId;

/// Check a customer id / date-of-birth pair. The id is canonicalized before
/// lookup; the date of birth must equal the record's `DD-MM-YYYY` display
/// string exactly.
pub fn authenticate(table: &CustomerTable, customer_id: &str, dob: &str) -> bool {
    verify_credentials(table, customer_id, dob).is_some()
}

/// Like [`authenticate`], but hands back the canonical id so the session
/// stores the table's spelling rather than the user's.
pub fn verify_credentials(
    table: &CustomerTable,
    customer_id: &str,
    dob: &str,
) -> Option<CustomerId> {
    let id = CustomerId::new(customer_id);
    if id.is_empty() {
        return None;
    }

    let record = table.find(&id)?;
    (record.dob_display().as_deref() == Some(dob.trim())).then_some(id)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{authenticate, verify_credentials};
    use crate::customers::CustomerTable;
    use crate::domain::customer::{CustomerId, CustomerRecord};

    fn record(id: &str, dob: Option<NaiveDate>) -> CustomerRecord {
        CustomerRecord {
            id: CustomerId::new(id),
            dob,
            gender: None,
            location: None,
            account_balance: None,
            loan_type: None,
            credit_cardtype: None,
            investment_type: None,
            savings_plan_type: None,
            cluster: None,
        }
    }

    fn table() -> CustomerTable {
        CustomerTable::from_records(vec![
            record("C5841053", NaiveDate::from_ymd_opt(1994, 1, 10)),
            record("C1010011", None),
        ])
    }

    #[test]
    fn matching_credentials_authenticate() {
        assert!(authenticate(&table(), "C5841053", "10-01-1994"));
    }

    #[test]
    fn id_lookup_ignores_case_and_whitespace_and_returns_canonical_form() {
        let id = verify_credentials(&table(), " c5841053 ", "10-01-1994").expect("valid login");
        assert_eq!(id.as_str(), "C5841053");
    }

    #[test]
    fn wrong_dob_or_unknown_id_fails() {
        assert!(!authenticate(&table(), "C5841053", "11-01-1994"));
        assert!(!authenticate(&table(), "C0000000", "10-01-1994"));
        assert!(!authenticate(&table(), "", "10-01-1994"));
    }

    #[test]
    fn dob_comparison_is_string_exact_on_the_display_form() {
        // Same calendar date, different spelling: rejected.
        assert!(!authenticate(&table(), "C5841053", "10/01/1994"));
        assert!(!authenticate(&table(), "C5841053", "1994-01-10"));
    }

    #[test]
    fn records_without_a_dob_never_authenticate() {
        assert!(!authenticate(&table(), "C1010011", ""));
        assert!(!authenticate(&table(), "C1010011", "10-01-1994"));
    }
}
