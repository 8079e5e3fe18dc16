//! Cluster-peer product recommendations.
//!
//! All ranking is a frequency count over the customer's cluster peers; the
//! clustering itself happened offline. Tie-breaking is part of the contract:
//! equal counts rank by first occurrence in the table scan.

use std::sync::Arc;

use crate::customers::CustomerTable;
use crate::domain::customer::{CustomerId, ProductCategory};

/// Returned verbatim when a recommendation request arrives without a
/// customer login.
pub const LOGIN_PROMPT: &str = "🔒 Please login as customer to get recommendations.";

/// Returned when no requested category produced a section.
pub const GUIDANCE: &str = "Please mention loan, credit card, investment, or savings.";

pub const DEFAULT_TOP_N: usize = 3;

/// Occurrence counter that remembers first-seen order, making
/// tie-break-by-first-occurrence a stated contract instead of an accident of
/// iteration order.
#[derive(Clone, Debug, Default)]
pub struct FrequencyCounter {
    entries: Vec<(String, u32)>,
}

impl FrequencyCounter {
    pub fn observe(&mut self, value: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(seen, _)| seen == value) {
            entry.1 += 1;
        } else {
            self.entries.push((value.to_string(), 1));
        }
    }

    /// Values by descending count; the stable sort keeps first-seen order
    /// among equal counts.
    pub fn into_ranked(self, limit: usize) -> Vec<String> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.into_iter().take(limit).map(|(value, _)| value).collect()
    }
}

#[derive(Clone, Debug)]
pub struct Recommender {
    table: Arc<CustomerTable>,
}

impl Recommender {
    pub fn new(table: Arc<CustomerTable>) -> Self {
        Self { table }
    }

    /// Top-`limit` most frequent non-missing values of `category`'s column
    /// among the rows of `cluster`.
    pub fn top_values(&self, cluster: u32, category: ProductCategory, limit: usize) -> Vec<String> {
        let mut counter = FrequencyCounter::default();
        for record in self.table.cluster_peers(cluster) {
            if let Some(value) = record.product_value(category) {
                counter.observe(value);
            }
        }
        counter.into_ranked(limit)
    }

    /// Build the recommendation reply for an authenticated customer. The
    /// categories come from a case-insensitive substring scan of the request
    /// text; each one that resolves becomes a bulleted section. Lookup misses
    /// (unknown id, row without a cluster, empty column) skip the section
    /// rather than failing the call.
    pub fn recommend(&self, customer_id: &CustomerId, request_text: &str) -> String {
        let mut sections = Vec::new();
        for category in ProductCategory::mentioned_in(request_text) {
            if let Some(values) = self.values_for_customer(customer_id, category) {
                let bullets = values
                    .iter()
                    .map(|value| format!("• {value}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                sections.push(format!("**{} Recommendations:**\n{bullets}", category.heading()));
            }
        }

        if sections.is_empty() {
            return GUIDANCE.to_string();
        }

        format!("Customer ID : {customer_id}\n\n{}", sections.join("\n\n"))
    }

    fn values_for_customer(
        &self,
        customer_id: &CustomerId,
        category: ProductCategory,
    ) -> Option<Vec<String>> {
        let record = self.table.find(customer_id)?;
        let cluster = record.cluster?;
        let values = self.top_values(cluster, category, DEFAULT_TOP_N);
        (!values.is_empty()).then_some(values)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{FrequencyCounter, Recommender, DEFAULT_TOP_N, GUIDANCE};
    use crate::customers::CustomerTable;
    use crate::domain::customer::{CustomerId, CustomerRecord, ProductCategory};

    fn record(id: &str, cluster: Option<u32>, loan: Option<&str>, saving: Option<&str>) -> CustomerRecord {
        CustomerRecord {
            id: CustomerId::new(id),
            dob: None,
            gender: None,
            location: None,
            account_balance: None,
            loan_type: loan.map(str::to_string),
            credit_cardtype: None,
            investment_type: None,
            savings_plan_type: saving.map(str::to_string),
            cluster,
        }
    }

    fn recommender() -> Recommender {
        // Cluster 2 loan counts: Personal 3, Home 2, Auto 2, Education 1.
        // Home is seen before Auto, so the tie ranks Home first.
        let table = CustomerTable::from_records(vec![
            record("C5841053", Some(2), Some("Personal Loan"), Some("Fixed Deposit")),
            record("C2", Some(2), Some("Home Loan"), None),
            record("C3", Some(2), Some("Auto Loan"), Some("Fixed Deposit")),
            record("C4", Some(2), Some("Personal Loan"), Some("Recurring Deposit")),
            record("C5", Some(2), Some("Home Loan"), None),
            record("C6", Some(2), Some("Auto Loan"), None),
            record("C7", Some(2), Some("Personal Loan"), None),
            record("C8", Some(2), Some("Education Loan"), None),
            record("C9", Some(0), Some("Gold Loan"), Some("Pension Plan")),
            record("C10", None, Some("Top-up Loan"), None),
        ]);
        Recommender::new(Arc::new(table))
    }

    #[test]
    fn counter_breaks_ties_by_first_occurrence() {
        let mut counter = FrequencyCounter::default();
        for value in ["B", "A", "A", "B", "C"] {
            counter.observe(value);
        }
        assert_eq!(counter.into_ranked(10), vec!["B", "A", "C"]);
    }

    #[test]
    fn counter_truncates_to_the_requested_limit() {
        let mut counter = FrequencyCounter::default();
        for value in ["a", "b", "c", "d", "b"] {
            counter.observe(value);
        }
        assert_eq!(counter.into_ranked(2), vec!["b", "a"]);
    }

    #[test]
    fn top_values_rank_cluster_peers_by_descending_frequency() {
        let values = recommender().top_values(2, ProductCategory::Loan, DEFAULT_TOP_N);
        assert_eq!(values, vec!["Personal Loan", "Home Loan", "Auto Loan"]);
    }

    #[test]
    fn top_values_skip_missing_cells() {
        let values = recommender().top_values(2, ProductCategory::Saving, DEFAULT_TOP_N);
        assert_eq!(values, vec!["Fixed Deposit", "Recurring Deposit"]);
    }

    #[test]
    fn recommend_formats_sections_with_customer_prefix() {
        let reply =
            recommender().recommend(&CustomerId::new("C5841053"), "suggest a loan and savings");

        assert_eq!(
            reply,
            "Customer ID : C5841053\n\n\
             **Loan Recommendations:**\n• Personal Loan\n• Home Loan\n• Auto Loan\n\n\
             **Saving Recommendations:**\n• Fixed Deposit\n• Recurring Deposit"
        );
    }

    #[test]
    fn recommend_without_category_keywords_returns_guidance() {
        let reply = recommender().recommend(&CustomerId::new("C5841053"), "suggest something");
        assert_eq!(reply, GUIDANCE);
    }

    #[test]
    fn unknown_customer_degrades_to_guidance() {
        let reply = recommender().recommend(&CustomerId::new("C404"), "suggest a loan");
        assert_eq!(reply, GUIDANCE);
    }

    #[test]
    fn customer_without_a_cluster_degrades_to_guidance() {
        let reply = recommender().recommend(&CustomerId::new("C10"), "suggest a loan");
        assert_eq!(reply, GUIDANCE);
    }

    #[test]
    fn values_come_from_the_callers_cluster_only() {
        let reply = recommender().recommend(&CustomerId::new("C9"), "recommend a loan");
        assert_eq!(
            reply,
            "Customer ID : C9\n\n**Loan Recommendations:**\n• Gold Loan"
        );
    }
}
