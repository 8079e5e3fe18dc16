use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical customer identifier. Raw dataset and login inputs are trimmed
/// and uppercased once here; every lookup compares canonical forms.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Product categories a recommendation request can name. Order matters: it is
/// the order categories are matched against the request text and the order
/// their sections appear in the reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Loan,
    Credit,
    Investment,
    Saving,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 4] =
        [Self::Loan, Self::Credit, Self::Investment, Self::Saving];

    /// Keyword matched (case-insensitive substring) against request text.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Loan => "loan",
            Self::Credit => "credit",
            Self::Investment => "investment",
            Self::Saving => "saving",
        }
    }

    /// Dataset column holding this category's product values.
    pub fn column(self) -> &'static str {
        match self {
            Self::Loan => "Loan_type",
            Self::Credit => "credit_cardtype",
            Self::Investment => "investment_type",
            Self::Saving => "savings_plan_type",
        }
    }

    /// Title-cased label used in reply section headers.
    pub fn heading(self) -> &'static str {
        match self {
            Self::Loan => "Loan",
            Self::Credit => "Credit",
            Self::Investment => "Investment",
            Self::Saving => "Saving",
        }
    }

    /// Categories whose keyword occurs in `text`, in `ALL` order.
    pub fn mentioned_in(text: &str) -> Vec<ProductCategory> {
        let lowered = text.to_lowercase();
        Self::ALL.into_iter().filter(|category| lowered.contains(category.keyword())).collect()
    }
}

/// One row of the customer dataset after canonicalization and the cluster
/// join. Immutable for the lifetime of the process.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub account_balance: Option<f64>,
    pub loan_type: Option<String>,
    pub credit_cardtype: Option<String>,
    pub investment_type: Option<String>,
    pub savings_plan_type: Option<String>,
    pub cluster: Option<u32>,
}

impl CustomerRecord {
    /// Date of birth in the `DD-MM-YYYY` display form used by login and the
    /// original dataset.
    pub fn dob_display(&self) -> Option<String> {
        self.dob.map(|dob| dob.format("%d-%m-%Y").to_string())
    }

    pub fn product_value(&self, category: ProductCategory) -> Option<&str> {
        match category {
            ProductCategory::Loan => self.loan_type.as_deref(),
            ProductCategory::Credit => self.credit_cardtype.as_deref(),
            ProductCategory::Investment => self.investment_type.as_deref(),
            ProductCategory::Saving => self.savings_plan_type.as_deref(),
        }
    }
}
