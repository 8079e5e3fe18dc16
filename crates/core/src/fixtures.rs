//! Deterministic demo dataset.
//!
//! One canonical in-memory description generates all four startup artifacts,
//! so the customer CSV, cluster map, answer table, and model bundle cannot
//! drift apart. The dataset is small but exercises every reply path: a known
//! login, a cohort with frequency ties, a row outside the cluster map, and a
//! model whose vocabulary covers the shipped FAQ intents.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use crate::config::DataConfig;
use crate::customers::ClusterAssignments;
use crate::domain::customer::{CustomerId, CustomerRecord};
use crate::errors::DomainError;
use crate::faq::FaqEntry;
use crate::model::{LinearClassifier, ModelBundle, TfidfVectorizer};

struct DemoCustomer {
    id: &'static str,
    gender: &'static str,
    location: &'static str,
    balance: &'static str,
    dob: &'static str,
    loan_type: &'static str,
    credit_cardtype: &'static str,
    investment_type: &'static str,
    savings_plan_type: &'static str,
    cluster: Option<u32>,
}

/// Cluster 2 is the demo login's cohort: Personal x3 / Home x2 / Auto x2 /
/// Education x1 on loans, with a deliberate Platinum-Gold tie on cards broken
/// by first occurrence. The last row has no cluster assignment at all.
const DEMO_CUSTOMERS: &[DemoCustomer] = &[
    DemoCustomer {
        id: "C5841053",
        gender: "F",
        location: "Mumbai",
        balance: "94351.83",
        dob: "10-01-1994",
        loan_type: "Personal Loan",
        credit_cardtype: "Platinum Card",
        investment_type: "Mutual Funds",
        savings_plan_type: "Fixed Deposit",
        cluster: Some(2),
    },
    DemoCustomer {
        id: "C2142763",
        gender: "M",
        location: "Delhi",
        balance: "32138.56",
        dob: "04-04-1957",
        loan_type: "Home Loan",
        credit_cardtype: "Gold Card",
        investment_type: "Stocks",
        savings_plan_type: "Recurring Deposit",
        cluster: Some(2),
    },
    DemoCustomer {
        id: "C4417068",
        gender: "F",
        location: "Mumbai",
        balance: "17874.44",
        dob: "26-11-1996",
        loan_type: "Personal Loan",
        credit_cardtype: "Platinum Card",
        investment_type: "Mutual Funds",
        savings_plan_type: "Fixed Deposit",
        cluster: Some(2),
    },
    DemoCustomer {
        id: "C5342380",
        gender: "M",
        location: "Bengaluru",
        balance: "866503.21",
        dob: "14-09-1973",
        loan_type: "Auto Loan",
        credit_cardtype: "Travel Card",
        investment_type: "Bonds",
        savings_plan_type: "Recurring Deposit",
        cluster: Some(2),
    },
    DemoCustomer {
        id: "C8536061",
        gender: "M",
        location: "Pune",
        balance: "365.82",
        dob: "24-06-1988",
        loan_type: "Personal Loan",
        credit_cardtype: "Gold Card",
        investment_type: "Mutual Funds",
        savings_plan_type: "Fixed Deposit",
        cluster: Some(2),
    },
    DemoCustomer {
        id: "C6638396",
        gender: "F",
        location: "Chennai",
        balance: "56420.10",
        dob: "18-02-1992",
        loan_type: "Home Loan",
        credit_cardtype: "Platinum Card",
        investment_type: "Stocks",
        savings_plan_type: "Recurring Deposit",
        cluster: Some(2),
    },
    DemoCustomer {
        id: "C7126560",
        gender: "F",
        location: "Hyderabad",
        balance: "120033.95",
        dob: "30-07-1985",
        loan_type: "Auto Loan",
        credit_cardtype: "Gold Card",
        investment_type: "Mutual Funds",
        savings_plan_type: "Fixed Deposit",
        cluster: Some(2),
    },
    DemoCustomer {
        id: "C1220223",
        gender: "M",
        location: "Delhi",
        balance: "8765.00",
        dob: "02-12-1999",
        loan_type: "Education Loan",
        credit_cardtype: "Travel Card",
        investment_type: "Bonds",
        savings_plan_type: "",
        cluster: Some(2),
    },
    DemoCustomer {
        id: "C1010011",
        gender: "M",
        location: "Kolkata",
        balance: "45000.00",
        dob: "15-05-1980",
        loan_type: "Gold Loan",
        credit_cardtype: "Silver Card",
        investment_type: "Fixed Income",
        savings_plan_type: "Savings Account",
        cluster: Some(0),
    },
    DemoCustomer {
        id: "C2020022",
        gender: "F",
        location: "Jaipur",
        balance: "73250.40",
        dob: "23-08-1975",
        loan_type: "Gold Loan",
        credit_cardtype: "Silver Card",
        investment_type: "Fixed Income",
        savings_plan_type: "Savings Account",
        cluster: Some(0),
    },
    DemoCustomer {
        id: "C3030033",
        gender: "M",
        location: "Lucknow",
        balance: "1200.25",
        dob: "07-03-1990",
        loan_type: "Business Loan",
        credit_cardtype: "Cashback Card",
        investment_type: "Real Estate",
        savings_plan_type: "Recurring Deposit",
        cluster: Some(0),
    },
    DemoCustomer {
        id: "C4040044",
        gender: "F",
        location: "Surat",
        balance: "98120.77",
        dob: "19-10-1986",
        loan_type: "Two-Wheeler Loan",
        credit_cardtype: "Student Card",
        investment_type: "Gold ETF",
        savings_plan_type: "Savings Account",
        cluster: Some(1),
    },
    DemoCustomer {
        id: "C5050055",
        gender: "M",
        location: "Nagpur",
        balance: "560.90",
        dob: "11-11-1968",
        loan_type: "Two-Wheeler Loan",
        credit_cardtype: "Student Card",
        investment_type: "Gold ETF",
        savings_plan_type: "Savings Account",
        cluster: Some(1),
    },
    DemoCustomer {
        id: "C9090099",
        gender: "F",
        location: "Indore",
        balance: "150.00",
        dob: "09-09-1999",
        loan_type: "Personal Loan",
        credit_cardtype: "Gold Card",
        investment_type: "Stocks",
        savings_plan_type: "Fixed Deposit",
        cluster: None,
    },
];

const DEMO_FAQ: &[(&str, &str)] = &[
    ("branch_hours", "Our branches are open 9:30am to 4:30pm, Monday through Saturday."),
    ("branch_hours", "Branch working hours are 9:30am to 4:30pm; we are closed on Sundays."),
    (
        "account_balance",
        "You can check your account balance anytime from the mobile app or at any ATM.",
    ),
    ("card_lost", "Please call the 24x7 helpline 1800-425-3800 immediately to block your card."),
    ("atm_locations", "Use the locator on our website to find the nearest ATM or branch."),
    ("contact_support", "You can reach customer support on 1800-425-3800 or support@bank.example."),
];

/// Class keywords for the demo bundle. Labels are kept sorted, matching the
/// encoder the training step uses.
const DEMO_INTENTS: &[(&str, &[&str])] = &[
    ("account_balance", &["balance", "account"]),
    ("atm_locations", &["atm", "nearest"]),
    ("branch_hours", &["branch", "hours", "open", "timings"]),
    ("card_lost", &["lost", "stolen", "blocked"]),
    ("contact_support", &["contact", "support", "helpline"]),
];

const INTENT_WEIGHT: f64 = 4.0;

const CUSTOMER_HEADERS: [&str; 9] = [
    "CustomerID",
    "CustGender",
    "CustLocation",
    "CustAccountBalance",
    "CustomerDOB",
    "Loan_type",
    "credit_cardtype",
    "investment_type",
    "savings_plan_type",
];

pub struct DemoDataset;

impl DemoDataset {
    /// Login credentials shown on the demo portal.
    pub const CUSTOMER_ID: &'static str = "C5841053";
    pub const CUSTOMER_DOB: &'static str = "10-01-1994";

    pub fn customers() -> Vec<CustomerRecord> {
        DEMO_CUSTOMERS
            .iter()
            .map(|row| CustomerRecord {
                id: CustomerId::new(row.id),
                dob: NaiveDate::parse_from_str(row.dob, "%d-%m-%Y").ok(),
                gender: optional(row.gender),
                location: optional(row.location),
                account_balance: row.balance.parse().ok(),
                loan_type: optional(row.loan_type),
                credit_cardtype: optional(row.credit_cardtype),
                investment_type: optional(row.investment_type),
                savings_plan_type: optional(row.savings_plan_type),
                cluster: row.cluster,
            })
            .collect()
    }

    pub fn clusters() -> ClusterAssignments {
        ClusterAssignments::from_entries(
            DEMO_CUSTOMERS
                .iter()
                .filter_map(|row| row.cluster.map(|cluster| (row.id.to_string(), cluster))),
        )
    }

    pub fn faq_entries() -> Vec<FaqEntry> {
        DEMO_FAQ
            .iter()
            .map(|(intent, answer)| FaqEntry {
                intent: (*intent).to_string(),
                answer: (*answer).to_string(),
            })
            .collect()
    }

    pub fn model() -> ModelBundle {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        for (_, terms) in DEMO_INTENTS {
            for term in *terms {
                let column = vocabulary.len();
                vocabulary.insert((*term).to_string(), column);
            }
        }

        let features = vocabulary.len();
        let coefficients = DEMO_INTENTS
            .iter()
            .map(|(_, terms)| {
                let mut row = vec![0.0; features];
                for term in *terms {
                    if let Some(&column) = vocabulary.get(*term) {
                        row[column] = INTENT_WEIGHT;
                    }
                }
                row
            })
            .collect();

        ModelBundle {
            vectorizer: TfidfVectorizer { vocabulary, idf: vec![1.0; features] },
            classifier: LinearClassifier { intercepts: vec![0.0; DEMO_INTENTS.len()], coefficients },
            labels: DEMO_INTENTS.iter().map(|(label, _)| (*label).to_string()).collect(),
        }
    }

    /// Write all four artifacts to the configured data paths, creating parent
    /// directories as needed. Existing files are replaced.
    pub fn write(data: &DataConfig) -> Result<(), DomainError> {
        write_customers_csv(&data.customers_csv)?;
        write_clusters_json(&data.clusters_json)?;
        write_faq_csv(&data.faq_csv)?;
        write_model_json(&data.model_json)?;
        Ok(())
    }
}

fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn ensure_parent(path: &Path) -> Result<(), DomainError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|err| DomainError::write(path.display().to_string(), err))?;
        }
    }
    Ok(())
}

fn write_customers_csv(path: &Path) -> Result<(), DomainError> {
    ensure_parent(path)?;
    let shown = path.display().to_string();
    let mut writer = csv::Writer::from_path(path).map_err(|err| DomainError::write(&shown, err))?;
    writer.write_record(CUSTOMER_HEADERS).map_err(|err| DomainError::write(&shown, err))?;
    for row in DEMO_CUSTOMERS {
        writer
            .write_record([
                row.id,
                row.gender,
                row.location,
                row.balance,
                row.dob,
                row.loan_type,
                row.credit_cardtype,
                row.investment_type,
                row.savings_plan_type,
            ])
            .map_err(|err| DomainError::write(&shown, err))?;
    }
    writer.flush().map_err(|err| DomainError::write(&shown, err))?;
    Ok(())
}

fn write_clusters_json(path: &Path) -> Result<(), DomainError> {
    ensure_parent(path)?;
    let shown = path.display().to_string();
    let assignments: BTreeMap<&str, u32> = DEMO_CUSTOMERS
        .iter()
        .filter_map(|row| row.cluster.map(|cluster| (row.id, cluster)))
        .collect();
    let serialized = serde_json::to_string_pretty(&assignments)
        .map_err(|err| DomainError::write(&shown, err))?;
    fs::write(path, serialized).map_err(|err| DomainError::write(&shown, err))
}

fn write_faq_csv(path: &Path) -> Result<(), DomainError> {
    ensure_parent(path)?;
    let shown = path.display().to_string();
    let mut writer = csv::Writer::from_path(path).map_err(|err| DomainError::write(&shown, err))?;
    writer.write_record(["intent", "answer"]).map_err(|err| DomainError::write(&shown, err))?;
    for (intent, answer) in DEMO_FAQ {
        writer.write_record([*intent, *answer]).map_err(|err| DomainError::write(&shown, err))?;
    }
    writer.flush().map_err(|err| DomainError::write(&shown, err))?;
    Ok(())
}

fn write_model_json(path: &Path) -> Result<(), DomainError> {
    ensure_parent(path)?;
    let shown = path.display().to_string();
    let serialized = serde_json::to_string_pretty(&DemoDataset::model())
        .map_err(|err| DomainError::write(&shown, err))?;
    fs::write(path, serialized).map_err(|err| DomainError::write(&shown, err))
}
