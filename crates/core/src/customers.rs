//! The in-memory customer table: one CSV load at startup, joined with the
//! pre-computed cluster assignments, immutable afterwards.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::customer::{CustomerId, CustomerRecord, ProductCategory};
use crate::errors::DomainError;

/// Date shapes accepted for `CustomerDOB`. Whatever parses is normalized to
/// the `DD-MM-YYYY` display form. The two-digit-year form is tried before
/// `%d/%m/%Y`, which would otherwise read "88" as the year 88.
const DOB_FORMATS: [&str; 4] = ["%d-%m-%Y", "%d/%m/%y", "%d/%m/%Y", "%Y-%m-%d"];

/// Immutable `{customer id -> cluster id}` mapping produced by the offline
/// clustering precomputation.
#[derive(Clone, Debug, Default)]
pub struct ClusterAssignments(HashMap<String, u32>);

impl ClusterAssignments {
    pub fn load(path: &Path) -> Result<Self, DomainError> {
        let shown = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|err| DomainError::read(&shown, err))?;
        let parsed: HashMap<String, u32> =
            serde_json::from_str(&raw).map_err(|err| DomainError::shape(&shown, err))?;
        Ok(Self::from_entries(parsed))
    }

    /// Keys are canonicalized like every other customer id.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, u32)>) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(id, cluster)| (CustomerId::new(&id).as_str().to_string(), cluster))
                .collect(),
        )
    }

    pub fn get(&self, id: &CustomerId) -> Option<u32> {
        self.0.get(id.as_str()).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read-only view over the customer dataset. Row order is preserved from the
/// source file; frequency tie-breaks downstream depend on it.
#[derive(Clone, Debug, Default)]
pub struct CustomerTable {
    records: Vec<CustomerRecord>,
    index: HashMap<CustomerId, usize>,
}

impl CustomerTable {
    /// Load the dataset and join each row with its cluster assignment. Rows
    /// without a `CustomerID` are skipped; rows absent from the cluster
    /// artifact stay in the table but carry no cluster.
    pub fn load(csv_path: &Path, clusters: &ClusterAssignments) -> Result<Self, DomainError> {
        let shown = csv_path.display().to_string();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(csv_path)
            .map_err(|err| DomainError::read(&shown, err))?;

        let headers = reader.headers().map_err(|err| DomainError::shape(&shown, err))?.clone();
        let column = |name: &str| headers.iter().position(|header| header == name);

        let id_col = column("CustomerID")
            .ok_or_else(|| DomainError::shape(&shown, "missing column `CustomerID`"))?;
        let dob_col = column("CustomerDOB")
            .ok_or_else(|| DomainError::shape(&shown, "missing column `CustomerDOB`"))?;
        let mut product_cols = HashMap::new();
        for category in ProductCategory::ALL {
            let position = column(category.column()).ok_or_else(|| {
                DomainError::shape(&shown, format!("missing column `{}`", category.column()))
            })?;
            product_cols.insert(category, position);
        }
        let gender_col = column("CustGender");
        let location_col = column("CustLocation");
        let balance_col = column("CustAccountBalance");

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|err| DomainError::shape(&shown, err))?;
            let field = |position: usize| row.get(position).unwrap_or("");

            let raw_id = field(id_col);
            if raw_id.is_empty() {
                continue;
            }
            let id = CustomerId::new(raw_id);

            let non_empty =
                |position: Option<usize>| position.map(field).filter(|value| !value.is_empty());

            records.push(CustomerRecord {
                cluster: clusters.get(&id),
                dob: parse_dob(field(dob_col)),
                gender: non_empty(gender_col).map(str::to_string),
                location: non_empty(location_col).map(str::to_string),
                account_balance: non_empty(balance_col).and_then(|value| value.parse().ok()),
                loan_type: non_empty(Some(product_cols[&ProductCategory::Loan]))
                    .map(str::to_string),
                credit_cardtype: non_empty(Some(product_cols[&ProductCategory::Credit]))
                    .map(str::to_string),
                investment_type: non_empty(Some(product_cols[&ProductCategory::Investment]))
                    .map(str::to_string),
                savings_plan_type: non_empty(Some(product_cols[&ProductCategory::Saving]))
                    .map(str::to_string),
                id,
            });
        }

        Ok(Self::from_records(records))
    }

    /// Build a table from already-typed records. Duplicate ids keep the first
    /// occurrence, matching a first-row dataset lookup.
    pub fn from_records(records: Vec<CustomerRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            index.entry(record.id.clone()).or_insert(position);
        }
        Self { records, index }
    }

    pub fn find(&self, id: &CustomerId) -> Option<&CustomerRecord> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    /// All rows assigned to `cluster`, in table order.
    pub fn cluster_peers(&self, cluster: u32) -> impl Iterator<Item = &CustomerRecord> {
        self.records.iter().filter(move |record| record.cluster == Some(cluster))
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_dob(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DOB_FORMATS.iter().find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}
