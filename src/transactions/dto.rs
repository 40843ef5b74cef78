use serde::{Deserialize, Serialize};

/// Body of `POST /transactions`, `PUT /transactions/:id` and each item of
/// `POST /transactions/bulk`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionIn {
    pub amount: f64,
    pub category: String,
    pub date: String, // "YYYY-MM-DD"
}

/// Body of `PATCH /transactions/:id`. Absent and `null` fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionUpdate {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilters {
    pub category: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl ListFilters {
    /// Empty query values (`?category=`) count as absent.
    pub fn normalized(self) -> Self {
        fn non_empty(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.is_empty())
        }
        Self {
            category: non_empty(self.category),
            from_date: non_empty(self.from_date),
            to_date: non_empty(self.to_date),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BulkAdded {
    pub ok: bool,
    pub added: u64,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub ok: bool,
    pub deleted_id: i64,
}
