use serde::Serialize;
use sqlx::FromRow;

/// Transaction row. `owner_id` stays server-side.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub amount: f64,
    pub category: String,
    pub date: String,
    #[serde(skip_serializing)]
    pub owner_id: Option<i64>,
}

/// A validated transaction ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: f64,
    pub category: String,
    pub date: String,
}

/// A validated partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub date: Option<String>,
}

/// Which rows a request may see and touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Unauthenticated deployment: every row.
    Global,
    /// Rows owned by this user id.
    User(i64),
}

impl Scope {
    pub fn owner_id(self) -> Option<i64> {
        match self {
            Scope::Global => None,
            Scope::User(id) => Some(id),
        }
    }
}
