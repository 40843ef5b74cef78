use crate::error::AppError;

use super::{
    dto::{TransactionIn, TransactionUpdate},
    repo_types::{NewTransaction, TransactionPatch},
};

fn check_amount(amount: f64) -> Result<f64, AppError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(AppError::Validation("amount must be greater than 0".into()))
    }
}

fn check_category(category: String) -> Result<String, AppError> {
    if category.trim().is_empty() {
        Err(AppError::Validation("category must not be empty".into()))
    } else {
        Ok(category)
    }
}

impl TryFrom<TransactionIn> for NewTransaction {
    type Error = AppError;

    fn try_from(input: TransactionIn) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: check_amount(input.amount)?,
            category: check_category(input.category)?,
            date: input.date,
        })
    }
}

impl TryFrom<TransactionUpdate> for TransactionPatch {
    type Error = AppError;

    fn try_from(input: TransactionUpdate) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: input.amount.map(check_amount).transpose()?,
            category: input.category.map(check_category).transpose()?,
            date: input.date,
        })
    }
}

/// Validates every item before anything is written.
pub fn validate_bulk(items: Vec<TransactionIn>) -> Result<Vec<NewTransaction>, AppError> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            NewTransaction::try_from(item).map_err(|e| match e {
                AppError::Validation(msg) => AppError::Validation(format!("item {i}: {msg}")),
                other => other,
            })
        })
        .collect()
}
