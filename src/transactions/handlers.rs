use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{BulkAdded, Deleted, ListFilters, TransactionIn, TransactionUpdate},
    repo,
    repo_types::{NewTransaction, Scope, Transaction, TransactionPatch},
    services::validate_bulk,
};
use crate::{error::AppError, state::AppState};

const NOT_FOUND: &str = "Transaction not found";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(add_transaction).get(list_transactions))
        .route("/transactions/bulk", post(add_transactions_bulk))
        .route(
            "/transactions/:id",
            get(get_transaction)
                .put(replace_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
        .route("/summary", get(summary))
}

#[instrument(skip(state, payload))]
pub async fn add_transaction(
    State(state): State<AppState>,
    scope: Scope,
    Json(payload): Json<TransactionIn>,
) -> Result<Json<Transaction>, AppError> {
    let txn = NewTransaction::try_from(payload)?;
    let created = repo::insert(&state.db, scope, &txn).await?;
    info!(id = created.id, category = %created.category, "transaction added");
    Ok(Json(created))
}

#[instrument(skip(state, payload), fields(count = payload.len()))]
pub async fn add_transactions_bulk(
    State(state): State<AppState>,
    scope: Scope,
    Json(payload): Json<Vec<TransactionIn>>,
) -> Result<Json<BulkAdded>, AppError> {
    let txns = validate_bulk(payload)?;
    let added = repo::insert_bulk(&state.db, scope, &txns).await?;
    info!(added, "transactions bulk added");
    Ok(Json(BulkAdded { ok: true, added }))
}

#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    scope: Scope,
    Query(filters): Query<ListFilters>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let rows = repo::list(&state.db, scope, &filters.normalized()).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn get_transaction(
    State(state): State<AppState>,
    scope: Scope,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    repo::get_by_id(&state.db, scope, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(NOT_FOUND))
}

#[instrument(skip(state, payload))]
pub async fn replace_transaction(
    State(state): State<AppState>,
    scope: Scope,
    Path(id): Path<i64>,
    Json(payload): Json<TransactionIn>,
) -> Result<Json<Transaction>, AppError> {
    let txn = NewTransaction::try_from(payload)?;
    let updated = repo::replace(&state.db, scope, id, &txn)
        .await?
        .ok_or(AppError::NotFound(NOT_FOUND))?;
    info!(id, "transaction replaced");
    Ok(Json(updated))
}

#[instrument(skip(state, payload))]
pub async fn update_transaction(
    State(state): State<AppState>,
    scope: Scope,
    Path(id): Path<i64>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<Transaction>, AppError> {
    let patch = TransactionPatch::try_from(payload)?;
    let updated = repo::patch(&state.db, scope, id, &patch)
        .await?
        .ok_or(AppError::NotFound(NOT_FOUND))?;
    info!(id, "transaction updated");
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    scope: Scope,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, AppError> {
    if !repo::delete(&state.db, scope, id).await? {
        return Err(AppError::NotFound(NOT_FOUND));
    }
    info!(id, "transaction deleted");
    Ok(Json(Deleted {
        ok: true,
        deleted_id: id,
    }))
}

#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    scope: Scope,
) -> Result<Json<BTreeMap<String, f64>>, AppError> {
    Ok(Json(repo::summary_by_category(&state.db, scope).await?))
}
