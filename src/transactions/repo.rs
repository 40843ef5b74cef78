use std::collections::BTreeMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{
    dto::ListFilters,
    repo_types::{NewTransaction, Scope, Transaction, TransactionPatch},
};

// Every scoped statement below ends with `(? IS NULL OR owner_id = ?)`,
// bound twice with `Scope::owner_id()`.

pub async fn insert(
    db: &SqlitePool,
    scope: Scope,
    txn: &NewTransaction,
) -> Result<Transaction, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (amount, category, date, owner_id)
        VALUES (?, ?, ?, ?)
        RETURNING id, amount, category, date, owner_id
        "#,
    )
    .bind(txn.amount)
    .bind(&txn.category)
    .bind(&txn.date)
    .bind(scope.owner_id())
    .fetch_one(db)
    .await
}

/// Inserts all rows inside one database transaction. Returns how many were
/// written.
pub async fn insert_bulk(
    db: &SqlitePool,
    scope: Scope,
    txns: &[NewTransaction],
) -> Result<u64, sqlx::Error> {
    let mut tx = db.begin().await?;
    for t in txns {
        sqlx::query(
            r#"
            INSERT INTO transactions (amount, category, date, owner_id)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(t.amount)
        .bind(&t.category)
        .bind(&t.date)
        .bind(scope.owner_id())
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(txns.len() as u64)
}

/// Newest id first. Date bounds are inclusive and compared as strings.
pub async fn list(
    db: &SqlitePool,
    scope: Scope,
    filters: &ListFilters,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT id, amount, category, date, owner_id FROM transactions WHERE 1 = 1",
    );
    if let Some(owner) = scope.owner_id() {
        qb.push(" AND owner_id = ").push_bind(owner);
    }
    if let Some(category) = filters.category.as_deref() {
        qb.push(" AND category = ").push_bind(category);
    }
    if let Some(from) = filters.from_date.as_deref() {
        qb.push(" AND date >= ").push_bind(from);
    }
    if let Some(to) = filters.to_date.as_deref() {
        qb.push(" AND date <= ").push_bind(to);
    }
    qb.push(" ORDER BY id DESC");

    qb.build_query_as::<Transaction>().fetch_all(db).await
}

pub async fn get_by_id(
    db: &SqlitePool,
    scope: Scope,
    id: i64,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        r#"
        SELECT id, amount, category, date, owner_id
        FROM transactions
        WHERE id = ? AND (? IS NULL OR owner_id = ?)
        "#,
    )
    .bind(id)
    .bind(scope.owner_id())
    .bind(scope.owner_id())
    .fetch_optional(db)
    .await
}

/// Overwrites amount, category and date.
pub async fn replace(
    db: &SqlitePool,
    scope: Scope,
    id: i64,
    txn: &NewTransaction,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        r#"
        UPDATE transactions
        SET amount = ?, category = ?, date = ?
        WHERE id = ? AND (? IS NULL OR owner_id = ?)
        RETURNING id, amount, category, date, owner_id
        "#,
    )
    .bind(txn.amount)
    .bind(&txn.category)
    .bind(&txn.date)
    .bind(id)
    .bind(scope.owner_id())
    .bind(scope.owner_id())
    .fetch_optional(db)
    .await
}

/// Overwrites only the fields present in `patch`.
pub async fn patch(
    db: &SqlitePool,
    scope: Scope,
    id: i64,
    patch: &TransactionPatch,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        r#"
        UPDATE transactions
        SET amount   = COALESCE(?, amount),
            category = COALESCE(?, category),
            date     = COALESCE(?, date)
        WHERE id = ? AND (? IS NULL OR owner_id = ?)
        RETURNING id, amount, category, date, owner_id
        "#,
    )
    .bind(patch.amount)
    .bind(patch.category.as_deref())
    .bind(patch.date.as_deref())
    .bind(id)
    .bind(scope.owner_id())
    .bind(scope.owner_id())
    .fetch_optional(db)
    .await
}

/// Returns false when no visible row had this id.
pub async fn delete(db: &SqlitePool, scope: Scope, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM transactions
        WHERE id = ? AND (? IS NULL OR owner_id = ?)
        "#,
    )
    .bind(id)
    .bind(scope.owner_id())
    .bind(scope.owner_id())
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Total amount per category over every row in scope.
pub async fn summary_by_category(
    db: &SqlitePool,
    scope: Scope,
) -> Result<BTreeMap<String, f64>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, f64)>(
        r#"
        SELECT category, SUM(amount)
        FROM transactions
        WHERE (? IS NULL OR owner_id = ?)
        GROUP BY category
        "#,
    )
    .bind(scope.owner_id())
    .bind(scope.owner_id())
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().collect())
}
