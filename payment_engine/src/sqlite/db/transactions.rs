use sqlx::SqliteConnection;

use crate::{
    db_types::{NewTransaction, Provider, Transaction, TransactionStatus, TxReference},
    traits::TransactionStoreError,
};

/// Inserts a new transaction. The schema enforces both uniqueness invariants: (`uuid`, `provider`) for
/// correlation ids, and the single-non-failed-refund rule via a partial index on `related`.
pub async fn insert_transaction(
    tx: NewTransaction,
    conn: &mut SqliteConnection,
) -> Result<Transaction, TransactionStoreError> {
    let uuid = tx.uuid.clone();
    let related = tx.related;
    let transaction = sqlx::query_as(
        r#"
            INSERT INTO transactions (uuid, provider, kind, status, amount, currency, related, uid_pay, uid_support)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(tx.uuid)
    .bind(tx.provider)
    .bind(tx.kind)
    .bind(tx.status)
    .bind(tx.amount)
    .bind(tx.currency)
    .bind(tx.related)
    .bind(tx.uid_pay)
    .bind(tx.uid_support)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => {
            if err.message().contains("idx_transactions_single_refund") {
                TransactionStoreError::RefundAlreadyRecorded(related.unwrap_or_default())
            } else {
                TransactionStoreError::TransactionAlreadyExists(uuid)
            }
        },
        _ => TransactionStoreError::from(e),
    })?;
    Ok(transaction)
}

pub async fn fetch_transaction(
    id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transactions WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_transaction_by_uuid(
    uuid: &TxReference,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transactions WHERE uuid = $1").bind(uuid.as_str()).fetch_optional(conn).await
}

pub async fn fetch_transaction_by_uuid_for_provider(
    uuid: &TxReference,
    provider: Provider,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transactions WHERE uuid = $1 AND provider = $2")
        .bind(uuid.as_str())
        .bind(provider)
        .fetch_optional(conn)
        .await
}

/// The compare-and-swap commit. The UPDATE is predicated on the status the caller read; if the row has moved on,
/// no rows match and `None` comes back, telling the caller to re-read and re-check legality. `uid_support` is only
/// assigned when the caller provides one.
pub async fn update_status_checked(
    id: i64,
    expected: TransactionStatus,
    new: TransactionStatus,
    uid_support: Option<String>,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE transactions
            SET status = $1, uid_support = COALESCE($2, uid_support), modified = CURRENT_TIMESTAMP
            WHERE id = $3 AND status = $4
            RETURNING *;
        "#,
    )
    .bind(new)
    .bind(uid_support)
    .bind(id)
    .bind(expected)
    .fetch_optional(conn)
    .await
}

/// The non-failed refund recorded against a payment, if any. The partial unique index guarantees at most one row.
pub async fn fetch_refund_of(
    payment_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transactions WHERE related = $1 AND status <> 'Failed'")
        .bind(payment_id)
        .fetch_optional(conn)
        .await
}

pub async fn count_transactions(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions").fetch_one(conn).await?;
    Ok(count)
}
