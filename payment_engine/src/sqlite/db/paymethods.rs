use sqlx::SqliteConnection;

use crate::db_types::{PayMethod, Provider, Subscription};

pub async fn insert_paymethod(
    customer_id: &str,
    provider: Provider,
    provider_id: &str,
    conn: &mut SqliteConnection,
) -> Result<PayMethod, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO paymethods (customer_id, provider, provider_id) VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(customer_id)
    .bind(provider)
    .bind(provider_id)
    .fetch_one(conn)
    .await
}

pub async fn insert_subscription(
    paymethod_id: i64,
    provider_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Subscription, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO subscriptions (paymethod_id, provider_id) VALUES ($1, $2)
            RETURNING *;
        "#,
    )
    .bind(paymethod_id)
    .bind(provider_id)
    .fetch_one(conn)
    .await
}

pub async fn fetch_active_paymethods(
    customer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<PayMethod>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM paymethods WHERE customer_id = $1 AND active = 1 ORDER BY id")
        .bind(customer_id)
        .fetch_all(conn)
        .await
}

pub async fn fetch_active_subscriptions(
    paymethod_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Subscription>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM subscriptions WHERE paymethod_id = $1 AND active = 1 ORDER BY id")
        .bind(paymethod_id)
        .fetch_all(conn)
        .await
}

pub async fn deactivate_subscription(id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE subscriptions SET active = 0, modified = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn deactivate_paymethod(id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE paymethods SET active = 0, modified = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
