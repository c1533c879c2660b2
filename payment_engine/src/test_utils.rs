//! Helpers for setting up throwaway databases in tests.
use crate::SqliteDatabase;

/// A fresh, fully-migrated in-memory store.
///
/// One connection only: every new connection to `sqlite::memory:` would get its own blank database, so the pool
/// must never grow past the first.
pub async fn memory_store() -> SqliteDatabase {
    SqliteDatabase::new_with_url("sqlite::memory:", 1).await.expect("Error creating in-memory database")
}
