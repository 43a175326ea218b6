use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{self, SqliteConnectOptions, SqlitePool};
use tracing::info;

use crate::error::StoreError;

/// Opens (creating if needed) the trade database and applies the schema.
pub async fn connect(db_path: &str) -> Result<SqlitePool, StoreError> {
    if let Some(dir) = Path::new(db_path).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
        .map_err(sqlx::Error::from)?
        .create_if_missing(true)
        .journal_mode(sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlite::SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePool::connect_with(options).await?;
    apply_schema(&pool).await?;

    info!("Database initialized at: {}", db_path);
    Ok(pool)
}

/// In-memory database for tests.
pub async fn connect_in_memory() -> Result<SqlitePool, StoreError> {
    let pool = SqlitePool::connect("sqlite::memory:").await?;
    apply_schema(&pool).await?;
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    let schema = include_str!("../sql/schema.sql");
    sqlx::raw_sql(schema).execute(pool).await?;
    Ok(())
}
