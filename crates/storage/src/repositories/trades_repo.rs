use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use common::models::{ExecutionMode, Side, TradeRecord, TradeRecordInsert};

use crate::db;
use crate::error::StoreError;

/// Append/query store for trade records. Records are immutable once
/// written; concurrent appends and reads go through the same pool.
#[derive(Clone)]
pub struct TradeStore {
    pool: SqlitePool,
}

impl TradeStore {
    pub async fn open(db_path: &str) -> Result<Self, StoreError> {
        Ok(Self {
            pool: db::connect(db_path).await?,
        })
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            pool: db::connect_in_memory().await?,
        })
    }

    pub async fn append(&self, record: &TradeRecordInsert) -> Result<i64, StoreError> {
        let result = sqlx::query(
            r#"
                INSERT INTO trades (
                    timestamp, asset, operation, amount_thb, coin_amount,
                    price, mode, deviation, log_message
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Utc::now())
        .bind(&record.asset)
        .bind(record.operation.as_str())
        .bind(record.amount_thb)
        .bind(record.coin_amount)
        .bind(record.price)
        .bind(record.mode.as_str())
        .bind(record.deviation)
        .bind(&record.log_message)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Most recent records for a mode, newest first.
    pub async fn recent(
        &self,
        mode: ExecutionMode,
        limit: i64,
    ) -> Result<Vec<TradeRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
                SELECT id, timestamp, asset, operation, amount_thb,
                       coin_amount, price, mode, deviation, log_message
                FROM trades
                WHERE mode = ?
                ORDER BY id DESC
                LIMIT ?
            "#,
        )
        .bind(mode.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let operation: String = row.try_get("operation")?;
            let mode: String = row.try_get("mode")?;
            let timestamp: DateTime<Utc> = row.try_get("timestamp")?;

            records.push(TradeRecord {
                id: row.try_get("id")?,
                timestamp,
                asset: row.try_get("asset")?,
                operation: operation.parse::<Side>().map_err(StoreError::Corrupt)?,
                amount_thb: row.try_get("amount_thb")?,
                coin_amount: row.try_get("coin_amount")?,
                price: row.try_get("price")?,
                mode: mode.parse::<ExecutionMode>().map_err(StoreError::Corrupt)?,
                deviation: row.try_get("deviation")?,
                log_message: row.try_get("log_message")?,
            });
        }

        Ok(records)
    }
}
