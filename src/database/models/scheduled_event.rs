use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Sqlite};

use crate::utils::datetime::to_db_timestamp;

/// Raw row of the durable event store. `fire_at` is unix seconds.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ScheduledEventRow {
    pub id: String,
    pub kind: String,
    pub fire_at: i64,
    pub sequence: i64,
    pub payload: String,
    pub created_at: String,
}

impl ScheduledEventRow {
    /// Stores the row, replacing any pending row with the same id.
    pub async fn upsert<'e, E>(
        executor: E,
        id: &str,
        kind: &str,
        fire_at: i64,
        sequence: i64,
        payload: &str,
    ) -> Result<(), sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO scheduled_events (id, kind, fire_at, sequence, payload, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id)
        .bind(kind)
        .bind(fire_at)
        .bind(sequence)
        .bind(payload)
        .bind(to_db_timestamp(&Utc::now()))
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn find_due(
        pool: &sqlx::SqlitePool,
        now: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ScheduledEventRow>(
            "SELECT id, kind, fire_at, sequence, payload, created_at FROM scheduled_events WHERE fire_at <= ? ORDER BY fire_at, sequence, id"
        )
        .bind(now)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ScheduledEventRow>(
            "SELECT id, kind, fire_at, sequence, payload, created_at FROM scheduled_events WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Removes the row; `true` means this caller owns the firing.
    pub async fn claim(
        pool: &sqlx::SqlitePool,
        id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scheduled_events WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        
        Ok(result.rows_affected() == 1)
    }

    pub async fn count_pending(pool: &sqlx::SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scheduled_events")
            .fetch_one(pool)
            .await
    }
}
