use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Sqlite};

use crate::utils::datetime::to_db_timestamp;

/// A finished study chunk. Rows are only ever written when a session finishes.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StudySession {
    pub id: i64,
    pub user_id: i64,
    pub task: String,
    pub started_at: String,
    pub duration_minutes: i64,
    pub completed: bool,
}

impl StudySession {
    pub async fn record_completed<'e, E>(
        executor: E,
        user_id: i64,
        task: &str,
        started_at: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Result<i64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO sessions (user_id, task, started_at, duration_minutes, completed)
            VALUES (?, ?, ?, ?, 1)
            "#
        )
        .bind(user_id)
        .bind(task)
        .bind(to_db_timestamp(&started_at))
        .bind(duration_minutes)
        .execute(executor)
        .await?;
        
        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_user(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, StudySession>(
            "SELECT id, user_id, task, started_at, duration_minutes, completed FROM sessions WHERE user_id = ? ORDER BY started_at"
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Completed minutes for sessions started at or after `since`.
    pub async fn completed_minutes_since(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(duration_minutes), 0) FROM sessions WHERE user_id = ? AND started_at >= ? AND completed = 1"
        )
        .bind(user_id)
        .bind(to_db_timestamp(&since))
        .fetch_one(pool)
        .await
    }

    pub async fn total_completed_minutes(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(duration_minutes), 0) FROM sessions WHERE user_id = ? AND completed = 1"
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
