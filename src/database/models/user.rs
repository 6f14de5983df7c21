use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Sqlite};

use crate::utils::datetime::{to_db_day, to_db_timestamp};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub created_at: String,
    pub points: i64,
    pub streak: i64,
    pub last_study_day: Option<String>,
}

impl User {
    /// Registers a Telegram user, refreshing the display names if the row already exists.
    pub async fn ensure(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        username: Option<String>,
        first_name: Option<String>,
    ) -> Result<Self, sqlx::Error> {
        let now = to_db_timestamp(&Utc::now());
        
        sqlx::query(
            r#"
            INSERT INTO users (id, username, first_name, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                first_name = excluded.first_name
            "#
        )
        .bind(user_id)
        .bind(&username)
        .bind(&first_name)
        .bind(&now)
        .execute(pool)
        .await?;
        
        Self::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, first_name, created_at, points, streak, last_study_day FROM users WHERE id = ?"
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Inserts a bare row for users first seen through a scheduled event.
    pub async fn ensure_exists<'e, E>(executor: E, user_id: i64) -> Result<(), sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query("INSERT OR IGNORE INTO users (id, created_at) VALUES (?, ?)")
            .bind(user_id)
            .bind(to_db_timestamp(&Utc::now()))
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn add_points<'e, E>(executor: E, user_id: i64, points: i64) -> Result<(), sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query("UPDATE users SET points = points + ? WHERE id = ?")
            .bind(points)
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Moves the daily streak forward for a study day.
    ///
    /// Studying again on the same day keeps the streak, the following day
    /// extends it, and any gap restarts it at 1.
    pub async fn record_study_day<'e, E>(
        executor: E,
        user_id: i64,
        at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let today = to_db_day(&at);
        let yesterday = to_db_day(&(at - Duration::days(1)));
        
        sqlx::query(
            r#"
            UPDATE users SET
                streak = CASE
                    WHEN last_study_day = ? THEN streak
                    WHEN last_study_day = ? THEN streak + 1
                    ELSE 1
                END,
                last_study_day = ?
            WHERE id = ?
            "#
        )
        .bind(&today)
        .bind(&yesterday)
        .bind(&today)
        .bind(user_id)
        .execute(executor)
        .await?;
        Ok(())
    }
}
