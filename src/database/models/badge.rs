use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Sqlite};

use crate::utils::datetime::to_db_timestamp;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Badge {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub awarded_at: String,
}

impl Badge {
    pub async fn award<'e, E>(
        executor: E,
        user_id: i64,
        name: &str,
        awarded_at: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("INSERT INTO badges (user_id, name, awarded_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(name)
            .bind(to_db_timestamp(&awarded_at))
            .execute(executor)
            .await?;
        
        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_user(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Badge>(
            "SELECT id, user_id, name, awarded_at FROM badges WHERE user_id = ? ORDER BY awarded_at, id"
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn held_since(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        name: &str,
        since: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM badges WHERE user_id = ? AND name = ? AND awarded_at >= ?"
        )
        .bind(user_id)
        .bind(name)
        .bind(to_db_timestamp(&since))
        .fetch_one(pool)
        .await?;
        
        Ok(count > 0)
    }
}
