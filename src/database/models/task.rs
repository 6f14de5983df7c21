use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::datetime::to_db_timestamp;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: String,
    pub done: bool,
}

impl Task {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        title: &str,
    ) -> Result<Self, sqlx::Error> {
        let now = to_db_timestamp(&Utc::now());
        
        let result = sqlx::query(
            "INSERT INTO tasks (user_id, title, created_at, done) VALUES (?, ?, ?, 0)"
        )
        .bind(user_id)
        .bind(title)
        .bind(&now)
        .execute(pool)
        .await?;
        
        Ok(Task {
            id: result.last_insert_rowid(),
            user_id,
            title: title.to_string(),
            created_at: now,
            done: false,
        })
    }

    pub async fn find_by_user(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "SELECT id, user_id, title, created_at, done FROM tasks WHERE user_id = ? ORDER BY id"
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Returns `false` when the task does not exist or belongs to someone else.
    pub async fn mark_done(
        pool: &sqlx::SqlitePool,
        task_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE tasks SET done = 1 WHERE id = ? AND user_id = ?")
            .bind(task_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        
        Ok(result.rows_affected() > 0)
    }
}
