use chrono::{Duration, Utc};
use teloxide::prelude::*;

use crate::database::{connection::DatabaseManager, models::*};
use crate::services::rewards::WEEKLY_WINDOW_DAYS;
use crate::utils::{
    datetime::{format_minutes, format_stored_date},
    feedback::CommandFeedback,
    logging::log_database_error,
};

/// Snapshot of a user's progress shown by /stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSummary {
    pub total_minutes: i64,
    pub weekly_minutes: i64,
    pub points: i64,
    pub streak: i64,
    pub badges: usize,
}

impl ProgressSummary {
    pub async fn load(db: &DatabaseManager, user_id: i64) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        let total_minutes = StudySession::total_completed_minutes(&db.pool, user_id).await?;
        let weekly_minutes =
            StudySession::completed_minutes_since(&db.pool, user_id, now - Duration::days(WEEKLY_WINDOW_DAYS)).await?;
        let user = User::find_by_id(&db.pool, user_id).await?;
        let badges = Badge::find_by_user(&db.pool, user_id).await?.len();
        
        Ok(Self {
            total_minutes,
            weekly_minutes,
            points: user.as_ref().map_or(0, |u| u.points),
            streak: user.as_ref().map_or(0, |u| u.streak),
            badges,
        })
    }

    pub fn render(&self) -> String {
        format!(
            "📈 Total study time: {}\n🗓 Last 7 days: {}\n⭐ Points: {}\n🔥 Streak: {} day(s)\n🏅 Badges: {}",
            format_minutes(self.total_minutes),
            format_minutes(self.weekly_minutes),
            self.points,
            self.streak,
            self.badges
        )
    }
}

pub async fn handle_stats(bot: Bot, chat_id: ChatId, user_id: i64, db: &DatabaseManager) -> ResponseResult<()> {
    let feedback = CommandFeedback::new(bot.clone(), chat_id);
    
    match ProgressSummary::load(db, user_id).await {
        Ok(summary) => {
            bot.send_message(chat_id, summary.render()).await?;
        }
        Err(e) => {
            log_database_error("load progress", "sessions", &e.to_string());
            feedback.error("Failed to load your progress").await?;
        }
    }
    Ok(())
}

pub fn render_badges(badges: &[Badge]) -> String {
    if badges.is_empty() {
        return "No badges yet. Keep going!".to_string();
    }
    
    let mut text = String::from("Your badges:\n");
    for badge in badges {
        text.push_str(&format!("🏅 {} ({})\n", badge.name, format_stored_date(&badge.awarded_at)));
    }
    text
}

pub async fn handle_badges(bot: Bot, chat_id: ChatId, user_id: i64, db: &DatabaseManager) -> ResponseResult<()> {
    let feedback = CommandFeedback::new(bot.clone(), chat_id);
    
    match Badge::find_by_user(&db.pool, user_id).await {
        Ok(badges) => {
            bot.send_message(chat_id, render_badges(&badges)).await?;
        }
        Err(e) => {
            log_database_error("find_by_user", "badges", &e.to_string());
            feedback.error("Failed to load your badges").await?;
        }
    }
    Ok(())
}
