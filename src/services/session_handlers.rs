use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::database::{connection::DatabaseManager, models::*};
use crate::services::notifier::Notifier;
use crate::services::planner::EventPayload;
use crate::services::rewards::{
    weekly_threshold_reached, BadgePolicy, POINTS_PER_SESSION, WEEKLY_BADGE_NAME, WEEKLY_WINDOW_DAYS,
};
use crate::services::scheduler::EventHandler;

/// Side effects of challenge events: notifications, session log, points and badges.
pub struct SessionHandlers<N> {
    db: DatabaseManager,
    notifier: N,
    badge_policy: BadgePolicy,
}

impl<N: Notifier> SessionHandlers<N> {
    pub fn new(db: DatabaseManager, notifier: N) -> Self {
        Self {
            db,
            notifier,
            badge_policy: BadgePolicy::default(),
        }
    }

    pub fn with_badge_policy(mut self, badge_policy: BadgePolicy) -> Self {
        self.badge_policy = badge_policy;
        self
    }

    async fn notify_best_effort(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.notifier.notify(chat_id, text).await {
            tracing::warn!("Failed to notify chat {}: {:#}", chat_id, e);
        }
    }

    /// Persists the finished chunk, its points and the streak update together.
    async fn record_finish(&self, payload: &EventPayload, finished_at: DateTime<Utc>) -> anyhow::Result<()> {
        let minutes = i64::from(payload.minutes);
        let started_at = finished_at - Duration::minutes(minutes);
        
        let mut tx = self.db.pool.begin().await?;
        User::ensure_exists(&mut *tx, payload.user_id).await?;
        StudySession::record_completed(&mut *tx, payload.user_id, &payload.task, started_at, minutes).await?;
        User::add_points(&mut *tx, payload.user_id, POINTS_PER_SESSION).await?;
        User::record_study_day(&mut *tx, payload.user_id, finished_at).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn should_award_weekly_badge(&self, user_id: i64, weekly_minutes: i64, window_start: DateTime<Utc>) -> anyhow::Result<bool> {
        if !weekly_threshold_reached(weekly_minutes) {
            return Ok(false);
        }
        
        match self.badge_policy {
            BadgePolicy::Repeat => Ok(true),
            BadgePolicy::OncePerWeek => {
                let held = Badge::held_since(&self.db.pool, user_id, WEEKLY_BADGE_NAME, window_start).await?;
                Ok(!held)
            }
        }
    }
}

#[async_trait]
impl<N: Notifier> EventHandler for SessionHandlers<N> {
    async fn session_start(&self, payload: &EventPayload, _due_at: DateTime<Utc>) -> anyhow::Result<()> {
        let text = format!(
            "📚 Session {} started: {} minutes of {}. Focus time!",
            payload.session_index, payload.minutes, payload.task
        );
        self.notify_best_effort(payload.chat_id, &text).await;
        Ok(())
    }

    async fn session_finish(&self, payload: &EventPayload, due_at: DateTime<Utc>) -> anyhow::Result<()> {
        self.record_finish(payload, due_at).await?;
        
        let break_hint = if payload.rest_minutes > 0 {
            format!("Take a {}-minute break now.", payload.rest_minutes)
        } else {
            "Keep the momentum going!".to_string()
        };
        let text = format!(
            "✅ Session {} done: {} minutes. +{} points.\n{}",
            payload.session_index, payload.minutes, POINTS_PER_SESSION, break_hint
        );
        self.notify_best_effort(payload.chat_id, &text).await;
        
        let window_start = due_at - Duration::days(WEEKLY_WINDOW_DAYS);
        let weekly_minutes = StudySession::completed_minutes_since(&self.db.pool, payload.user_id, window_start).await?;
        
        if self.should_award_weekly_badge(payload.user_id, weekly_minutes, window_start).await? {
            Badge::award(&self.db.pool, payload.user_id, WEEKLY_BADGE_NAME, due_at).await?;
            tracing::info!(
                "Awarded '{}' to user {} ({} minutes this week)",
                WEEKLY_BADGE_NAME, payload.user_id, weekly_minutes
            );
            let text = format!("🏅 Congratulations! You earned the badge: {WEEKLY_BADGE_NAME}");
            self.notify_best_effort(payload.chat_id, &text).await;
        }
        
        Ok(())
    }
}
