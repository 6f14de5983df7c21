//! Challenge planning.
//!
//! A challenge is a total study duration split into alternating study and
//! rest intervals. Planning turns it into the full, ordered list of
//! notification events up front, so the whole challenge lives in the event
//! store and can be replayed from the same inputs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChallengeError {
    #[error("challenge duration must be greater than zero")]
    EmptyDuration,
    #[error("study interval must be at least one minute")]
    EmptyStudyInterval,
    #[error("challenge task must not be empty")]
    EmptyTask,
}

/// A validated request to start a challenge. Consumed once to produce a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeRequest {
    pub user_id: i64,
    pub chat_id: i64,
    pub total_minutes: u32,
    pub study_minutes: u32,
    pub rest_minutes: u32,
    pub task: String,
}

impl ChallengeRequest {
    pub fn new(
        user_id: i64,
        chat_id: i64,
        hours: u32,
        study_minutes: u32,
        rest_minutes: u32,
        task: impl Into<String>,
    ) -> Result<Self, ChallengeError> {
        let task = task.into();
        let total_minutes = hours.saturating_mul(60);
        
        if total_minutes == 0 {
            return Err(ChallengeError::EmptyDuration);
        }
        if study_minutes == 0 {
            return Err(ChallengeError::EmptyStudyInterval);
        }
        if task.trim().is_empty() {
            return Err(ChallengeError::EmptyTask);
        }
        
        Ok(Self {
            user_id,
            chat_id,
            total_minutes,
            study_minutes,
            rest_minutes,
            task,
        })
    }

    /// Every SessionStart/SessionFinish event of this challenge, in firing order.
    pub fn plan(&self, start: DateTime<Utc>) -> Vec<PlannedEvent> {
        plan_sessions(self.total_minutes, self.study_minutes, self.rest_minutes, start)
            .into_iter()
            .flat_map(|slot| {
                let payload = EventPayload {
                    chat_id: self.chat_id,
                    user_id: self.user_id,
                    task: self.task.clone(),
                    session_index: slot.index,
                    minutes: slot.minutes,
                    rest_minutes: self.rest_minutes,
                };
                [
                    PlannedEvent::new(EventKind::SessionStart, slot.starts_at, payload.clone()),
                    PlannedEvent::new(EventKind::SessionFinish, slot.finishes_at, payload),
                ]
            })
            .collect()
    }
}

/// One study chunk of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSlot {
    /// 1-based position within the challenge.
    pub index: u32,
    pub starts_at: DateTime<Utc>,
    pub finishes_at: DateTime<Utc>,
    pub minutes: u32,
}

/// Splits `total_minutes` into study chunks separated by `rest_minutes`.
///
/// Each iteration consumes a chunk plus its trailing rest, including the last
/// one, so the final chunk may be shorter than `study_minutes` and the count is
/// `ceil(total / (study + rest))`. Returns no slots when `study_minutes` is 0.
pub fn plan_sessions(
    total_minutes: u32,
    study_minutes: u32,
    rest_minutes: u32,
    start: DateTime<Utc>,
) -> Vec<SessionSlot> {
    if study_minutes == 0 {
        return Vec::new();
    }
    
    let mut slots = Vec::new();
    let mut cursor = start;
    let mut remaining = i64::from(total_minutes);
    let mut index = 0;
    
    while remaining > 0 {
        index += 1;
        let chunk = i64::from(study_minutes).min(remaining);
        let finishes_at = cursor + Duration::minutes(chunk);
        
        slots.push(SessionSlot {
            index,
            starts_at: cursor,
            finishes_at,
            // chunk never exceeds study_minutes
            minutes: u32::try_from(chunk).unwrap_or(study_minutes),
        });
        
        cursor = finishes_at + Duration::minutes(i64::from(rest_minutes));
        remaining -= chunk + i64::from(rest_minutes);
    }
    
    slots
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SessionStart,
    SessionFinish,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SessionStart => "session_start",
            EventKind::SessionFinish => "session_finish",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            EventKind::SessionStart => "session",
            EventKind::SessionFinish => "finish",
        }
    }

    /// Tie-breaker when a finish and the next start share a fire time (no rest).
    fn order(&self) -> i64 {
        match self {
            EventKind::SessionStart => 0,
            EventKind::SessionFinish => 1,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown event kind `{0}`")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session_start" => Ok(EventKind::SessionStart),
            "session_finish" => Ok(EventKind::SessionFinish),
            other => Err(UnknownEventKind(other.to_string())),
        }
    }
}

/// Data the session handlers need when an event fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    pub chat_id: i64,
    pub user_id: i64,
    pub task: String,
    pub session_index: u32,
    /// Length of this study chunk.
    pub minutes: u32,
    pub rest_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEvent {
    /// Stable id derived from user, fire time and session index.
    pub id: String,
    pub kind: EventKind,
    pub fire_at: DateTime<Utc>,
    /// Position within the plan; orders events sharing a fire time.
    pub sequence: i64,
    pub payload: EventPayload,
}

impl PlannedEvent {
    pub fn new(kind: EventKind, fire_at: DateTime<Utc>, payload: EventPayload) -> Self {
        let id = format!(
            "{}_{}_{}_{}",
            kind.id_prefix(),
            payload.user_id,
            fire_at.timestamp(),
            payload.session_index
        );
        let sequence = (i64::from(payload.session_index) - 1) * 2 + kind.order();
        
        Self {
            id,
            kind,
            fire_at,
            sequence,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap()
    }

    fn ceil_div(a: u32, b: u32) -> usize {
        ((a + b - 1) / b) as usize
    }

    #[test]
    fn test_one_hour_fifty_ten_is_one_session() {
        let slots = plan_sessions(60, 50, 10, t0());
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].minutes, 50);
        assert_eq!(slots[0].starts_at, t0());
        assert_eq!(slots[0].finishes_at, t0() + Duration::minutes(50));
    }

    #[test]
    fn test_two_hours_fifty_ten_is_two_sessions() {
        let slots = plan_sessions(120, 50, 10, t0());
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].starts_at, t0() + Duration::minutes(60));
    }

    #[test]
    fn test_session_count_matches_ceiling() {
        for total in [1u32, 30, 59, 60, 61, 120, 179, 180, 300] {
            for (study, rest) in [(50u32, 10u32), (55, 5), (45, 15), (25, 0), (1, 0), (7, 3)] {
                let slots = plan_sessions(total, study, rest, t0());
                assert_eq!(
                    slots.len(),
                    ceil_div(total, study + rest),
                    "total={total} study={study} rest={rest}"
                );
            }
        }
    }

    #[test]
    fn test_final_chunk_is_truncated() {
        let slots = plan_sessions(100, 45, 15, t0());
        let minutes: Vec<u32> = slots.iter().map(|s| s.minutes).collect();
        assert_eq!(minutes, vec![45, 40]);
    }

    #[test]
    fn test_zero_study_minutes_plans_nothing() {
        assert!(plan_sessions(60, 0, 10, t0()).is_empty());
        assert!(plan_sessions(60, 0, 0, t0()).is_empty());
    }

    #[test]
    fn test_event_times_chain_study_and_rest() {
        let request = ChallengeRequest::new(42, 42, 3, 50, 10, "Calculus").unwrap();
        let events = request.plan(t0());
        
        assert_eq!(events.len(), 6);
        for pair in events.chunks(2) {
            let (start, finish) = (&pair[0], &pair[1]);
            assert_eq!(start.kind, EventKind::SessionStart);
            assert_eq!(finish.kind, EventKind::SessionFinish);
            assert_eq!(
                finish.fire_at,
                start.fire_at + Duration::minutes(i64::from(start.payload.minutes))
            );
        }
        for window in events.windows(3).step_by(2) {
            let (finish, next_start) = (&window[1], &window[2]);
            assert_eq!(next_start.fire_at, finish.fire_at + Duration::minutes(10));
        }
    }

    #[test]
    fn test_fire_times_and_sequences_are_monotonic() {
        let request = ChallengeRequest::new(1, 1, 4, 25, 0, "Reading").unwrap();
        let events = request.plan(t0());
        
        for pair in events.windows(2) {
            assert!(pair[0].fire_at <= pair[1].fire_at);
            assert!(pair[0].sequence < pair[1].sequence);
        }
    }

    #[test]
    fn test_ids_are_unique_and_deterministic() {
        let request = ChallengeRequest::new(7, 7, 5, 25, 0, "History").unwrap();
        let first = request.plan(t0());
        let second = request.plan(t0());
        
        assert_eq!(first, second);
        let ids: HashSet<&str> = first.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), first.len());
    }

    #[test]
    fn test_event_id_format() {
        let request = ChallengeRequest::new(99, 99, 1, 50, 10, "Bio").unwrap();
        let events = request.plan(t0());
        let ts = t0().timestamp();
        let finish_ts = (t0() + Duration::minutes(50)).timestamp();
        
        assert_eq!(events[0].id, format!("session_99_{ts}_1"));
        assert_eq!(events[1].id, format!("finish_99_{finish_ts}_1"));
    }

    #[test]
    fn test_finish_payload_carries_rest() {
        let request = ChallengeRequest::new(5, -100, 1, 50, 10, "Chemistry").unwrap();
        let events = request.plan(t0());
        let finish = &events[1].payload;
        
        assert_eq!(finish.chat_id, -100);
        assert_eq!(finish.user_id, 5);
        assert_eq!(finish.task, "Chemistry");
        assert_eq!(finish.session_index, 1);
        assert_eq!(finish.minutes, 50);
        assert_eq!(finish.rest_minutes, 10);
    }

    #[test]
    fn test_request_invariants() {
        assert_eq!(ChallengeRequest::new(1, 1, 0, 50, 10, "x"), Err(ChallengeError::EmptyDuration));
        assert_eq!(ChallengeRequest::new(1, 1, 1, 0, 10, "x"), Err(ChallengeError::EmptyStudyInterval));
        assert_eq!(ChallengeRequest::new(1, 1, 1, 50, 10, "  "), Err(ChallengeError::EmptyTask));
        assert_eq!(ChallengeRequest::new(1, 1, 2, 50, 0, "x").unwrap().total_minutes, 120);
    }

    #[test]
    fn test_event_kind_round_trip_names() {
        assert_eq!("session_start".parse::<EventKind>(), Ok(EventKind::SessionStart));
        assert_eq!(EventKind::SessionFinish.to_string(), "session_finish");
        assert!("reminder".parse::<EventKind>().is_err());
    }
}
