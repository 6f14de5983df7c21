#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};
use trelox_bot::database::connection::DatabaseManager;
use trelox_bot::services::planner::{ChallengeRequest, EventKind, EventPayload};
use trelox_bot::services::scheduler::{EventHandler, SchedulerGateway, TickReport};

#[derive(Default)]
struct RecordingHandler {
    fired: Mutex<Vec<(EventKind, u32)>>,
    due_times: Mutex<Vec<DateTime<Utc>>>,
    fail_start_of: Option<u32>,
    stall_start_of: Option<u32>,
}

impl RecordingHandler {
    fn fired(&self) -> Vec<(EventKind, u32)> {
        self.fired.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn session_start(&self, payload: &EventPayload, due_at: DateTime<Utc>) -> anyhow::Result<()> {
        self.due_times.lock().unwrap().push(due_at);
        if self.stall_start_of == Some(payload.session_index) {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        }
        self.fired.lock().unwrap().push((EventKind::SessionStart, payload.session_index));
        if self.fail_start_of == Some(payload.session_index) {
            anyhow::bail!("notify failed");
        }
        Ok(())
    }

    async fn session_finish(&self, payload: &EventPayload, due_at: DateTime<Utc>) -> anyhow::Result<()> {
        self.due_times.lock().unwrap().push(due_at);
        self.fired.lock().unwrap().push((EventKind::SessionFinish, payload.session_index));
        Ok(())
    }
}

async fn setup_test_db() -> (DatabaseManager, TempDir, String) {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.to_string_lossy());
    
    let db = DatabaseManager::new(&db_url).await.unwrap();
    db.run_migrations().await.unwrap();
    (db, dir, db_url)
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 14, 0, 0).unwrap()
}

fn request(hours: u32, study: u32, rest: u32) -> ChallengeRequest {
    ChallengeRequest::new(1001, 1001, hours, study, rest, "Statistics").unwrap()
}

#[tokio::test]
async fn test_register_twice_fires_once() {
    let (db, _dir, _) = setup_test_db().await;
    let handler = Arc::new(RecordingHandler::default());
    let gateway = SchedulerGateway::new(db, handler.clone());
    
    let events = request(2, 50, 10).plan(t0());
    gateway.register_plan(&events).await.unwrap();
    gateway.register_plan(&events).await.unwrap();
    for event in &events {
        gateway.register(event).await.unwrap();
    }
    assert_eq!(gateway.pending_count().await.unwrap(), 4);
    
    let report = gateway.run_due(t0() + Duration::hours(3)).await.unwrap();
    assert_eq!(report, TickReport { fired: 4, failed: 0, skipped: 0 });
    
    let again = gateway.run_due(t0() + Duration::hours(4)).await.unwrap();
    assert!(again.is_empty());
    
    assert_eq!(
        handler.fired(),
        vec![
            (EventKind::SessionStart, 1),
            (EventKind::SessionFinish, 1),
            (EventKind::SessionStart, 2),
            (EventKind::SessionFinish, 2),
        ]
    );
    assert_eq!(gateway.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_only_due_events_fire() {
    let (db, _dir, _) = setup_test_db().await;
    let handler = Arc::new(RecordingHandler::default());
    let gateway = SchedulerGateway::new(db, handler.clone());
    
    gateway.register_plan(&request(1, 50, 10).plan(t0())).await.unwrap();
    
    let report = gateway.run_due(t0() - Duration::seconds(1)).await.unwrap();
    assert!(report.is_empty());
    
    let report = gateway.run_due(t0() + Duration::minutes(10)).await.unwrap();
    assert_eq!(report.fired, 1);
    assert_eq!(handler.fired(), vec![(EventKind::SessionStart, 1)]);
    assert_eq!(gateway.pending_count().await.unwrap(), 1);
    
    gateway.run_due(t0() + Duration::minutes(50)).await.unwrap();
    assert_eq!(handler.fired().len(), 2);
}

#[tokio::test]
async fn test_pending_events_survive_restart() {
    let (db, _dir, db_url) = setup_test_db().await;
    let events = request(1, 50, 10).plan(t0());
    
    {
        let gateway = SchedulerGateway::new(db.clone(), Arc::new(RecordingHandler::default()));
        gateway.register_plan(&events).await.unwrap();
    }
    db.pool.close().await;
    
    let reopened = DatabaseManager::new(&db_url).await.unwrap();
    reopened.run_migrations().await.unwrap();
    let handler = Arc::new(RecordingHandler::default());
    let gateway = SchedulerGateway::new(reopened, handler.clone());
    
    let stored = gateway.pending(&events[1].id).await.unwrap().unwrap();
    assert_eq!(stored, events[1]);
    
    let report = gateway.run_due(t0() + Duration::hours(1)).await.unwrap();
    assert_eq!(report.fired, 2);
    assert_eq!(handler.fired(), vec![(EventKind::SessionStart, 1), (EventKind::SessionFinish, 1)]);
}

#[tokio::test]
async fn test_failing_handler_does_not_block_others() {
    let (db, _dir, _) = setup_test_db().await;
    let handler = Arc::new(RecordingHandler {
        fail_start_of: Some(1),
        ..Default::default()
    });
    let gateway = SchedulerGateway::new(db, handler.clone());
    
    gateway.register_plan(&request(2, 50, 10).plan(t0())).await.unwrap();
    let report = gateway.run_due(t0() + Duration::hours(2)).await.unwrap();
    
    assert_eq!(report, TickReport { fired: 3, failed: 1, skipped: 0 });
    assert_eq!(handler.fired().len(), 4);
    
    // No retry for the failed event
    let again = gateway.run_due(t0() + Duration::hours(3)).await.unwrap();
    assert!(again.is_empty());
    assert_eq!(handler.fired().len(), 4);
}

#[tokio::test]
async fn test_stalled_handler_times_out() {
    let (db, _dir, _) = setup_test_db().await;
    let handler = Arc::new(RecordingHandler {
        stall_start_of: Some(1),
        ..Default::default()
    });
    let gateway = SchedulerGateway::new(db, handler.clone())
        .with_handler_timeout(std::time::Duration::from_millis(50));
    
    gateway.register_plan(&request(1, 50, 10).plan(t0())).await.unwrap();
    let report = gateway.run_due(t0() + Duration::hours(1)).await.unwrap();
    
    assert_eq!(report, TickReport { fired: 1, failed: 1, skipped: 0 });
    assert_eq!(handler.fired(), vec![(EventKind::SessionFinish, 1)]);
}

#[tokio::test]
async fn test_back_to_back_sessions_keep_plan_order() {
    let (db, _dir, _) = setup_test_db().await;
    let handler = Arc::new(RecordingHandler::default());
    let gateway = SchedulerGateway::new(db, handler.clone());
    
    // No rest: each finish shares its fire time with the next start
    gateway.register_plan(&request(1, 20, 0).plan(t0())).await.unwrap();
    gateway.run_due(t0() + Duration::hours(1)).await.unwrap();
    
    assert_eq!(
        handler.fired(),
        vec![
            (EventKind::SessionStart, 1),
            (EventKind::SessionFinish, 1),
            (EventKind::SessionStart, 2),
            (EventKind::SessionFinish, 2),
            (EventKind::SessionStart, 3),
            (EventKind::SessionFinish, 3),
        ]
    );
}

#[tokio::test]
async fn test_misfire_grace_drops_late_events() {
    let (db, _dir, _) = setup_test_db().await;
    let handler = Arc::new(RecordingHandler::default());
    let gateway = SchedulerGateway::new(db, handler.clone())
        .with_misfire_grace(Some(std::time::Duration::from_secs(60)));
    
    gateway.register_plan(&request(1, 50, 10).plan(t0())).await.unwrap();
    
    // Start is 50 minutes late, finish exactly on time
    let report = gateway.run_due(t0() + Duration::minutes(50)).await.unwrap();
    
    assert_eq!(report, TickReport { fired: 1, failed: 0, skipped: 1 });
    assert_eq!(handler.fired(), vec![(EventKind::SessionFinish, 1)]);
    assert_eq!(gateway.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_late_events_fire_without_grace() {
    let (db, _dir, _) = setup_test_db().await;
    let handler = Arc::new(RecordingHandler::default());
    let gateway = SchedulerGateway::new(db, handler.clone());
    
    gateway.register_plan(&request(1, 50, 10).plan(t0())).await.unwrap();
    let report = gateway.run_due(t0() + Duration::days(2)).await.unwrap();
    
    assert_eq!(report.fired, 2);
}

#[tokio::test]
async fn test_concurrent_ticks_fire_each_event_once() {
    let (db, _dir, _) = setup_test_db().await;
    let handler = Arc::new(RecordingHandler::default());
    let gateway = SchedulerGateway::new(db, handler.clone());
    
    gateway.register_plan(&request(5, 25, 5).plan(t0())).await.unwrap();
    let now = t0() + Duration::hours(6);
    
    let first = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.run_due(now).await.unwrap() }
    });
    let second = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.run_due(now).await.unwrap() }
    });
    
    let total = first.await.unwrap().fired + second.await.unwrap().fired;
    assert_eq!(total, 20);
    assert_eq!(handler.fired().len(), 20);
}

#[tokio::test]
async fn test_users_do_not_share_event_ids() {
    let (db, _dir, _) = setup_test_db().await;
    let gateway = SchedulerGateway::new(db, Arc::new(RecordingHandler::default()));
    
    let alice = ChallengeRequest::new(1, 1, 1, 50, 10, "Maths").unwrap();
    let bob = ChallengeRequest::new(2, 2, 1, 50, 10, "Maths").unwrap();
    gateway.register_plan(&alice.plan(t0())).await.unwrap();
    gateway.register_plan(&bob.plan(t0())).await.unwrap();
    
    assert_eq!(gateway.pending_count().await.unwrap(), 4);
}

#[tokio::test]
async fn test_late_events_receive_planned_fire_time() {
    let (db, _dir, _) = setup_test_db().await;
    let handler = Arc::new(RecordingHandler::default());
    let gateway = SchedulerGateway::new(db, handler.clone());
    
    let events = request(2, 50, 10).plan(t0());
    gateway.register_plan(&events).await.unwrap();
    gateway.run_due(t0() + Duration::days(3)).await.unwrap();
    
    let planned: Vec<_> = events.iter().map(|e| e.fire_at).collect();
    assert_eq!(*handler.due_times.lock().unwrap(), planned);
}
