//! Scheduler Gateway over the durable event store.
//!
//! Planned events are written to `scheduled_events` keyed by their stable id,
//! so re-registering a plan replaces rows instead of duplicating them and a
//! restart picks up whatever is still pending. A background job polls for due
//! rows, claims each one by deleting it, then hands it to the [`EventHandler`].
//! Claim-before-dispatch makes delivery at-most-once: a handler that fails or
//! times out is logged and never retried.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::database::{connection::DatabaseManager, models::ScheduledEventRow};
use crate::services::planner::{EventKind, EventPayload, PlannedEvent, UnknownEventKind};
use crate::utils::logging::{log_scheduler_event, log_scheduler_failure};

const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("event store error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid event payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error(transparent)]
    UnknownKind(#[from] UnknownEventKind),
    #[error("fire time {0} is out of range")]
    InvalidFireTime(i64),
    #[error("scheduler engine error: {0}")]
    Engine(#[from] JobSchedulerError),
}

/// Callbacks invoked when events come due.
///
/// `due_at` is the event's planned fire time, not the tick that picked it up,
/// so events replayed after downtime are booked at the time they belong to.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn session_start(&self, payload: &EventPayload, due_at: DateTime<Utc>) -> anyhow::Result<()>;
    async fn session_finish(&self, payload: &EventPayload, due_at: DateTime<Utc>) -> anyhow::Result<()>;
}

/// Outcome of one pass over the due events.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub fired: usize,
    pub failed: usize,
    /// Dropped because they were later than the misfire grace.
    pub skipped: usize,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.fired == 0 && self.failed == 0 && self.skipped == 0
    }
}

impl TryFrom<ScheduledEventRow> for PlannedEvent {
    type Error = SchedulerError;

    fn try_from(row: ScheduledEventRow) -> Result<Self, Self::Error> {
        let fire_at = Utc
            .timestamp_opt(row.fire_at, 0)
            .single()
            .ok_or(SchedulerError::InvalidFireTime(row.fire_at))?;
        
        Ok(PlannedEvent {
            id: row.id,
            kind: row.kind.parse()?,
            fire_at,
            sequence: row.sequence,
            payload: serde_json::from_str(&row.payload)?,
        })
    }
}

#[derive(Clone)]
pub struct SchedulerGateway {
    db: DatabaseManager,
    handler: Arc<dyn EventHandler>,
    handler_timeout: Duration,
    misfire_grace: Option<Duration>,
    tick_lock: Arc<Mutex<()>>,
}

impl SchedulerGateway {
    pub fn new(db: DatabaseManager, handler: Arc<dyn EventHandler>) -> Self {
        Self {
            db,
            handler,
            handler_timeout: DEFAULT_HANDLER_TIMEOUT,
            misfire_grace: None,
            tick_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = timeout;
        self
    }

    pub fn with_misfire_grace(mut self, grace: Option<Duration>) -> Self {
        self.misfire_grace = grace;
        self
    }

    /// Stores one event; an existing event with the same id is replaced.
    pub async fn register(&self, event: &PlannedEvent) -> Result<(), SchedulerError> {
        let payload = serde_json::to_string(&event.payload)?;
        ScheduledEventRow::upsert(
            &self.db.pool,
            &event.id,
            event.kind.as_str(),
            event.fire_at.timestamp(),
            event.sequence,
            &payload,
        )
        .await?;
        
        log_scheduler_event("registered", &event.id, Some(&event.fire_at.to_rfc3339()));
        Ok(())
    }

    /// Stores a whole plan atomically. Returns the number of events written.
    pub async fn register_plan(&self, events: &[PlannedEvent]) -> Result<usize, SchedulerError> {
        let mut tx = self.db.pool.begin().await?;
        
        for event in events {
            let payload = serde_json::to_string(&event.payload)?;
            ScheduledEventRow::upsert(
                &mut *tx,
                &event.id,
                event.kind.as_str(),
                event.fire_at.timestamp(),
                event.sequence,
                &payload,
            )
            .await?;
        }
        
        tx.commit().await?;
        
        if let (Some(first), Some(last)) = (events.first(), events.last()) {
            log_scheduler_event(
                "registered plan",
                &first.id,
                Some(&format!("{} events until {}", events.len(), last.fire_at.to_rfc3339())),
            );
        }
        Ok(events.len())
    }

    pub async fn pending(&self, id: &str) -> Result<Option<PlannedEvent>, SchedulerError> {
        ScheduledEventRow::find_by_id(&self.db.pool, id)
            .await?
            .map(PlannedEvent::try_from)
            .transpose()
    }

    pub async fn pending_count(&self) -> Result<i64, SchedulerError> {
        Ok(ScheduledEventRow::count_pending(&self.db.pool).await?)
    }

    /// Fires every event due at `now`, in fire-time order.
    ///
    /// Only storage errors while listing due events abort the pass; anything
    /// that goes wrong with a single event is logged and counted.
    pub async fn run_due(&self, now: DateTime<Utc>) -> Result<TickReport, SchedulerError> {
        let _tick = self.tick_lock.lock().await;
        let mut report = TickReport::default();
        
        let due = ScheduledEventRow::find_due(&self.db.pool, now.timestamp()).await?;
        
        for row in due {
            let id = row.id.clone();
            
            match ScheduledEventRow::claim(&self.db.pool, &id).await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    log_scheduler_failure("claim", &id, &e.to_string());
                    report.failed += 1;
                    continue;
                }
            }
            
            let event = match PlannedEvent::try_from(row) {
                Ok(event) => event,
                Err(e) => {
                    log_scheduler_failure("decode", &id, &e.to_string());
                    report.failed += 1;
                    continue;
                }
            };
            
            if self.is_misfire(&event, now) {
                log_scheduler_event(
                    "skipped misfire",
                    &id,
                    Some(&format!("was due {}", event.fire_at.to_rfc3339())),
                );
                report.skipped += 1;
                continue;
            }
            
            match tokio::time::timeout(self.handler_timeout, self.dispatch(&event)).await {
                Ok(Ok(())) => {
                    log_scheduler_event("fired", &id, Some(event.kind.as_str()));
                    report.fired += 1;
                }
                Ok(Err(e)) => {
                    log_scheduler_failure("handler", &id, &format!("{e:#}"));
                    report.failed += 1;
                }
                Err(_) => {
                    log_scheduler_failure(
                        "handler",
                        &id,
                        &format!("timed out after {}s", self.handler_timeout.as_secs()),
                    );
                    report.failed += 1;
                }
            }
        }
        
        Ok(report)
    }

    fn is_misfire(&self, event: &PlannedEvent, now: DateTime<Utc>) -> bool {
        let Some(grace) = self.misfire_grace else {
            return false;
        };
        let late_by = now.signed_duration_since(event.fire_at);
        late_by.to_std().map(|late| late > grace).unwrap_or(false)
    }

    async fn dispatch(&self, event: &PlannedEvent) -> anyhow::Result<()> {
        match event.kind {
            EventKind::SessionStart => self.handler.session_start(&event.payload, event.fire_at).await,
            EventKind::SessionFinish => self.handler.session_finish(&event.payload, event.fire_at).await,
        }
    }
}

/// Background driver that ticks the gateway on a fixed interval.
pub struct SchedulerService {
    gateway: SchedulerGateway,
    poll_interval: Duration,
    scheduler: JobScheduler,
}

impl SchedulerService {
    pub async fn new(gateway: SchedulerGateway, poll_interval: Duration) -> Result<Self, SchedulerError> {
        let scheduler = JobScheduler::new().await?;
        
        Ok(Self {
            gateway,
            poll_interval,
            scheduler,
        })
    }
    
    pub async fn start(&mut self) -> Result<(), SchedulerError> {
        // Catch up on anything that came due while the process was down
        let report = self.gateway.run_due(Utc::now()).await?;
        if !report.is_empty() {
            tracing::info!("Startup catch-up: {:?}", report);
        }
        
        let gateway = self.gateway.clone();
        let tick_job = Job::new_repeated_async(self.poll_interval, move |_uuid, _l| {
            let gateway = gateway.clone();
            Box::pin(async move {
                match gateway.run_due(Utc::now()).await {
                    Ok(report) if report.is_empty() => {}
                    Ok(report) => tracing::debug!("Scheduler tick: {:?}", report),
                    Err(e) => tracing::error!("Scheduler tick failed: {}", e),
                }
            })
        })?;
        
        self.scheduler.add(tick_job).await?;
        self.scheduler.start().await?;
        
        tracing::info!(
            "Scheduler service started - polling every {}s",
            self.poll_interval.as_secs()
        );
        Ok(())
    }
    
    pub async fn stop(&mut self) -> Result<(), SchedulerError> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}
