//! Keeps the freshest flood point set available without client action.
//!
//! A background tokio task fetches the full set on a fixed period and
//! swaps it in atomically through a `watch` channel. Failed fetches leave
//! the previous set in place (stale-but-available); there is no backoff,
//! the next natural tick is the retry.

use crate::error::AppError;
use crate::models::{ExclusionToken, FloodPoint, RouteErrorKind, RouteFailure, RouteQuery};
use crate::services::exclusion::build_exclusions;
use crate::services::flood_source::FloodDataSource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// The point set as of the last successful refresh.
#[derive(Debug, Clone, Default)]
pub struct FloodSnapshot {
    pub points: Arc<Vec<FloodPoint>>,
    pub refreshed_at: Option<OffsetDateTime>,
}

impl FloodSnapshot {
    pub fn is_loaded(&self) -> bool {
        self.refreshed_at.is_some()
    }

    /// Exclusion tokens for `query` against this snapshot.
    ///
    /// With avoidance on, a set that never loaded is
    /// `DataSourceUnavailable`. Incomplete queries pass through for the
    /// client to reject.
    pub fn exclusions_for(
        &self,
        query: &RouteQuery,
    ) -> std::result::Result<Vec<ExclusionToken>, RouteFailure> {
        if !query.avoid_flood || !query.is_complete() {
            return Ok(Vec::new());
        }
        if !self.is_loaded() {
            return Err(RouteFailure::new(
                RouteErrorKind::DataSourceUnavailable,
                "flood data has not loaded yet; cannot avoid flooded points",
            ));
        }
        Ok(build_exclusions(&self.points))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Set replaced; number of points now held
    Updated(usize),
    /// Fetch failed, previous set retained
    Failed(String),
    /// Another fetch was still in flight
    Skipped,
}

type UpdateCallback = Box<dyn Fn(&[FloodPoint]) + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&AppError) + Send + Sync>;

struct Shared {
    source: Arc<dyn FloodDataSource>,
    snapshot: watch::Sender<FloodSnapshot>,
    in_flight: AtomicBool,
}

/// Held while a fetch runs; releases the in-flight flag on drop, including
/// when the fetch future is cancelled.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Shared {
    async fn refresh(&self) -> (RefreshOutcome, Option<AppError>) {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("Flood refresh skipped: previous fetch still in flight");
            return (RefreshOutcome::Skipped, None);
        };

        match self.source.fetch_points().await {
            Ok(points) => {
                let count = points.len();
                self.snapshot.send_replace(FloodSnapshot {
                    points: Arc::new(points),
                    refreshed_at: Some(OffsetDateTime::now_utc()),
                });
                tracing::debug!(points = count, "Flood data refreshed: {} points", count);
                (RefreshOutcome::Updated(count), None)
            }
            Err(e) => {
                tracing::warn!("Flood data refresh failed, keeping previous set: {}", e);
                (RefreshOutcome::Failed(e.to_string()), Some(e))
            }
        }
    }
}

#[derive(Clone)]
pub struct LiveDataSynchronizer {
    shared: Arc<Shared>,
    stop_tx: Arc<Mutex<Option<watch::Sender<bool>>>>,
}

impl LiveDataSynchronizer {
    pub fn new(source: Arc<dyn FloodDataSource>) -> Self {
        let (snapshot, _) = watch::channel(FloodSnapshot::default());
        LiveDataSynchronizer {
            shared: Arc::new(Shared {
                source,
                snapshot,
                in_flight: AtomicBool::new(false),
            }),
            stop_tx: Arc::new(Mutex::new(None)),
        }
    }

    /// Begin the recurring refresh cycle. The first fetch happens one
    /// `interval` after start; call [`refresh_now`](Self::refresh_now) for an
    /// immediate load. Starting an already running synchronizer is a no-op.
    pub fn start<U, E>(&self, interval: Duration, on_update: U, on_error: E)
    where
        U: Fn(&[FloodPoint]) + Send + Sync + 'static,
        E: Fn(&AppError) + Send + Sync + 'static,
    {
        let mut slot = self.stop_tx.lock().unwrap_or_else(|p| p.into_inner());
        if slot.is_some() {
            tracing::warn!("Flood synchronizer already running, ignoring start");
            return;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        *slot = Some(stop_tx);

        tracing::info!(
            interval_ms = interval.as_millis() as u64,
            "Starting flood synchronizer every {}ms",
            interval.as_millis()
        );

        tokio::spawn(run_cycle(
            self.shared.clone(),
            interval,
            stop_rx,
            Box::new(on_update),
            Box::new(on_error),
        ));
    }

    /// Cancel future ticks. An in-flight fetch is allowed to finish.
    /// Calling it again, or before `start`, does nothing.
    pub fn stop(&self) {
        let taken = self
            .stop_tx
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(stop_tx) = taken {
            stop_tx.send_replace(true);
            tracing::info!("Flood synchronizer stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_some()
    }

    /// One guarded fetch-and-replace cycle, outside the schedule.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.shared.refresh().await.0
    }

    pub fn snapshot(&self) -> FloodSnapshot {
        self.shared.snapshot.borrow().clone()
    }

    pub fn points(&self) -> Arc<Vec<FloodPoint>> {
        self.shared.snapshot.borrow().points.clone()
    }

    pub fn point(&self, id: &str) -> Option<FloodPoint> {
        self.shared
            .snapshot
            .borrow()
            .points
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn last_refreshed_at(&self) -> Option<OffsetDateTime> {
        self.shared.snapshot.borrow().refreshed_at
    }

    /// Receiver notified on every successful replacement.
    pub fn subscribe(&self) -> watch::Receiver<FloodSnapshot> {
        self.shared.snapshot.subscribe()
    }
}

async fn run_cycle(
    shared: Arc<Shared>,
    interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
    on_update: UpdateCallback,
    on_error: ErrorCallback,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    // A tick that comes due while a fetch is running is dropped, not queued
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = stop_rx.changed() => break,
            _ = ticker.tick() => {}
        }

        match shared.refresh().await {
            (RefreshOutcome::Updated(_), _) => {
                let points = shared.snapshot.borrow().points.clone();
                on_update(&points);
            }
            (RefreshOutcome::Failed(_), Some(e)) => on_error(&e),
            _ => {}
        }

        if *stop_rx.borrow() {
            break;
        }
    }

    tracing::debug!("Flood synchronizer cycle exited");
}
