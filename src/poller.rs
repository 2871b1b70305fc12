//! Poll loop - fetches updates on a fixed cadence and folds them into the
//! shared session.
//!
//! Cycles never overlap: the loop awaits each fetch before waiting for the
//! next tick, and ticks missed while a fetch was in flight are delayed
//! rather than queued. Stopping cancels scheduling only.

use crate::client::{next_offset, UpdateSource};
use crate::config::Config;
use crate::error::Error;
use crate::session::{CycleOutcome, Session, Snapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub type SharedSession = Arc<Mutex<Session>>;

/// Floor for the tick period; `interval` panics on zero.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run exactly one fetch + merge cycle against `session`.
///
/// The session lock is released while the fetch is outstanding so readers
/// and navigation are never blocked on the network.
pub async fn run_cycle(
    source: &dyn UpdateSource,
    session: &SharedSession,
    limit: u32,
    fetch_timeout: Duration,
) -> CycleOutcome {
    let offset = {
        let mut s = session.lock().await;
        s.begin_fetch();
        next_offset(s.cursor())
    };

    let result = match tokio::time::timeout(fetch_timeout, source.fetch(offset, limit)).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(fetch_timeout)),
    };

    let mut s = session.lock().await;
    let outcome = s.commit(result);

    match &outcome {
        CycleOutcome::Merged(report) if report.grew => {
            info!(
                added = report.added(),
                total = report.new_len,
                cursor = report.cursor,
                "New messages"
            );
        }
        CycleOutcome::Merged(report) => {
            debug!(offset, cursor = report.cursor, "No new messages");
        }
        CycleOutcome::Rejected(description) => {
            warn!(offset, description = ?description, "getUpdates rejected by server");
        }
        CycleOutcome::Failed(error) => {
            warn!(offset, "Fetch failed: {}", error);
        }
    }

    outcome
}

/// Builder for a running poll loop
pub struct Poller<S> {
    source: Arc<S>,
    config: Config,
}

impl<S: UpdateSource + 'static> Poller<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source: Arc::new(source),
            config: config.clone(),
        }
    }

    /// Spawn the loop: one fetch right away, then one per `poll_interval`.
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> PollerHandle {
        let session: SharedSession =
            Arc::new(Mutex::new(Session::new(&self.config.target_chat_id)));
        let stop = CancellationToken::new();
        let refresh = Arc::new(Notify::new());
        let (changed_tx, changed_rx) = watch::channel(0u64);

        let task = tokio::spawn(run_loop(
            self.source,
            Arc::clone(&session),
            self.config,
            stop.child_token(),
            Arc::clone(&refresh),
            changed_tx,
        ));

        PollerHandle {
            session,
            stop,
            refresh,
            changed: changed_rx,
            task: Some(task),
        }
    }
}

async fn run_loop<S: UpdateSource + 'static>(
    source: Arc<S>,
    session: SharedSession,
    config: Config,
    stop: CancellationToken,
    refresh: Arc<Notify>,
    changed: watch::Sender<u64>,
) {
    let mut ticker = interval(config.poll_interval.max(MIN_POLL_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        chat_id = %config.target_chat_id,
        interval_ms = config.poll_interval.as_millis() as u64,
        "Poller started"
    );

    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            _ = ticker.tick() => {}
            _ = refresh.notified() => {
                debug!("Manual refresh");
            }
        }

        run_cycle(source.as_ref(), &session, config.batch_limit, config.fetch_timeout).await;
        changed.send_modify(|generation| *generation += 1);
    }

    info!("Poller stopped");
}

/// Consumer-side handle to a running poller
pub struct PollerHandle {
    session: SharedSession,
    stop: CancellationToken,
    refresh: Arc<Notify>,
    changed: watch::Receiver<u64>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub async fn snapshot(&self) -> Snapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn previous(&self) -> bool {
        self.session.lock().await.previous()
    }

    pub async fn next(&self) -> bool {
        self.session.lock().await.next()
    }

    /// Ask for an extra cycle now. Runs after any in-flight cycle; repeated
    /// requests before it starts collapse into one.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    /// Receiver bumped after every completed cycle
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.clone()
    }

    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    /// Stop scheduling further cycles
    pub fn stop(&self) {
        self.stop.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Stop and wait for the loop to exit (including an in-flight cycle)
    pub async fn shutdown(mut self) {
        self.stop.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}
