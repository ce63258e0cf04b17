//! Watch-position persistence
//!
//! Positions are written through the [`WatchHistory`] contract, debounced
//! and gated by a minimum delta. Completion is written once per session as
//! `(0, completed = true)` so reopening finished content starts over.
//! Write failures are logged and otherwise ignored.

use std::sync::Arc;

use log::{debug, info, trace, warn};
use lumen_config::WatchSyncConfig;
use lumen_contracts::history::WatchHistory;
use lumen_model::{WatchProgress, WatchTarget};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// What has been persisted for the current session
#[derive(Debug, Default)]
struct SyncLedger {
    last_committed: Option<f64>,
    completed: bool,
}

#[derive(Debug)]
pub struct WatchSync {
    config: WatchSyncConfig,
    history: Option<Arc<dyn WatchHistory>>,
    target: Option<WatchTarget>,
    ledger: Arc<Mutex<SyncLedger>>,
    /// Debounce timer; replaced, never queued
    pending: Option<JoinHandle<()>>,
    /// Most recent immediate write (pause, completion, close)
    last_write: Option<JoinHandle<()>>,
}

impl WatchSync {
    pub fn new(
        config: WatchSyncConfig,
        history: Option<Arc<dyn WatchHistory>>,
    ) -> Self {
        Self {
            config,
            history,
            target: None,
            ledger: Arc::new(Mutex::new(SyncLedger::default())),
            pending: None,
            last_write: None,
        }
    }

    pub fn set_history(&mut self, history: Arc<dyn WatchHistory>) {
        self.history = Some(history);
    }

    pub fn target(&self) -> Option<WatchTarget> {
        self.target
    }

    /// Last persisted position for `target`, or `None` when there is none
    /// or the lookup failed
    pub async fn fetch_resume_position(
        &self,
        target: WatchTarget,
    ) -> Option<f64> {
        let history = self.history.as_ref()?;
        match history
            .get_watch_time(target.profile_id, target.content_id)
            .await
        {
            Ok(seconds) if seconds.is_finite() && seconds > 0.0 => {
                debug!("Resume position {:.1}s for {}", seconds, target.content_id);
                Some(seconds)
            }
            Ok(_) => None,
            Err(err) => {
                warn!("Failed to fetch watch position: {}", err);
                None
            }
        }
    }

    /// Start tracking a new session. `resume` is treated as already
    /// persisted so the first write needs a real change.
    pub fn begin(&mut self, target: Option<WatchTarget>, resume: f64) {
        self.cancel();
        self.target = target;
        self.ledger = Arc::new(Mutex::new(SyncLedger {
            last_committed: Some(resume),
            completed: false,
        }));
    }

    /// Debounced write of the current position. A newer call replaces the
    /// pending one.
    pub fn record(&mut self, position: f64, duration: f64) {
        let Some((history, target)) = self.writer() else {
            return;
        };
        if self.still_completed(position, duration) {
            return;
        }
        if WatchProgress::new(position, duration)
            .is_completed(self.config.completion_threshold)
        {
            self.write_completion();
            return;
        }

        self.cancel();
        let ledger = Arc::clone(&self.ledger);
        let debounce = self.config.debounce();
        let min_delta = self.config.min_delta_seconds;
        self.pending = spawn(async move {
            tokio::time::sleep(debounce).await;
            commit(history, target, ledger, position, min_delta).await;
        });
    }

    /// Immediate write, still gated by the minimum delta
    pub fn flush(&mut self, position: f64, duration: f64) {
        let Some((history, target)) = self.writer() else {
            return;
        };
        self.cancel();
        if self.still_completed(position, duration) {
            return;
        }
        if WatchProgress::new(position, duration)
            .is_completed(self.config.completion_threshold)
        {
            self.write_completion();
            return;
        }

        let ledger = Arc::clone(&self.ledger);
        let min_delta = self.config.min_delta_seconds;
        self.last_write = spawn(commit(history, target, ledger, position, min_delta));
    }

    /// Final flush for the session, then stop tracking it
    pub fn end(&mut self, position: f64, duration: f64) {
        self.flush(position, duration);
        self.target = None;
    }

    /// Abort the pending debounced write
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    pub fn has_pending_write(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.is_finished())
    }

    pub fn is_completed(&self) -> bool {
        self.ledger.lock().completed
    }

    /// Whether the session's completion still stands. Falling back well
    /// below the completion point is a rewatch and reopens normal writes.
    fn still_completed(&self, position: f64, duration: f64) -> bool {
        let mut ledger = self.ledger.lock();
        if !ledger.completed {
            return false;
        }
        let reopen_below = duration * self.config.completion_threshold
            - self.config.min_delta_seconds;
        if position.is_finite()
            && duration.is_finite()
            && position < reopen_below
        {
            debug!("Rewatch from {:.1}s, clearing completion", position);
            ledger.completed = false;
            return false;
        }
        true
    }

    /// Wait for the most recent immediate write to finish
    pub async fn drain(&mut self) {
        if let Some(write) = self.last_write.take() {
            let _ = write.await;
        }
    }

    fn writer(&self) -> Option<(Arc<dyn WatchHistory>, WatchTarget)> {
        Some((Arc::clone(self.history.as_ref()?), self.target?))
    }

    fn write_completion(&mut self) {
        let Some((history, target)) = self.writer() else {
            return;
        };
        self.cancel();
        {
            let mut ledger = self.ledger.lock();
            if ledger.completed {
                return;
            }
            ledger.completed = true;
            ledger.last_committed = Some(0.0);
        }
        info!("Content {} completed", target.content_id);
        self.last_write = spawn(async move {
            if let Err(err) = history
                .update_watch_time(target.profile_id, target.content_id, 0.0, true)
                .await
            {
                warn!("Failed to persist completion: {}", err);
            }
        });
    }
}

impl Drop for WatchSync {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn spawn<F>(future: F) -> Option<JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => Some(handle.spawn(future)),
        Err(_) => {
            warn!("No async runtime; watch position write dropped");
            None
        }
    }
}

async fn commit(
    history: Arc<dyn WatchHistory>,
    target: WatchTarget,
    ledger: Arc<Mutex<SyncLedger>>,
    seconds: f64,
    min_delta: f64,
) {
    {
        let ledger = ledger.lock();
        if ledger.completed {
            return;
        }
        if let Some(last) = ledger.last_committed
            && (seconds - last).abs() < min_delta
        {
            trace!("Skipping watch write at {:.1}s (last {:.1}s)", seconds, last);
            return;
        }
    }

    match history
        .update_watch_time(target.profile_id, target.content_id, seconds, false)
        .await
    {
        Ok(()) => {
            debug!("Persisted watch position {:.1}s", seconds);
            ledger.lock().last_committed = Some(seconds);
        }
        Err(err) => warn!("Failed to persist watch position: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryWatchHistory;
    use lumen_model::{ContentId, ProfileId};
    use std::time::Duration;

    fn sync_with(history: &InMemoryWatchHistory) -> (WatchSync, WatchTarget) {
        let target = WatchTarget::new(ProfileId::new(), ContentId::new());
        let mut sync = WatchSync::new(
            WatchSyncConfig::default(),
            Some(Arc::new(history.clone())),
        );
        sync.begin(Some(target), 0.0);
        (sync, target)
    }

    #[tokio::test(start_paused = true)]
    async fn small_moves_are_not_written() {
        let history = InMemoryWatchHistory::new();
        let (mut sync, _) = sync_with(&history);

        sync.flush(3.0, 100.0);
        sync.drain().await;
        assert!(history.writes().is_empty());

        sync.flush(6.0, 100.0);
        sync.drain().await;
        assert_eq!(history.writes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_is_written_once() {
        let history = InMemoryWatchHistory::new();
        let (mut sync, target) = sync_with(&history);

        sync.record(96.0, 100.0);
        sync.record(98.0, 100.0);
        sync.flush(99.0, 100.0);
        sync.drain().await;

        let writes = history.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].seconds, 0.0);
        assert!(writes[0].completed);
        assert!(history.record(target).unwrap().completed);
    }

    #[tokio::test(start_paused = true)]
    async fn rewatch_after_completion_is_written() {
        let history = InMemoryWatchHistory::new();
        let (mut sync, target) = sync_with(&history);

        sync.flush(97.0, 100.0);
        sync.drain().await;
        assert!(sync.is_completed());

        // Still inside the completion margin
        sync.flush(92.0, 100.0);
        sync.drain().await;
        assert!(sync.is_completed());
        assert_eq!(history.writes().len(), 1);

        sync.record(30.0, 100.0);
        assert!(!sync.is_completed());
        tokio::time::sleep(Duration::from_secs(6)).await;

        let writes = history.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[1].seconds, 30.0);
        assert!(!writes[1].completed);
        assert!(!history.record(target).unwrap().completed);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_advance_the_ledger() {
        let history = InMemoryWatchHistory::new();
        history.fail_writes(true);
        let (mut sync, _) = sync_with(&history);

        sync.flush(30.0, 100.0);
        sync.drain().await;

        history.fail_writes(false);
        sync.flush(31.0, 100.0);
        sync.drain().await;

        assert_eq!(history.writes().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_write() {
        let history = InMemoryWatchHistory::new();
        let (mut sync, _) = sync_with(&history);

        sync.record(40.0, 100.0);
        assert!(sync.has_pending_write());
        sync.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(history.writes().is_empty());
    }
}
