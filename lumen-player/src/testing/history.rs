use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lumen_contracts::error::{ContractError, Result};
use lumen_contracts::history::WatchHistory;
use lumen_model::{ContentId, ProfileId, WatchProgressRecord, WatchTarget};
use parking_lot::Mutex;

/// One `update_watch_time` call as received
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryWrite {
    pub target: WatchTarget,
    pub seconds: f64,
    pub completed: bool,
}

#[derive(Debug, Default)]
struct HistoryInner {
    records: HashMap<WatchTarget, WatchProgressRecord>,
    writes: Vec<HistoryWrite>,
    reads: usize,
    fail_reads: bool,
    fail_writes: bool,
}

/// Watch history kept in a map, with call recording and failure injection
#[derive(Debug, Clone, Default)]
pub struct InMemoryWatchHistory {
    inner: Arc<Mutex<HistoryInner>>,
}

impl InMemoryWatchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, target: WatchTarget, seconds: f64) {
        self.inner
            .lock()
            .records
            .insert(target, WatchProgressRecord::new(target, seconds, false));
    }

    pub fn record(&self, target: WatchTarget) -> Option<WatchProgressRecord> {
        self.inner.lock().records.get(&target).cloned()
    }

    pub fn writes(&self) -> Vec<HistoryWrite> {
        self.inner.lock().writes.clone()
    }

    pub fn reads(&self) -> usize {
        self.inner.lock().reads
    }

    pub fn fail_reads(&self, fail: bool) {
        self.inner.lock().fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }
}

#[async_trait]
impl WatchHistory for InMemoryWatchHistory {
    async fn get_watch_time(
        &self,
        profile_id: ProfileId,
        content_id: ContentId,
    ) -> Result<f64> {
        let mut inner = self.inner.lock();
        inner.reads += 1;
        if inner.fail_reads {
            return Err(ContractError::History("history unavailable".into()));
        }
        Ok(inner
            .records
            .get(&WatchTarget::new(profile_id, content_id))
            .map(|record| record.watch_time_seconds)
            .unwrap_or(0.0))
    }

    async fn update_watch_time(
        &self,
        profile_id: ProfileId,
        content_id: ContentId,
        seconds: f64,
        completed: bool,
    ) -> Result<()> {
        let target = WatchTarget::new(profile_id, content_id);
        let mut inner = self.inner.lock();
        inner.writes.push(HistoryWrite {
            target,
            seconds,
            completed,
        });
        if inner.fail_writes {
            return Err(ContractError::History("write rejected".into()));
        }
        inner
            .records
            .insert(target, WatchProgressRecord::new(target, seconds, completed));
        Ok(())
    }
}
