use std::collections::HashMap;
use std::future::poll_fn;
use std::time::Duration;

use songsearch_protocol::SearchMode;
use songsearch_protocol::SearchRequestId;
use tokio_util::time::DelayQueue;
use tokio_util::time::delay_queue::Key;
use tracing::debug;

/// A search waiting out its quiet period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayedSearch {
    pub origin: SearchRequestId,
    pub query: String,
    pub mode: SearchMode,
}

struct Entry {
    key: Key,
    search: DelayedSearch,
}

/// Keyed delay queue holding at most one pending search per origin.
///
/// Rescheduling an origin replaces its query and restarts its timer from
/// zero. Must be driven from inside a tokio runtime.
pub struct DebounceScheduler {
    quiet_period: Duration,
    queue: DelayQueue<SearchRequestId>,
    entries: HashMap<SearchRequestId, Entry>,
}

impl DebounceScheduler {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            queue: DelayQueue::new(),
            entries: HashMap::new(),
        }
    }

    pub fn schedule(&mut self, origin: SearchRequestId, query: String, mode: SearchMode) {
        let search = DelayedSearch {
            origin,
            query,
            mode,
        };
        match self.entries.get_mut(&origin) {
            Some(entry) => {
                debug!(%origin, "restarting debounce timer");
                self.queue.reset(&entry.key, self.quiet_period);
                entry.search = search;
            }
            None => {
                let key = self.queue.insert(origin, self.quiet_period);
                self.entries.insert(origin, Entry { key, search });
            }
        }
    }

    /// Drops the pending search for `origin`. Returns whether one existed.
    pub fn cancel(&mut self, origin: SearchRequestId) -> bool {
        match self.entries.remove(&origin) {
            Some(entry) => {
                self.queue.remove(&entry.key);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, origin: SearchRequestId) -> bool {
        self.entries.contains_key(&origin)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Waits for the next quiet period to elapse and returns its search,
    /// removing it from the pending set. Resolves to `None` when nothing is
    /// scheduled.
    pub async fn next_expired(&mut self) -> Option<DelayedSearch> {
        loop {
            let expired = poll_fn(|cx| self.queue.poll_expired(cx)).await?;
            let origin = expired.into_inner();
            if let Some(entry) = self.entries.remove(&origin) {
                return Some(entry.search);
            }
        }
    }
}
