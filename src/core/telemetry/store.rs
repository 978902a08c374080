use super::history::MetricsHistory;
use super::metrics::MetricsSnapshot;

/// Live snapshot plus rolling history, owned by the scheduler
#[derive(Debug, Clone, Default)]
pub struct MetricsStore {
    snapshot: MetricsSnapshot,
    history: MetricsHistory,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &MetricsSnapshot {
        &self.snapshot
    }

    pub fn history(&self) -> &MetricsHistory {
        &self.history
    }

    /// Owned copy for readers on another thread
    pub fn snapshot_copy(&self) -> MetricsSnapshot {
        self.snapshot.clone()
    }

    pub(crate) fn snapshot_mut(&mut self) -> &mut MetricsSnapshot {
        &mut self.snapshot
    }

    pub(crate) fn history_mut(&mut self) -> &mut MetricsHistory {
        &mut self.history
    }
}
