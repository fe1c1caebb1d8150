//! Record counters reported by the remote pipeline

use serde::{Deserialize, Serialize};

/// Counts summed from the parse-trigger response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedCounts {
    pub processed: u64,
    pub failed: u64,
}

impl DetectedCounts {
    pub fn is_empty(&self) -> bool {
        self.processed == 0 && self.failed == 0
    }

    /// Processed + failed, saturating at `u64::MAX`
    pub fn total(&self) -> u64 {
        self.processed.saturating_add(self.failed)
    }
}

/// Last-observed snapshot from the synchronize stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    pub processed_count: u64,
    pub failed_count: u64,
}

impl SyncState {
    pub fn new(processed_count: u64, failed_count: u64) -> Self {
        Self {
            processed_count,
            failed_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.processed_count == 0 && self.failed_count == 0
    }
}

/// Numeric fields carried into an audit record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub processed: u64,
    pub failed: u64,
    pub reconciled: u64,
}

impl RecordCounts {
    pub fn from_sync(state: SyncState, reconciled: u64) -> Self {
        Self {
            processed: state.processed_count,
            failed: state.failed_count,
            reconciled,
        }
    }
}
