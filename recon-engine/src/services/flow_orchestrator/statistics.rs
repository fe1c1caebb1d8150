//! Batch statistics over audit records
//!
//! Display: "N files: X success, Y with failures, Z skipped, W errors"

use crate::models::{AuditRecord, TerminalStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate view of one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub total_files: usize,
    /// Record count per status label
    pub by_status: BTreeMap<String, usize>,
    /// Sum of processed records across files
    pub total_processed: u64,
    pub total_failed: u64,
    /// Sum of reconciled ids across files
    pub total_reconciled: u64,
}

impl BatchStatistics {
    pub fn from_records(records: &[AuditRecord]) -> Self {
        let mut stats = Self {
            total_files: records.len(),
            ..Default::default()
        };

        for record in records {
            *stats
                .by_status
                .entry(record.status.label().to_string())
                .or_insert(0) += 1;
            stats.total_processed = stats.total_processed.saturating_add(record.processed_count);
            stats.total_failed = stats.total_failed.saturating_add(record.failed_count);
            stats.total_reconciled = stats.total_reconciled.saturating_add(record.reconciled_count);
        }

        stats
    }

    pub fn count(&self, status: TerminalStatus) -> usize {
        self.by_status.get(status.label()).copied().unwrap_or(0)
    }

    pub fn skipped(&self) -> usize {
        self.count(TerminalStatus::SkippedNoRuleMatch) + self.count(TerminalStatus::SkippedInvalidContent)
    }

    pub fn errors(&self) -> usize {
        self.count(TerminalStatus::ErrorUpload)
            + self.count(TerminalStatus::ErrorParse)
            + self.count(TerminalStatus::SynchronizationError)
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} files: {} success, {} with failures, {} no new data, {} skipped, {} errors",
            self.total_files,
            self.count(TerminalStatus::Success),
            self.count(TerminalStatus::CompletedWithFailures),
            self.count(TerminalStatus::NoNewData),
            self.skipped(),
            self.errors()
        )
    }
}
