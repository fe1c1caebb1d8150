//! Audit records produced once per job

use chrono::{DateTime, Utc};
use recon_common::time;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Terminal status of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminalStatus {
    /// All stages completed, no partial failure
    Success,
    /// Some (not all) records failed remotely
    CompletedWithFailures,
    /// Parse stage detected nothing to process
    NoNewData,
    /// Synchronize never confirmed the records the parse stage detected
    SynchronizationError,
    /// No classification rule matched the filename
    SkippedNoRuleMatch,
    /// Content validator rejected the file
    SkippedInvalidContent,
    /// Submit stage failed
    ErrorUpload,
    /// Parse-trigger stage failed
    ErrorParse,
}

impl TerminalStatus {
    /// Human-readable label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            TerminalStatus::Success => "Success",
            TerminalStatus::CompletedWithFailures => "Completed With Failures",
            TerminalStatus::NoNewData => "No New Data",
            TerminalStatus::SynchronizationError => "Synchronization Error",
            TerminalStatus::SkippedNoRuleMatch => "Skipped (no rule match)",
            TerminalStatus::SkippedInvalidContent => "Skipped (empty/invalid content)",
            TerminalStatus::ErrorUpload => "Error Upload",
            TerminalStatus::ErrorParse => "Error Parse",
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            TerminalStatus::SkippedNoRuleMatch | TerminalStatus::SkippedInvalidContent
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            TerminalStatus::ErrorUpload
                | TerminalStatus::ErrorParse
                | TerminalStatus::SynchronizationError
        )
    }
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered, sequence-numbered execution log of one job
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    entries: Vec<String>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line as `#NN [HH:MM:SS.mmm] message`
    pub fn push(&mut self, message: impl AsRef<str>) {
        let seq = self.entries.len() + 1;
        self.entries.push(format!(
            "#{:02} [{}] {}",
            seq,
            time::clock_stamp(time::now()),
            message.as_ref()
        ));
    }

    pub fn extend<I, S>(&mut self, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for message in messages {
            self.push(message);
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

/// Immutable per-job result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub job_id: Uuid,
    pub filename: String,
    pub queue: Option<String>,
    pub subscription_id: Option<String>,
    pub status: TerminalStatus,
    pub processed_count: u64,
    pub failed_count: u64,
    pub reconciled_count: u64,
    pub detail_message: String,
    pub execution_log: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Session-scoped, append-only collection of audit records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditReport {
    records: Vec<AuditRecord>,
}

impl AuditReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: AuditRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<AuditRecord> {
        self.records
    }
}
