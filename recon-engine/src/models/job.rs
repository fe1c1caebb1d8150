//! Upload job state machine
//!
//! A job progresses through:
//! RECEIVED → CLASSIFIED → VALIDATED → SUBMITTED → PARSED → SYNCED → RECONCILED → DONE
//!
//! Early exits jump straight to DONE with a terminal status.

use super::audit::{AuditRecord, ExecutionLog, TerminalStatus};
use super::counts::RecordCounts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Caller input: one file to push through the pipeline
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    pub filename: String,
    /// Restrict classification to this queue's rule set
    pub queue: Option<String>,
}

impl UploadRequest {
    pub fn new(bytes: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
            queue: None,
        }
    }

    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = Some(queue.into());
        self
    }
}

/// Classified and validated unit of work
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub job_id: Uuid,
    pub raw_bytes: Vec<u8>,
    pub filename: String,
    pub subscription_id: String,
    pub destination_queue: String,
    pub line_count: usize,
}

/// Job workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    Received,
    Classified,
    Validated,
    Submitted,
    Parsed,
    Synced,
    Reconciled,
    Done,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Received => "RECEIVED",
            JobState::Classified => "CLASSIFIED",
            JobState::Validated => "VALIDATED",
            JobState::Submitted => "SUBMITTED",
            JobState::Parsed => "PARSED",
            JobState::Synced => "SYNCED",
            JobState::Reconciled => "RECONCILED",
            JobState::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// State transition event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub job_id: Uuid,
    pub old_state: JobState,
    pub new_state: JobState,
    pub transitioned_at: DateTime<Utc>,
}

/// In-flight job bookkeeping: state, routing and execution log
#[derive(Debug)]
pub struct JobSession {
    pub job_id: Uuid,
    pub filename: String,
    pub state: JobState,
    pub queue: Option<String>,
    pub subscription_id: Option<String>,
    pub log: ExecutionLog,
    pub started_at: DateTime<Utc>,
}

impl JobSession {
    pub fn new(filename: &str) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            filename: filename.to_string(),
            state: JobState::Received,
            queue: None,
            subscription_id: None,
            log: ExecutionLog::new(),
            started_at: Utc::now(),
        }
    }

    /// Transition to a new state and record it in the execution log
    pub fn transition_to(&mut self, new_state: JobState) -> StateTransition {
        let transition = StateTransition {
            job_id: self.job_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;
        self.log
            .push(format!("{} → {}", transition.old_state, transition.new_state));

        tracing::debug!(
            job_id = %self.job_id,
            from = %transition.old_state,
            to = %transition.new_state,
            "Job state transition"
        );

        transition
    }

    /// Append a line to the execution log and mirror it to tracing
    pub fn record(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::info!(job_id = %self.job_id, filename = %self.filename, "{}", message);
        self.log.push(message);
    }

    /// Append a per-attempt detail line; mirrored to tracing at debug only
    pub fn note(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::debug!(job_id = %self.job_id, filename = %self.filename, "{}", message);
        self.log.push(message);
    }

    /// Close the job and produce its immutable audit record
    pub fn finish(
        mut self,
        status: TerminalStatus,
        counts: RecordCounts,
        detail_message: String,
    ) -> AuditRecord {
        self.transition_to(JobState::Done);
        self.log.push(format!("Terminal status: {}", status));

        AuditRecord {
            job_id: self.job_id,
            filename: self.filename,
            queue: self.queue,
            subscription_id: self.subscription_id,
            status,
            processed_count: counts.processed,
            failed_count: counts.failed,
            reconciled_count: counts.reconciled,
            detail_message,
            execution_log: self.log.into_entries(),
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}
