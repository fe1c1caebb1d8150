//! Upload-and-reconcile flow orchestrator
//!
//! Drives one file at a time through the remote pipeline and always yields
//! exactly one [`AuditRecord`] per file, whatever happens.
//!
//! # State Progression
//! RECEIVED → CLASSIFIED → VALIDATED → SUBMITTED → PARSED → SYNCED → RECONCILED → DONE
//!
//! Each stretch of the state machine lives in its own `phase_*` module:
//!
//! - **intake**: classification + content validation (no network)
//! - **upload**: submit + parse-trigger, and the "no new data" cleanup branch
//! - **sync**: synchronization polling
//! - **reconcile**: reconciliation polling + terminal status decision
//!
//! Phases return `Err(Terminal)` to end the job early; `process` folds both
//! arms into the audit record.

use crate::config::ReconConfig;
use crate::models::{AuditRecord, AuditReport, JobSession, RecordCounts, TerminalStatus, UploadRequest};
use crate::services::classifier::Classifier;
use crate::services::content_validator::ContentValidator;
use crate::services::file_intake;
use std::path::PathBuf;
use std::sync::Arc;

mod phase_intake;
mod phase_reconcile;
mod phase_sync;
mod phase_upload;
pub mod statistics;

pub use phase_reconcile::{reconcile_target, resolve_terminal_status};
pub use statistics::BatchStatistics;

/// Terminal outcome of a job, before it becomes an audit record
#[derive(Debug)]
struct Terminal {
    status: TerminalStatus,
    counts: RecordCounts,
    detail: String,
}

impl Terminal {
    fn new(status: TerminalStatus, counts: RecordCounts, detail: impl Into<String>) -> Self {
        Self {
            status,
            counts,
            detail: detail.into(),
        }
    }

    /// Early exit with zeroed counts
    fn early(status: TerminalStatus, detail: impl Into<String>) -> Self {
        Self::new(status, RecordCounts::default(), detail)
    }
}

type PhaseResult<T> = Result<T, Terminal>;

/// Flow orchestrator service
pub struct FlowOrchestrator {
    config: Arc<ReconConfig>,
    classifier: Classifier,
    validator: ContentValidator,
}

impl FlowOrchestrator {
    /// Create an orchestrator over an immutable, validated configuration
    pub fn new(config: Arc<ReconConfig>) -> Self {
        let classifier = Classifier::from_config(&config);
        let validator = ContentValidator::new(config.validation.clone());

        Self {
            config,
            classifier,
            validator,
        }
    }

    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// Process one file end to end
    ///
    /// Never fails: every outcome, including transport errors, is reported
    /// through the returned record's status and detail.
    pub async fn process(&self, request: UploadRequest) -> AuditRecord {
        let mut session = JobSession::new(&request.filename);
        session.queue = request.queue.clone();
        session.record(format!(
            "Received {} ({} bytes)",
            request.filename,
            request.bytes.len()
        ));

        let terminal = match self.run(&mut session, request).await {
            Ok(terminal) | Err(terminal) => terminal,
        };

        tracing::info!(
            job_id = %session.job_id,
            filename = %session.filename,
            status = %terminal.status,
            processed = terminal.counts.processed,
            failed = terminal.counts.failed,
            reconciled = terminal.counts.reconciled,
            "Job finished"
        );

        session.finish(terminal.status, terminal.counts, terminal.detail)
    }

    /// Process files one at a time in submission order
    pub async fn process_batch<I>(&self, requests: I) -> AuditReport
    where
        I: IntoIterator<Item = UploadRequest>,
    {
        let mut report = AuditReport::new();

        for request in requests {
            let record = self.process(request).await;
            report.push(record);
        }

        log_batch(&report);
        report
    }

    /// Read and process input files one at a time in the given order
    ///
    /// A file that cannot be read gets its own `ErrorUpload` record; the
    /// rest of the batch still runs.
    pub async fn process_inputs(&self, paths: &[PathBuf], queue: Option<&str>) -> AuditReport {
        let mut report = AuditReport::new();

        for path in paths {
            let record = match file_intake::load_request(path, queue) {
                Ok(request) => self.process(request).await,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Input file unreadable");
                    let filename = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    let mut session = JobSession::new(&filename);
                    session.queue = queue.map(str::to_string);
                    let detail = e.to_string();
                    session.record(format!("Could not read input: {}", detail));
                    session.finish(TerminalStatus::ErrorUpload, RecordCounts::default(), detail)
                }
            };
            report.push(record);
        }

        log_batch(&report);
        report
    }

    async fn run(&self, session: &mut JobSession, request: UploadRequest) -> PhaseResult<Terminal> {
        let mut job = self.phase_intake(session, request)?;
        let client = self.open_session(session, &job)?;

        let detected = self.phase_upload(session, &client, &mut job).await?;
        if detected.is_empty() {
            return Ok(self.phase_no_new_data(session, &client).await);
        }

        let sync = self.phase_sync(session, &client, detected).await?;
        Ok(self
            .phase_reconcile(session, &client, &job, detected, &sync)
            .await)
    }
}

fn log_batch(report: &AuditReport) {
    let stats = BatchStatistics::from_records(report.records());
    tracing::info!(
        files = stats.total_files,
        processed = stats.total_processed,
        reconciled = stats.total_reconciled,
        "Batch complete: {}",
        stats.display_string()
    );
}
