//! Upload: session setup, submit and parse-trigger
//!
//! Failures here are fatal for the job: the raw error text becomes the
//! audit detail and all counts stay zero.

use super::{FlowOrchestrator, PhaseResult, Terminal};
use crate::models::{DetectedCounts, JobSession, JobState, RecordCounts, TerminalStatus, UploadJob};
use crate::services::pipeline_client::PipelineClient;

impl FlowOrchestrator {
    /// Build the per-job pipeline session for the job's queue
    pub(super) fn open_session(
        &self,
        session: &mut JobSession,
        job: &UploadJob,
    ) -> PhaseResult<PipelineClient> {
        let Some(queue) = self.config.queue(&job.destination_queue) else {
            let detail = format!("Queue '{}' has no endpoint set", job.destination_queue);
            session.record(&detail);
            return Err(Terminal::early(TerminalStatus::ErrorUpload, detail));
        };

        match PipelineClient::new(queue.endpoints.clone(), &self.config.http) {
            Ok(client) => Ok(client),
            Err(e) => {
                session.record(format!("Could not open session: {}", e));
                Err(Terminal::early(TerminalStatus::ErrorUpload, e.to_string()))
            }
        }
    }

    /// Submit the file, then trigger parsing and read the detected counts
    pub(super) async fn phase_upload(
        &self,
        session: &mut JobSession,
        client: &PipelineClient,
        job: &mut UploadJob,
    ) -> PhaseResult<DetectedCounts> {
        let bytes = std::mem::take(&mut job.raw_bytes);
        let size = bytes.len();

        if let Err(e) = client
            .submit(bytes, &job.filename, &job.subscription_id)
            .await
        {
            tracing::error!(job_id = %job.job_id, error = %e, "Submit failed");
            session.record(format!("Submit failed: {}", e));
            return Err(Terminal::early(TerminalStatus::ErrorUpload, e.to_string()));
        }
        session.transition_to(JobState::Submitted);
        session.record(format!("Submitted {} bytes", size));

        let detected = match client.trigger_parse().await {
            Ok(detected) => detected,
            Err(e) => {
                tracing::error!(job_id = %job.job_id, error = %e, "Parse trigger failed");
                session.record(format!("Parse trigger failed: {}", e));
                return Err(Terminal::early(TerminalStatus::ErrorParse, e.to_string()));
            }
        };
        session.transition_to(JobState::Parsed);
        session.record(format!(
            "Parse detected {} processed / {} failed",
            detected.processed, detected.failed
        ));

        Ok(detected)
    }

    /// Nothing detected: one best-effort reconcile for cleanup, then stop
    pub(super) async fn phase_no_new_data(
        &self,
        session: &mut JobSession,
        client: &PipelineClient,
    ) -> Terminal {
        session.record("No records detected, issuing cleanup reconcile");

        match client.reconcile().await {
            Ok(count) => session.record(format!("Cleanup reconcile returned {} ids", count)),
            Err(e) => session.record(format!("Cleanup reconcile failed (ignored): {}", e)),
        }

        Terminal::new(
            TerminalStatus::NoNewData,
            RecordCounts::default(),
            "Parse stage detected no new records",
        )
    }
}
