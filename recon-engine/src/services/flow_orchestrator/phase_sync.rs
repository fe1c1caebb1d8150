//! Synchronization phase

use super::{FlowOrchestrator, PhaseResult, Terminal};
use crate::models::{DetectedCounts, JobSession, JobState, TerminalStatus};
use crate::services::pipeline_client::PipelineClient;
use crate::services::sync_poller::{self, SyncResult};

impl FlowOrchestrator {
    /// Poll synchronize; an unreachable endpoint ends the job here
    pub(super) async fn phase_sync(
        &self,
        session: &mut JobSession,
        client: &PipelineClient,
        detected: DetectedCounts,
    ) -> PhaseResult<SyncResult> {
        let outcome = sync_poller::poll_sync(client, detected.total(), &self.config.polling).await;

        for line in &outcome.log {
            session.note(line);
        }

        match outcome.result {
            SyncResult::Unreachable(detail) => Err(Terminal::early(
                TerminalStatus::SynchronizationError,
                format!("Synchronize endpoint unreachable: {}", detail),
            )),
            result => {
                session.transition_to(JobState::Synced);
                Ok(result)
            }
        }
    }
}
