//! Reconciliation phase and terminal status decision

use super::{FlowOrchestrator, Terminal};
use crate::config::TargetPolicy;
use crate::models::{DetectedCounts, JobSession, JobState, RecordCounts, SyncState, TerminalStatus, UploadJob};
use crate::services::pipeline_client::PipelineClient;
use crate::services::reconcile_poller::{self, ReconcileOutcome, ReconcileStop};
use crate::services::sync_poller::SyncResult;

/// Reconciled-id count the poller should wait for
pub fn reconcile_target(state: SyncState, policy: TargetPolicy) -> u64 {
    match policy {
        TargetPolicy::FailedCount => state.failed_count,
        TargetPolicy::ZeroWhenAllFailed if state.failed_count == state.processed_count => 0,
        TargetPolicy::ZeroWhenAllFailed => state.failed_count,
    }
}

/// Terminal status of a job that got past the parse stage with data
pub fn resolve_terminal_status(sync: &SyncResult) -> TerminalStatus {
    let state = sync.state();

    if state.failed_count > 0 && state.failed_count != state.processed_count {
        TerminalStatus::CompletedWithFailures
    } else if !sync.is_confirmed() {
        TerminalStatus::SynchronizationError
    } else {
        TerminalStatus::Success
    }
}

impl FlowOrchestrator {
    pub(super) async fn phase_reconcile(
        &self,
        session: &mut JobSession,
        client: &PipelineClient,
        job: &UploadJob,
        detected: DetectedCounts,
        sync: &SyncResult,
    ) -> Terminal {
        let state = sync.state();
        let target = reconcile_target(state, self.config.reconcile.target_policy);

        let outcome =
            reconcile_poller::poll_reconcile(client, target, job.line_count, &self.config.polling)
                .await;

        for line in &outcome.log {
            session.note(line);
        }
        session.transition_to(JobState::Reconciled);

        let status = resolve_terminal_status(sync);
        let detail = describe(status, state, detected, target, &outcome);

        Terminal::new(status, RecordCounts::from_sync(state, outcome.observed), detail)
    }
}

fn describe(
    status: TerminalStatus,
    state: SyncState,
    detected: DetectedCounts,
    target: u64,
    outcome: &ReconcileOutcome,
) -> String {
    let reconcile_note = match outcome.stop {
        ReconcileStop::TargetReached => "target reached",
        ReconcileStop::Stable => "count stabilised",
        ReconcileStop::BudgetExhausted => "attempt budget exhausted",
    };

    match status {
        TerminalStatus::CompletedWithFailures => format!(
            "{} of {} records failed; reconciled {}/{} ({})",
            state.failed_count,
            state.processed_count,
            outcome.observed,
            target,
            reconcile_note
        ),
        TerminalStatus::SynchronizationError => format!(
            "Parse detected {} records but synchronize never confirmed them",
            detected.total()
        ),
        _ if target > 0 && outcome.stop != ReconcileStop::TargetReached => format!(
            "OK (reconciliation incomplete: {}/{}, {})",
            outcome.observed, target, reconcile_note
        ),
        _ => "OK".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_when_no_failures() {
        let sync = SyncResult::Confirmed(SyncState::new(10, 0));
        assert_eq!(resolve_terminal_status(&sync), TerminalStatus::Success);
    }

    #[test]
    fn test_partial_failures() {
        let sync = SyncResult::Confirmed(SyncState::new(10, 3));
        assert_eq!(
            resolve_terminal_status(&sync),
            TerminalStatus::CompletedWithFailures
        );
    }

    #[test]
    fn test_all_failed_is_not_partial() {
        let sync = SyncResult::Confirmed(SyncState::new(4, 4));
        assert_eq!(resolve_terminal_status(&sync), TerminalStatus::Success);
    }

    #[test]
    fn test_unconfirmed_sync_is_error() {
        assert_eq!(
            resolve_terminal_status(&SyncResult::ConfirmedEmpty),
            TerminalStatus::SynchronizationError
        );
    }

    #[test]
    fn test_target_policies() {
        let all_failed = SyncState::new(4, 4);
        let partial = SyncState::new(10, 3);

        assert_eq!(reconcile_target(all_failed, TargetPolicy::FailedCount), 4);
        assert_eq!(reconcile_target(all_failed, TargetPolicy::ZeroWhenAllFailed), 0);
        assert_eq!(reconcile_target(partial, TargetPolicy::ZeroWhenAllFailed), 3);
        assert_eq!(reconcile_target(SyncState::default(), TargetPolicy::FailedCount), 0);
    }
}
